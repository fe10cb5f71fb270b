//! Static component catalog.
//!
//! Every pooled component type is a variant of [`ComponentKind`]; its
//! immutable record ([`ComponentType`]) is reached through an exhaustive
//! `match`, so adding a variant without a record is a compile error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PoolError, Result};

/// Overhaul durations for a sub-assembly that differ from its parent component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubcomponentOverride {
    /// Normalized subcomponent label (see [`normalize_label`]).
    pub subcomponent: &'static str,
    pub planned_overhaul_days: i64,
    pub unplanned_overhaul_days: i64,
}

/// An immutable catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComponentType {
    /// Short unique code, e.g. `mp`.
    pub code: &'static str,
    /// Normalized long name as it appears in the changeout sheets.
    pub slug: &'static str,
    /// Human-readable name used in the output `componente` column.
    pub display_name: &'static str,
    pub planned_overhaul_days: i64,
    pub unplanned_overhaul_days: i64,
    pub overrides: &'static [SubcomponentOverride],
    /// Processing priority of subcomponents changed together (lower first).
    /// Matched by substring against the normalized subcomponent.
    pub subcomponent_priorities: &'static [(&'static str, u32)],
}

/// Priority given to subcomponents absent from a priority table.
pub const DEFAULT_SUBCOMPONENT_PRIORITY: u32 = 999;

/// The pooled component types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    BlowerParrilla,
    CilindroDireccion,
    SuspensionTrasera,
    ConjuntoMasaSuspension,
    MotorTraccion,
    CilindroLevante,
    ModuloPotencia,
}

const BP: ComponentType = ComponentType {
    code: "bp",
    slug: "blower_parrilla",
    display_name: "Blower",
    planned_overhaul_days: 51,
    unplanned_overhaul_days: 101,
    overrides: &[],
    subcomponent_priorities: &[],
};

const CD: ComponentType = ComponentType {
    code: "cd",
    slug: "cilindro_direccion",
    display_name: "Cilindro Dirección",
    planned_overhaul_days: 46,
    unplanned_overhaul_days: 96,
    overrides: &[],
    subcomponent_priorities: &[],
};

const ST: ComponentType = ComponentType {
    code: "st",
    slug: "suspension_trasera",
    display_name: "Suspensión Trasera",
    planned_overhaul_days: 65,
    unplanned_overhaul_days: 125,
    overrides: &[],
    subcomponent_priorities: &[],
};

const CMS: ComponentType = ComponentType {
    code: "cms",
    slug: "conjunto_masa_suspension_delantera",
    display_name: "CMSD",
    planned_overhaul_days: 64,
    unplanned_overhaul_days: 124,
    overrides: &[],
    subcomponent_priorities: &[("suspension_delantera", 1)],
};

const MT: ComponentType = ComponentType {
    code: "mt",
    slug: "motor_traccion",
    display_name: "Motor Tracción",
    planned_overhaul_days: 74,
    unplanned_overhaul_days: 134,
    overrides: &[],
    subcomponent_priorities: &[("motor_traccion", 1)],
};

const CL: ComponentType = ComponentType {
    code: "cl",
    slug: "cilindro_levante",
    display_name: "Cilindro Levante",
    planned_overhaul_days: 75,
    unplanned_overhaul_days: 135,
    overrides: &[],
    subcomponent_priorities: &[],
};

const MP: ComponentType = ComponentType {
    code: "mp",
    slug: "modulo_potencia",
    display_name: "Módulo Potencia",
    planned_overhaul_days: 110,
    unplanned_overhaul_days: 170,
    overrides: &[
        SubcomponentOverride {
            subcomponent: "alternador_principal",
            planned_overhaul_days: 64,
            unplanned_overhaul_days: 114,
        },
        SubcomponentOverride {
            subcomponent: "radiador",
            planned_overhaul_days: 64,
            unplanned_overhaul_days: 114,
        },
    ],
    subcomponent_priorities: &[("motor", 1), ("alternador_principal", 2), ("radiador", 3)],
};

/// Extra spellings seen in the source sheets, already normalized.
const ALIASES: &[(&str, ComponentKind)] = &[
    ("blower", ComponentKind::BlowerParrilla),
    ("bl", ComponentKind::BlowerParrilla),
    ("conjunto_masa_suspension", ComponentKind::ConjuntoMasaSuspension),
    ("suspension_delantera", ComponentKind::ConjuntoMasaSuspension),
];

impl ComponentKind {
    /// All kinds, in catalog (output) order.
    pub const ALL: [ComponentKind; 7] = [
        ComponentKind::BlowerParrilla,
        ComponentKind::CilindroDireccion,
        ComponentKind::SuspensionTrasera,
        ComponentKind::ConjuntoMasaSuspension,
        ComponentKind::MotorTraccion,
        ComponentKind::CilindroLevante,
        ComponentKind::ModuloPotencia,
    ];

    pub fn component_type(self) -> &'static ComponentType {
        match self {
            ComponentKind::BlowerParrilla => &BP,
            ComponentKind::CilindroDireccion => &CD,
            ComponentKind::SuspensionTrasera => &ST,
            ComponentKind::ConjuntoMasaSuspension => &CMS,
            ComponentKind::MotorTraccion => &MT,
            ComponentKind::CilindroLevante => &CL,
            ComponentKind::ModuloPotencia => &MP,
        }
    }

    pub fn code(self) -> &'static str {
        self.component_type().code
    }

    pub fn display_name(self) -> &'static str {
        self.component_type().display_name
    }

    /// Override durations for `subcomponent`, if this component has any.
    pub fn subcomponent_override(self, subcomponent: &str) -> Option<&'static SubcomponentOverride> {
        let normalized = normalize_label(subcomponent);
        self.component_type()
            .overrides
            .iter()
            .find(|o| o.subcomponent == normalized)
    }

    /// Sort priority of `subcomponent` when several are changed together.
    pub fn subcomponent_priority(self, subcomponent: &str) -> u32 {
        let normalized = normalize_label(subcomponent);
        self.component_type()
            .subcomponent_priorities
            .iter()
            .find(|(key, _)| normalized.contains(key))
            .map(|&(_, priority)| priority)
            .unwrap_or(DEFAULT_SUBCOMPONENT_PRIORITY)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ComponentKind {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self> {
        lookup(s)
    }
}

impl Serialize for ComponentKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for ComponentKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        lookup(&s).map_err(serde::de::Error::custom)
    }
}

/// Resolve a component cell against the catalog.
///
/// Matches the short code, the slug, the normalized display name, or one of
/// the known aliases. Fails with [`PoolError::MissingData`] otherwise.
pub fn lookup(raw: &str) -> Result<ComponentKind> {
    let key = normalize_label(raw);
    if key.is_empty() {
        return Err(PoolError::MissingData(raw.to_string()));
    }
    ComponentKind::ALL
        .iter()
        .copied()
        .find(|kind| {
            let ty = kind.component_type();
            ty.code == key || ty.slug == key || normalize_label(ty.display_name) == key
        })
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == key)
                .map(|&(_, kind)| kind)
        })
        .ok_or_else(|| PoolError::MissingData(raw.to_string()))
}

/// Normalize a free-text label from the source sheets.
///
/// Lower-cases, folds Spanish accents, collapses whitespace runs into `_`,
/// and drops anything that is not alphanumeric or `_`.
pub fn normalize_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.trim().chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        let folded = match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        };
        if !(folded.is_ascii_alphanumeric() || folded == '_') {
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push('_');
        }
        pending_space = false;
        out.push(folded);
    }
    out
}
