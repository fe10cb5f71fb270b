//! Canonical ordering and deduplication of changeouts.
//!
//! Several subcomponents of one parent are often changed on the same
//! equipment and day. Sorting by a per-component subcomponent priority makes
//! the processing order (and therefore lane choice) independent of input row
//! order.

use std::collections::HashMap;

use crate::model::{ChangeoutEvent, ChangeoutKey};

/// Sort changeouts by `(equipment, date, component, position, subcomponent
/// priority)` and collapse duplicate physical changeouts.
///
/// Duplicates share `(equipment, component, position, date)`; the last one in
/// sorted order wins. The sort is stable, so rows equal under the key keep
/// their input order.
pub fn priority_sort(mut changeouts: Vec<ChangeoutEvent>) -> Vec<ChangeoutEvent> {
    changeouts.sort_by_cached_key(|c| {
        (
            c.equipment_id.clone(),
            c.changeout_date,
            c.component,
            c.position.clone(),
            c.component.subcomponent_priority(&c.subcomponent),
        )
    });

    let mut last_index: HashMap<ChangeoutKey, usize> = HashMap::new();
    for (i, c) in changeouts.iter().enumerate() {
        last_index.insert(c.key(), i);
    }

    changeouts
        .into_iter()
        .enumerate()
        .filter(|(i, c)| last_index.get(&c.key()) == Some(i))
        .map(|(_, c)| c)
        .collect()
}
