use chrono::NaiveDate;
use pool_engine::table::{
    projection_rows, read_arrivals, read_baseline, read_changeouts, read_inputs,
    write_projection_csv, OUTPUT_COLUMNS,
};
use pool_engine::{
    generate_pool_projection, ChangeoutType, ComponentKind, IsoWeek, LaneId, PoolError,
    ProjectionConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn w(s: &str) -> IsoWeek {
    s.parse().unwrap()
}

const CHANGEOUT_HEADER: &str = "equipo,component,subcomponent,position,component_serial,changeout_week,changeout_date,component_hours,tbo_hours,pool_changeout_type";
const BASELINE_HEADER: &str = "pool_slot,component,component_serial,equipo,changeout_week,changeout_date,arrival_week,arrival_date,pool_changeout_type";

fn csv(header: &str, rows: &[&str]) -> String {
    let mut out = String::from(header);
    for row in rows {
        out.push('\n');
        out.push_str(row);
    }
    out.push('\n');
    out
}

// ── Changeouts ──────────────────────────────────────────────────────────────

#[test]
fn changeouts_are_normalized() {
    let input = csv(
        CHANGEOUT_HEADER,
        &[
            "CAEX 856,MP,Alternador Principal,1,\tSN-1 ,2024-W23,2024-06-03,12000.5,15000,P",
            "857,Suspensión Trasera,,2,SN-2,2024-W24,2024-06-10 00:00:00,,,",
        ],
    );
    let parsed = read_changeouts(input.as_bytes()).unwrap();
    assert!(parsed.rejected.is_empty());
    assert_eq!(parsed.rows.len(), 2);

    let first = &parsed.rows[0];
    assert_eq!(first.equipment_id, "856");
    assert_eq!(first.component, ComponentKind::ModuloPotencia);
    assert_eq!(first.subcomponent, "alternador_principal");
    assert_eq!(first.component_serial, "SN-1");
    assert_eq!(first.changeout_date, d("2024-06-03"));
    assert_eq!(first.changeout_week, w("2024-W23"));
    assert_eq!(first.changeout_type, Some(ChangeoutType::Planned));
    assert_eq!(first.component_hours, Some(12000.5));
    assert_eq!(first.tbo_hours, Some(15000.0));

    let second = &parsed.rows[1];
    assert_eq!(second.component, ComponentKind::SuspensionTrasera);
    assert_eq!(second.changeout_date, d("2024-06-10"));
    assert_eq!(second.changeout_type, None);
    assert_eq!(second.component_hours, None);
}

#[test]
fn changeout_week_follows_the_date() {
    let input = csv(
        CHANGEOUT_HEADER,
        &["856,MT,,1,SN-1,2024-W30,20/06/2024,,,I"],
    );
    let parsed = read_changeouts(input.as_bytes()).unwrap();
    let row = &parsed.rows[0];
    assert_eq!(row.changeout_date, d("2024-06-20"));
    assert_eq!(row.changeout_week, w("2024-W25"));
    assert_eq!(row.changeout_type, Some(ChangeoutType::Unplanned));
}

#[test]
fn unknown_component_is_rejected_not_fatal() {
    let input = csv(
        CHANGEOUT_HEADER,
        &[
            "856,MT,,1,SN-1,,2024-06-03,,,P",
            "856,Radiador Auxiliar,,1,SN-2,,2024-06-03,,,P",
            "857,cilindro levante,,1,SN-3,,,,,P",
        ],
    );
    let parsed = read_changeouts(input.as_bytes()).unwrap();
    assert_eq!(parsed.rows.len(), 1);
    assert_eq!(parsed.rejected.len(), 2);
    assert_eq!(parsed.rejected[0].row, 2);
    assert!(parsed.rejected[0].reason.contains("Radiador Auxiliar"));
    assert_eq!(parsed.rejected[1].row, 3);
    assert_eq!(parsed.rejected[1].reason, "missing changeout_date");
}

#[test]
fn missing_columns_fail_the_table() {
    let input = "equipo,component,changeout_date\n856,MT,2024-06-03\n";
    let err = read_changeouts(input.as_bytes()).unwrap_err();
    match err {
        PoolError::MissingColumns { table, columns } => {
            assert_eq!(table, "changeouts");
            assert!(columns.contains(&"subcomponent".to_string()));
            assert!(columns.contains(&"pool_changeout_type".to_string()));
            assert!(!columns.contains(&"equipo".to_string()));
        }
        other => panic!("expected MissingColumns, got {:?}", other),
    }
}

#[test]
fn header_names_are_case_insensitive() {
    let input = csv(
        &CHANGEOUT_HEADER.to_uppercase(),
        &["856,MT,,1,SN-1,,2024-06-03,,,P"],
    );
    assert_eq!(read_changeouts(input.as_bytes()).unwrap().rows.len(), 1);
}

#[test]
fn invalid_date_is_fatal() {
    let input = csv(CHANGEOUT_HEADER, &["856,MT,,1,SN-1,,2024-13-45,,,P"]);
    let err = read_changeouts(input.as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        PoolError::InvalidRecord { table: "changeouts", row: 1, .. }
    ));
}

#[test]
fn unknown_changeout_type_is_fatal() {
    let input = csv(CHANGEOUT_HEADER, &["856,MT,,1,SN-1,,2024-06-03,,,X"]);
    let err = read_changeouts(input.as_bytes()).unwrap_err();
    match err {
        PoolError::InvalidRecord { message, .. } => assert!(message.contains("'X'")),
        other => panic!("expected InvalidRecord, got {:?}", other),
    }
}

// ── Baseline ────────────────────────────────────────────────────────────────

#[test]
fn baseline_rows_are_parsed() {
    let input = csv(
        BASELINE_HEADER,
        &[
            "6.0,mt,SN-9,CAEX 856,2024-W10,2024-03-05,2024-W20,,P",
            "12,cl,SN-8,857,2024-W11,,,,",
        ],
    );
    let parsed = read_baseline(input.as_bytes()).unwrap();
    assert_eq!(parsed.rows.len(), 2);

    let first = &parsed.rows[0];
    assert_eq!(first.lane_id, LaneId::new("6"));
    assert_eq!(first.equipment_id, "856");
    assert_eq!(first.changeout_week, w("2024-W10"));
    assert_eq!(first.changeout_date, Some(d("2024-03-05")));
    assert_eq!(first.arrival_week, Some(w("2024-W20")));
    assert_eq!(first.arrival_date, None);

    let second = &parsed.rows[1];
    assert_eq!(second.component, ComponentKind::CilindroLevante);
    assert_eq!(second.changeout_date, None);
    assert_eq!(second.changeout_type, None);
}

#[test]
fn baseline_without_changeout_week_uses_date() {
    let input = csv(BASELINE_HEADER, &["1,mt,SN-9,856,,2024-06-20,,,P"]);
    let parsed = read_baseline(input.as_bytes()).unwrap();
    assert_eq!(parsed.rows[0].changeout_week, w("2024-W25"));
}

#[test]
fn baseline_without_week_or_date_is_rejected() {
    let input = csv(BASELINE_HEADER, &["1,mt,SN-9,856,,,,,P"]);
    let parsed = read_baseline(input.as_bytes()).unwrap();
    assert!(parsed.rows.is_empty());
    assert_eq!(parsed.rejected.len(), 1);
}

#[test]
fn empty_pool_slot_is_fatal() {
    let input = csv(BASELINE_HEADER, &[",mt,SN-9,856,2024-W10,,,,P"]);
    let err = read_baseline(input.as_bytes()).unwrap_err();
    assert!(matches!(err, PoolError::InvalidRecord { table: "baseline", .. }));
}

#[test]
fn invalid_baseline_week_is_fatal() {
    let input = csv(BASELINE_HEADER, &["1,mt,SN-9,856,2024-W99,,,,P"]);
    assert!(read_baseline(input.as_bytes()).is_err());
}

// ── Arrivals ────────────────────────────────────────────────────────────────

#[test]
fn arrival_dates_and_weeks_fill_each_other() {
    let input = "component,arrival_week,arrival_date,pool_slot\n\
                 mt,2024-W25,,\n\
                 mt,,2024-06-27,\n\
                 cl,2024-W26,2024-06-28,4.0\n";
    let parsed = read_arrivals(input.as_bytes()).unwrap();
    assert_eq!(parsed.rows.len(), 3);

    assert_eq!(parsed.rows[0].arrival_date, d("2024-06-17"));
    assert_eq!(parsed.rows[1].arrival_week, w("2024-W26"));
    assert!(!parsed.rows[1].is_consumed());
    assert_eq!(parsed.rows[2].consuming_lane, Some(LaneId::new("4")));
}

#[test]
fn arrivals_without_pool_slot_column_are_accepted() {
    let input = "component,arrival_week,arrival_date\nmt,2024-W25,2024-06-20\n";
    let parsed = read_arrivals(input.as_bytes()).unwrap();
    assert_eq!(parsed.rows.len(), 1);
    assert!(!parsed.rows[0].is_consumed());
}

#[test]
fn arrival_without_week_or_date_is_rejected() {
    let input = "component,arrival_week,arrival_date\nmt,,\n";
    let parsed = read_arrivals(input.as_bytes()).unwrap();
    assert!(parsed.rows.is_empty());
    assert_eq!(parsed.rejected[0].table, "arrivals");
}

// ── Whole run ───────────────────────────────────────────────────────────────

#[test]
fn read_inputs_collects_rejections_from_every_table() {
    let changeouts = csv(CHANGEOUT_HEADER, &["856,XX,,1,SN-1,,2024-06-03,,,P"]);
    let baseline = csv(BASELINE_HEADER, &["1,YY,SN-9,856,2024-W10,,,,P"]);
    let arrivals = "component,arrival_week,arrival_date\nZZ,2024-W25,\n";
    let inputs = read_inputs(
        changeouts.as_bytes(),
        baseline.as_bytes(),
        arrivals.as_bytes(),
    )
    .unwrap();
    let tables: Vec<&str> = inputs.rejected.iter().map(|r| r.table).collect();
    assert_eq!(tables, vec!["changeouts", "baseline", "arrivals"]);
}

#[test]
fn empty_projection_writes_header_only() {
    let inputs = read_inputs(
        csv(CHANGEOUT_HEADER, &[]).as_bytes(),
        csv(BASELINE_HEADER, &[]).as_bytes(),
        "component,arrival_week,arrival_date\n".as_bytes(),
    )
    .unwrap();
    let projection = generate_pool_projection(&inputs, &ProjectionConfig::default()).unwrap();

    let mut out = Vec::new();
    write_projection_csv(&projection, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.trim_end(), OUTPUT_COLUMNS.join(","));
}

#[test]
fn projection_is_written_with_output_columns() {
    let changeouts = csv(CHANGEOUT_HEADER, &["CAEX 856,MP,,1,SN-1,,2024-06-03,,,P"]);
    let baseline = csv(
        BASELINE_HEADER,
        &["1,mp,SN-0,855,2023-W40,2023-10-02,,2024-01-10,P"],
    );
    let inputs = read_inputs(
        changeouts.as_bytes(),
        baseline.as_bytes(),
        "component,arrival_week,arrival_date\n".as_bytes(),
    )
    .unwrap();
    let projection = generate_pool_projection(&inputs, &ProjectionConfig::default()).unwrap();

    let rows = projection_rows(&projection);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].arrival_date, d("2024-01-10"));
    assert_eq!(rows[1].arrival_date, d("2024-09-21"));
    assert_eq!(rows[1].arrival_date_proj, d("2024-09-21"));

    let mut out = Vec::new();
    write_projection_csv(&projection, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], OUTPUT_COLUMNS.join(","));
    assert_eq!(
        lines[2],
        "1,mp,,856,SN-1,2024-06-03,2024-W23,P,2024-09-21,2024-09-21,2024-W38,unconfirmed,Módulo Potencia"
    );
}
