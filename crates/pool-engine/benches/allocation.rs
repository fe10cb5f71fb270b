use std::hint::black_box;

use chrono::{Duration, NaiveDate};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pool_engine::model::BaselineRecord;
use pool_engine::priority::priority_sort;
use pool_engine::{
    generate_pool_projection, ArrivalEvent, ChangeoutEvent, ChangeoutType, ComponentKind, IsoWeek,
    LaneId, ProjectionConfig, ProjectionInputs,
};

const LANES_PER_COMPONENT: usize = 12;

fn horizon() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

/// A fleet of `trucks` haul trucks changing every component roughly twice a
/// year, with arrivals reported for most of the projected returns.
fn synthetic_fleet(trucks: usize) -> ProjectionInputs {
    let mut inputs = ProjectionInputs::default();

    for component in ComponentKind::ALL {
        for lane in 0..LANES_PER_COMPONENT {
            let arrival = horizon() - Duration::days(lane as i64 * 7 + 1);
            let changeout = arrival - Duration::days(100);
            inputs.baseline.push(BaselineRecord {
                lane_id: LaneId::new((lane + 1).to_string()),
                component,
                component_serial: format!("BL-{}-{}", component, lane),
                equipment_id: "800".to_string(),
                changeout_week: IsoWeek::of(changeout),
                changeout_date: Some(changeout),
                arrival_week: Some(IsoWeek::of(arrival)),
                arrival_date: Some(arrival),
                changeout_type: Some(ChangeoutType::Planned),
            });
        }
    }

    for truck in 0..trucks {
        for (k, component) in ComponentKind::ALL.into_iter().enumerate() {
            for cycle in 0..2i64 {
                let offset = ((truck * 13 + k * 29) % 180) as i64 + cycle * 180;
                let date = horizon() + Duration::days(offset);
                let changeout_type = if (truck + k) % 5 == 0 {
                    ChangeoutType::Unplanned
                } else {
                    ChangeoutType::Planned
                };
                inputs.changeouts.push(ChangeoutEvent {
                    equipment_id: (850 + truck).to_string(),
                    component,
                    subcomponent: String::new(),
                    position: "1".to_string(),
                    component_serial: format!("SN-{}-{}-{}", truck, k, cycle),
                    changeout_date: date,
                    changeout_week: IsoWeek::of(date),
                    changeout_type: Some(changeout_type),
                    component_hours: None,
                    tbo_hours: None,
                });
                if cycle == 0 && truck % 4 != 0 {
                    let arrival = date + Duration::days(90);
                    inputs.arrivals.push(ArrivalEvent {
                        component,
                        arrival_week: IsoWeek::of(arrival),
                        arrival_date: arrival,
                        consuming_lane: None,
                    });
                }
            }
        }
    }
    inputs
}

fn bench_projection(c: &mut Criterion) {
    let config = ProjectionConfig::default();
    let mut group = c.benchmark_group("generate_pool_projection");
    for trucks in [10usize, 50, 200] {
        let inputs = synthetic_fleet(trucks);
        group.bench_with_input(BenchmarkId::from_parameter(trucks), &inputs, |b, inputs| {
            b.iter(|| generate_pool_projection(black_box(inputs), &config).unwrap())
        });
    }
    group.finish();
}

fn bench_priority_sort(c: &mut Criterion) {
    let changeouts = synthetic_fleet(200).changeouts;
    c.bench_function("priority_sort_200_trucks", |b| {
        b.iter(|| priority_sort(black_box(changeouts.clone())))
    });
}

criterion_group!(benches, bench_projection, bench_priority_sort);
criterion_main!(benches);
