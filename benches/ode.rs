use criterion::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use pkmodel::*;

fn daily_protocol() -> Protocol {
    Protocol::new(
        DoseSchedule::Periodic {
            start: 0.0,
            period: 12.0,
            duration: 1.0,
            rate: 100.0,
        },
        0.0,
        48.0,
    )
    .unwrap()
}

fn one_compartment() {
    let model = Model::builder(DeliveryRoute::Intravenous)
        .v_c(70.0)
        .cl(5.0)
        .build()
        .unwrap();
    let protocol = daily_protocol();
    let times = protocol.time_points(49);
    black_box(solve(&model, &protocol, &times, &SolverOptions::default()).unwrap());
}

fn three_compartment_sc() {
    let model = Model::builder(DeliveryRoute::Subcutaneous)
        .v_c(70.0)
        .cl(5.0)
        .k_a(0.8)
        .peripheral(30.0, 2.0)
        .peripheral(120.0, 0.5)
        .build()
        .unwrap();
    let protocol = daily_protocol();
    let times = protocol.time_points(49);
    black_box(solve(&model, &protocol, &times, &SolverOptions::default()).unwrap());
}

fn solve_all() {
    let mut solution = Solution::new();
    for i in 0..8 {
        let model = Model::builder(DeliveryRoute::Intravenous)
            .v_c(10.0 + i as f64)
            .cl(1.0)
            .repeat_peripheral(i % 3, 5.0, 0.5)
            .build()
            .unwrap();
        solution.add(model, daily_protocol()).unwrap();
    }
    black_box(solution.solve_all(100).unwrap());
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("one_compartment", |b| b.iter(|| one_compartment()));
    c.bench_function("three_compartment_sc", |b| b.iter(|| three_compartment_sc()));
    c.bench_function("solve_all", |b| b.iter(|| solve_all()));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
