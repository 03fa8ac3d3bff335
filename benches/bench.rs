// Criterion benchmarks for the pairing engine

use brew_match::{Employee, PairingEngine};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

const DEPARTMENTS: [&str; 5] = ["IT", "Analytics", "Design", "Management", "Support"];

fn create_employee(id: usize) -> Employee {
    Employee {
        id: id as i64,
        display_name: format!("Employee {}", id),
        department: Some(DEPARTMENTS[id % DEPARTMENTS.len()].to_string()),
        is_active: true,
        interests: if id % 2 == 0 {
            vec!["coffee".to_string()]
        } else {
            vec!["coffee".to_string(), "chess".to_string()]
        },
        excluded_partners: vec![],
        position: None,
        username: None,
        employee_number: None,
    }
}

fn roster(size: usize) -> Vec<Employee> {
    (0..size).map(create_employee).collect()
}

fn bench_random_pairing(c: &mut Criterion) {
    let engine = PairingEngine::new();
    let mut group = c.benchmark_group("random_pairing");

    for roster_size in [10, 50, 100, 500, 1000].iter() {
        let employees = roster(*roster_size);
        group.bench_with_input(
            BenchmarkId::from_parameter(roster_size),
            &employees,
            |b, employees| {
                b.iter(|| {
                    let mut rng = StdRng::seed_from_u64(42);
                    engine.random_pairing(black_box(employees), &mut rng).unwrap()
                });
            },
        );
    }

    group.finish();
}

fn bench_interest_pairing(c: &mut Criterion) {
    let engine = PairingEngine::new();
    let employees = roster(500);

    c.bench_function("interest_pairing_500", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(42);
            engine
                .interest_pairing(black_box(&employees), black_box("chess"), &mut rng)
                .unwrap()
        });
    });
}

fn bench_cross_department_pairing(c: &mut Criterion) {
    let engine = PairingEngine::new();
    let mut group = c.benchmark_group("cross_department_pairing");

    for roster_size in [10, 100, 1000].iter() {
        let employees = roster(*roster_size);
        group.bench_with_input(
            BenchmarkId::from_parameter(roster_size),
            &employees,
            |b, employees| {
                b.iter(|| engine.cross_department_pairing(black_box(employees)).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_random_pairing,
    bench_interest_pairing,
    bench_cross_department_pairing
);
criterion_main!(benches);
