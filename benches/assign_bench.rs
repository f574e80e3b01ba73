//! Criterion benchmarks for the assignment pipeline.
//!
//! Uses seeded synthetic instances so every run measures the same
//! problem.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use revmatch::config::AssignConfig;
use revmatch::eligibility::EligibilityIndex;
use revmatch::records::{Abstract, Assignment, Reviewer, ReviewerPool};
use revmatch::repair::RepairEngine;
use revmatch::solver::{AssignmentModel, GreedySwapSolver, IpSolver, SolverConfig};
use revmatch::Pipeline;
use std::collections::HashMap;

const CATEGORIES: [&str; 8] = [
    "imaging", "diffusion", "therapy", "dosimetry", "ai", "qa", "safety", "modelling",
];

fn synthetic_abstracts(n: usize, rng: &mut StdRng) -> Vec<Abstract> {
    (0..n)
        .map(|i| {
            let mut category_scores = HashMap::new();
            for _ in 0..rng.random_range(1..4) {
                let category = CATEGORIES[rng.random_range(0..CATEGORIES.len())];
                category_scores.insert(category.to_string(), rng.random_range(1.0..10.0));
            }
            Abstract {
                id: format!("{}", i + 1),
                title: format!("Abstract {}", i + 1),
                authors: vec![format!("Author {i}")],
                category_scores,
                focus_topic: format!("topic-{}", i % 3),
            }
        })
        .collect()
}

fn synthetic_reviewers(n: usize, rng: &mut StdRng) -> Vec<Reviewer> {
    (0..n)
        .map(|i| {
            let categories: Vec<String> = (0..rng.random_range(2..5))
                .map(|_| CATEGORIES[rng.random_range(0..CATEGORIES.len())].to_string())
                .collect();
            Reviewer {
                first_name: format!("First{i}"),
                last_name: format!("Last{i}"),
                categories,
                focus_topics: vec![format!("topic-{}", i % 3)],
                experience: rng.random_range(0..25),
            }
        })
        .collect()
}

fn bench_config() -> AssignConfig {
    AssignConfig::default()
        .with_min_abstracts_per_reviewer(0)
        .with_max_abstracts_per_reviewer(12)
        .with_time_limit_ms(5_000)
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    for &(n_abstracts, n_reviewers) in &[(50usize, 30usize), (200, 80)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{n_abstracts}x{n_reviewers}")),
            &(n_abstracts, n_reviewers),
            |b, &(na, nr)| {
                let mut rng = StdRng::seed_from_u64(42);
                let abstracts = synthetic_abstracts(na, &mut rng);
                let reviewers = synthetic_reviewers(nr, &mut rng);
                let pipeline = Pipeline::new(bench_config());
                b.iter(|| {
                    let output = pipeline
                        .run(abstracts.clone(), reviewers.clone())
                        .expect("run");
                    black_box(output.residuals)
                });
            },
        );
    }
    group.finish();
}

fn bench_solver(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let abstracts = synthetic_abstracts(100, &mut rng);
    let reviewers = synthetic_reviewers(50, &mut rng);
    let config = bench_config();
    let pool = ReviewerPool::new(reviewers);
    let index = EligibilityIndex::build(&abstracts, &pool, &config);
    let ids: Vec<String> = abstracts.iter().map(|a| a.id.clone()).collect();
    let model = AssignmentModel::from_index(ids, &index, &config);
    let solver_config = SolverConfig::default().with_time_limit_ms(5_000);

    c.bench_function("solver_100x50", |b| {
        b.iter(|| {
            let solution = GreedySwapSolver::new().solve(&model, &solver_config);
            black_box(solution.objective_value)
        });
    });
}

fn bench_repair_from_empty(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let abstracts = synthetic_abstracts(100, &mut rng);
    let reviewers = synthetic_reviewers(50, &mut rng);
    let config = bench_config();
    let pool = ReviewerPool::new(reviewers);
    let index = EligibilityIndex::build(&abstracts, &pool, &config);
    let ids: Vec<String> = abstracts.iter().map(|a| a.id.clone()).collect();

    c.bench_function("repair_from_empty_100x50", |b| {
        let engine = RepairEngine::new(&index, &ids, &config);
        b.iter(|| {
            let mut assignment = Assignment::new();
            black_box(engine.repair(&mut assignment))
        });
    });
}

criterion_group!(benches, bench_pipeline, bench_solver, bench_repair_from_empty);
criterion_main!(benches);
