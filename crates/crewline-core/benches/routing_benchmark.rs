//! Routing Benchmarks
//!
//! Measures the pure parts of orchestration:
//! - Capability scoring across a roster
//! - Decomposition decoding and validation
//! - Session context persistence

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use crewline_core::agents::RosterKind;
use crewline_core::orchestration::decode_decomposition;
use crewline_core::session::{ContextStore, ConversationContext, SqliteContextStore};
use serde_json::{json, Map};

/// Benchmark capability scoring for every specialist in a roster
fn bench_capability_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("capability_scoring");

    for roster in [RosterKind::General, RosterKind::WealthAdvisory] {
        let profiles = roster.profiles();
        let required: Vec<String> = ["risk_assessment", "market_analysis", "portfolio_optimization"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        group.throughput(Throughput::Elements(profiles.len() as u64));
        group.bench_with_input(BenchmarkId::new("roster", roster), &profiles, |b, profiles| {
            b.iter(|| {
                let scores: Vec<f64> = profiles
                    .iter()
                    .map(|p| p.capability_score(black_box(&required)))
                    .collect();
                black_box(scores)
            })
        });
    }

    group.finish();
}

fn decomposition_reply(subtasks: usize) -> String {
    let tasks: Vec<_> = (1..=subtasks)
        .map(|i| {
            let dependencies: Vec<String> = if i > 1 { vec![format!("task_{}", i - 1)] } else { Vec::new() };
            json!({
                "id": format!("task_{}", i),
                "description": format!("Subtask number {}", i),
                "type": "research",
                "complexity": 3,
                "dependencies": dependencies,
                "required_tools": ["search_web"],
                "required_capabilities": ["web_research", "fact_checking"]
            })
        })
        .collect();
    let ids: Vec<String> = (1..=subtasks).map(|i| format!("task_{}", i)).collect();

    format!(
        "Here is the plan:\n```json\n{}\n```",
        json!({
            "subtasks": tasks,
            "execution_order": ids,
            "parallel_groups": ids.iter().map(|id| vec![id.clone()]).collect::<Vec<_>>()
        })
    )
}

/// Benchmark decoding of model replies of increasing size
fn bench_decode_decomposition(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_decomposition");

    for size in [1, 5, 20].iter() {
        let reply = decomposition_reply(*size);
        group.throughput(Throughput::Bytes(reply.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &reply, |b, reply| {
            b.iter(|| decode_decomposition("query", black_box(reply)).unwrap())
        });
    }

    group.bench_function("fallback_on_garbage", |b| {
        b.iter(|| decode_decomposition("query", black_box("not valid json")).is_err())
    });

    group.finish();
}

/// Benchmark context save/load on an in-memory database
fn bench_context_persistence(c: &mut Criterion) {
    let mut group = c.benchmark_group("context_persistence");

    let mut context = ConversationContext::new("bench");
    for i in 0..10 {
        context.push_turn(format!("question {}", i), "answer ".repeat(50), Map::new());
    }

    group.bench_function("save_context", |b| {
        let store = SqliteContextStore::in_memory().unwrap();
        b.iter(|| store.save(black_box(&context)).unwrap())
    });

    group.bench_function("load_context", |b| {
        let store = SqliteContextStore::in_memory().unwrap();
        store.save(&context).unwrap();
        b.iter(|| black_box(store.load("bench").unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_capability_scoring,
    bench_decode_decomposition,
    bench_context_persistence,
);
criterion_main!(benches);
