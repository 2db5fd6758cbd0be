//! Benchmark for graph construction
//!
//! Measures:
//! - End-to-end build time as the number of call paths grows
//! - Effect of the oracle cache

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nfgraph_bdd::{
    Arg, Bdd, BddConfig, CachedSolver, Call, CallPath, EnumeratingSolver, Expr, Preset,
};

/// `num_paths` paths splitting the 8-bit packet field into equal ranges,
/// each range forwarded to its own port
fn generate_call_paths(num_paths: u64) -> Vec<CallPath> {
    let pkt = Expr::symbol("pkt", 8);
    let step = 256 / num_paths;

    (0..num_paths)
        .map(|i| {
            let mut path = CallPath::new(format!("range_{}", i))
                .with_call(Call::new("start_time"))
                .with_call(Call::new("packet_receive"))
                .with_call(
                    Call::new("packet_send")
                        .with_arg("dst_device", Arg::value(Expr::constant(i, 16))),
                );
            if i > 0 {
                path = path.with_constraint(pkt.clone().uge(Expr::constant(i * step, 8)));
            }
            if i + 1 < num_paths {
                path = path.with_constraint(pkt.clone().ult(Expr::constant((i + 1) * step, 8)));
            }
            path
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    let config = BddConfig::preset(Preset::Vigor);

    for num_paths in [2u64, 4, 8, 16].iter() {
        let paths = generate_call_paths(*num_paths);

        group.bench_with_input(BenchmarkId::new("enumerating", num_paths), &paths, |b, paths| {
            b.iter(|| {
                let solver = EnumeratingSolver::default();
                black_box(Bdd::from_call_paths(paths, &solver, &config).unwrap())
            })
        });

        group.bench_with_input(BenchmarkId::new("cached", num_paths), &paths, |b, paths| {
            b.iter(|| {
                let solver = CachedSolver::new(EnumeratingSolver::default(), 1024);
                black_box(Bdd::from_call_paths(paths, &solver, &config).unwrap())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
