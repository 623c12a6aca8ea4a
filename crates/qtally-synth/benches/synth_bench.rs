//! Benchmarks for oracle synthesis and counting-circuit simulation
//!
//! Run with: cargo bench -p qtally-synth

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use qtally_adapter_sim::Statevector;
use qtally_synth::encode::encode;
use qtally_synth::extract::extract;
use qtally_synth::features::FeatureIndexMap;
use qtally_synth::oracle::synthesize;
use qtally_synth::tree::{DecisionTree, TreeNode};
use qtally_synth::{CountingCircuitBuilder, GroverIterate};

/// Complete tree of the given depth; split at depth `d` tests feature `d`
/// and leaves alternate between the two classes.
fn complete_tree(depth: usize) -> DecisionTree {
    let internal = (1 << depth) - 1;
    let mut nodes = Vec::with_capacity(2 * internal + 1);
    for i in 0..internal {
        let level = (usize::BITS - (i + 1).leading_zeros() - 1) as usize;
        nodes.push(TreeNode::Split {
            feature: Some(level),
            left: 2 * i + 1,
            right: 2 * i + 2,
        });
    }
    for i in 0..=internal {
        let class_counts = if i % 2 == 0 {
            vec![0.0, 1.0]
        } else {
            vec![1.0, 0.0]
        };
        nodes.push(TreeNode::Leaf { class_counts });
    }
    DecisionTree::new(nodes)
}

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("pixel_{i}")).collect()
}

fn bench_oracle_synthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("oracle_synthesis");

    for depth in &[4usize, 8, 12] {
        let tree = complete_tree(*depth);
        let names = names(*depth);
        let map = FeatureIndexMap::from_names(names.clone()).unwrap();

        group.bench_with_input(BenchmarkId::new("extract", depth), depth, |b, _| {
            b.iter(|| extract(black_box(&tree), &names, 1).unwrap());
        });

        let terms = extract(&tree, &names, 1).unwrap();
        group.bench_with_input(BenchmarkId::new("synthesize", depth), depth, |b, _| {
            b.iter(|| synthesize(black_box(&terms), &map).unwrap());
        });
    }

    group.finish();
}

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");

    for width in &[4usize, 8, 16] {
        let data: Vec<Vec<f64>> = (0..256)
            .map(|s: usize| (0..*width).map(|f| ((s >> (f % 8)) & 1) as f64).collect())
            .collect();
        group.bench_with_input(BenchmarkId::new("encode", width), width, |b, _| {
            b.iter(|| encode(black_box(&data), None).unwrap());
        });
    }

    group.finish();
}

fn bench_counting_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("counting_simulation");
    group.sample_size(10);

    for depth in &[2usize, 3] {
        let tree = complete_tree(*depth);
        let names = names(*depth);
        let map = FeatureIndexMap::from_names(names.clone()).unwrap();
        let terms = extract(&tree, &names, 1).unwrap();
        let oracle = synthesize(&terms, &map).unwrap();

        let data: Vec<Vec<f64>> = (0..16usize)
            .map(|s| (0..*depth).map(|f| ((s >> f) & 1) as f64).collect())
            .collect();
        let (_, state_prep) = encode(&data, None).unwrap();
        let iterate = GroverIterate::compose(&oracle, &state_prep).unwrap();
        let counting = CountingCircuitBuilder::new(&iterate, 4)
            .build(&state_prep)
            .unwrap();
        let circuit = counting.circuit();
        let instructions = circuit.instructions().unwrap();

        group.bench_with_input(BenchmarkId::new("statevector", depth), depth, |b, _| {
            b.iter(|| {
                let mut sv = Statevector::new(circuit.num_qubits());
                for inst in &instructions {
                    sv.apply(inst).unwrap();
                }
                black_box(sv.probabilities())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_oracle_synthesis,
    bench_encoding,
    bench_counting_simulation
);
criterion_main!(benches);
