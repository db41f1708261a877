//! Signature and index throughput.
//!
//! Key questions:
//! - How does signature time scale with H?
//! - What does parallel index assembly buy over a single owner?
//! - How expensive is a query once the index is built?

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use neardup::benchmark::{generate_clustered_corpus, ClusterSpec};
use neardup::corpus::TextField;
use neardup::hash::{shingles, BandedIndex, MinHash, MinHashSignature};

fn corpus_shingles(n_clusters: usize) -> Vec<(String, std::collections::HashSet<String>)> {
    let shape = ClusterSpec {
        n_clusters,
        ..ClusterSpec::default()
    };
    generate_clustered_corpus(&shape, 42)
        .iter()
        .map(|item| {
            let set = shingles(&item.text(TextField::TitleDescription), 5).unwrap();
            (item.id.clone(), set)
        })
        .collect()
}

fn bench_signature_vs_hashes(c: &mut Criterion) {
    let items = corpus_shingles(10);
    let mut group = c.benchmark_group("signature_vs_hashes");

    for num_hashes in [20, 50, 100, 200] {
        let mh = MinHash::new(num_hashes, 42).unwrap();
        group.throughput(Throughput::Elements(items.len() as u64));
        group.bench_with_input(BenchmarkId::new("H", num_hashes), &mh, |b, mh| {
            b.iter(|| {
                for (_, set) in &items {
                    black_box(mh.signature(set));
                }
            })
        });
    }
    group.finish();
}

fn bench_index_build(c: &mut Criterion) {
    let items = corpus_shingles(1000);
    let mh = MinHash::new(100, 42).unwrap();
    let entries: Vec<(String, MinHashSignature)> = items
        .iter()
        .map(|(id, set)| (id.clone(), mh.signature(set)))
        .collect();

    let mut group = c.benchmark_group("index_build");
    group.sample_size(20);
    group.throughput(Throughput::Elements(entries.len() as u64));

    group.bench_function("sequential", |b| {
        b.iter(|| {
            BandedIndex::new(20, 5)
                .unwrap()
                .build(entries.iter().map(|(id, s)| (id.as_str(), s)))
                .unwrap()
        })
    });

    #[cfg(feature = "parallel")]
    group.bench_function("parallel", |b| {
        b.iter(|| BandedIndex::new(20, 5).unwrap().build_par(&entries).unwrap())
    });

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let items = corpus_shingles(1000);
    let mh = MinHash::new(100, 42).unwrap();
    let entries: Vec<(String, MinHashSignature)> = items
        .iter()
        .map(|(id, set)| (id.clone(), mh.signature(set)))
        .collect();

    let mut group = c.benchmark_group("query");
    for (bands, rows) in [(50, 2), (20, 5), (10, 10)] {
        let index = BandedIndex::new(bands, rows)
            .unwrap()
            .build(entries.iter().map(|(id, s)| (id.as_str(), s)))
            .unwrap();
        group.bench_with_input(
            BenchmarkId::new("bands_rows", format!("{bands}x{rows}")),
            &index,
            |b, index| {
                b.iter(|| {
                    for (_, sig) in entries.iter().step_by(50) {
                        black_box(index.query(sig).unwrap());
                    }
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_signature_vs_hashes, bench_index_build, bench_query);
criterion_main!(benches);
