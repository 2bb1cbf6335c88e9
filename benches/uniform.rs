//! Uniform random benchmark: HNSW vs exact k-d tree on 10-d vectors.
//! Measures build time, Recall@200 of HNSW against the tree, and query time.
//!
//! Usage: cargo bench --bench uniform [-- <item count>]
//! Log level: RUST_LOG=knnbench_core=debug

use knnbench::eval::measure_recall;
use knnbench::{DistanceMetric, HnswConfig, HnswIndex, Item, KdTree};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const DIM: usize = 10;
const DEFAULT_N: usize = 100_000;
const K: usize = 200;
const RECALL_K: usize = K;
const QUERIES: usize = 1000;
const TRIES: usize = 3;
const DATA_SEED: u64 = 42;
const SHUFFLE_SEED: u64 = 1234;

/// N uniform vectors in [0, 1)^DIM with ids 0..N.
fn make_items(n: usize) -> Vec<Item<u32>> {
    let mut rng = StdRng::seed_from_u64(DATA_SEED);
    (0..n as u32)
        .map(|id| Item::new(id, (0..DIM).map(|_| rng.gen::<f32>()).collect()))
        .collect()
}

fn build_tree(items: &[Item<u32>]) -> KdTree<u32> {
    let t0 = Instant::now();
    let tree = KdTree::from_items(DIM, DistanceMetric::Manhattan, items.iter().cloned())
        .expect("items match the tree dimension");
    let elapsed = t0.elapsed();
    println!(
        "Creating kd-tree with {} items took {} millis which is {} seconds (depth {}).",
        tree.len(),
        elapsed.as_millis(),
        elapsed.as_secs(),
        tree.depth()
    );
    tree
}

fn build_hnsw(items: &[Item<u32>]) -> HnswIndex<u32> {
    let config = HnswConfig::new(8)
        .with_ef_search(200)
        .with_ef_construction(32)
        .with_metric(DistanceMetric::Manhattan);
    let mut index = HnswIndex::new(DIM, items.len(), config).expect("valid HNSW config");

    let t0 = Instant::now();
    index
        .add_all(items.to_vec(), |done, max| {
            println!("  added {done} out of {max} items to the index");
        })
        .expect("items match the index dimension");
    let elapsed = t0.elapsed();
    println!(
        "Creating HNSW index with {} items took {} millis which is {} seconds (max layer {}).",
        index.len(),
        elapsed.as_millis(),
        elapsed.as_secs(),
        index.max_layer()
    );
    index
}

fn query_tree(queries: &[&Item<u32>], tree: &KdTree<u32>) {
    let t0 = Instant::now();
    for item in queries {
        let _ = tree.k_nearest(&item.vector, K);
    }
    println!("KDTree lookup {}", t0.elapsed().as_millis());
}

fn query_hnsw(queries: &[&Item<u32>], index: &HnswIndex<u32>) {
    let t0 = Instant::now();
    for item in queries {
        let _ = index.find_nearest(&item.vector, K);
    }
    println!("HNSW lookup {}", t0.elapsed().as_millis());
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("knnbench_core=info")),
        )
        .init();

    // `cargo bench` passes `--bench`; the first numeric argument is the item count
    let n = std::env::args()
        .skip(1)
        .find_map(|arg| arg.parse::<usize>().ok())
        .unwrap_or(DEFAULT_N);

    println!("=== Uniform benchmark: {n} items x {DIM}d, Manhattan, k={K} ===");
    println!();

    let items = make_items(n);
    let tree = build_tree(&items);
    let hnsw = build_hnsw(&items);

    let mut shuffled: Vec<&Item<u32>> = items.iter().collect();
    shuffled.shuffle(&mut StdRng::seed_from_u64(SHUFFLE_SEED));
    let queries = &shuffled[..QUERIES.min(shuffled.len())];

    println!();
    let report = measure_recall(
        &hnsw,
        &tree,
        queries.iter().map(|item| item.vector.as_slice()),
        RECALL_K,
    )
    .expect("queries match the index dimension");
    println!("good bad = {}, {}", report.matched, report.missed());
    println!("recall@{RECALL_K} = {:.4}", report.recall());

    println!();
    for _ in 0..TRIES {
        query_tree(queries, &tree);
    }
    for _ in 0..TRIES {
        query_hnsw(queries, &hnsw);
    }

    println!();
    println!("=== Benchmark complete ===");
}
