//! Benchmark harness for bulk path-query performance testing
//!
//! Supports:
//! - Batched shortest-path queries on synthetic Manhattan grids
//! - Batched penalty alternative-path queries (per-worker graph replicas)
//!
//! Outputs: p50/p95/p99 times + sequential-vs-parallel comparison

use std::time::Instant;

use clap::{Parser, Subcommand};
use hdrhistogram::Histogram;
use rand::prelude::*;

use oriole::{
    dijkstra, generate_manhattan, parallel_dijkstra, parallel_k_shortest_paths, LabelSet,
    OrientedGraph, PenaltySettings,
};

#[derive(Parser)]
#[command(name = "oriole-bench")]
#[command(about = "Benchmark harness for oriole path queries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark batched shortest-path queries on a Manhattan grid
    Dijkstra {
        /// Grid dimension (n×n interior nodes)
        #[arg(long, default_value = "100")]
        grid: usize,

        /// Link length (also the single cost dimension value)
        #[arg(long, default_value = "100.0")]
        link_length: f64,

        /// Number of boundary-to-boundary queries
        #[arg(long, default_value = "3000")]
        n_queries: usize,

        /// Worker threads (0 = one per hardware thread)
        #[arg(long, default_value = "8")]
        threads: usize,

        /// Random seed for reproducibility
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Benchmark batched penalty alternative-path queries
    Alternatives {
        /// Grid dimension (n×n interior nodes)
        #[arg(long, default_value = "30")]
        grid: usize,

        /// Link length
        #[arg(long, default_value = "100.0")]
        link_length: f64,

        /// Number of boundary-to-boundary queries
        #[arg(long, default_value = "200")]
        n_queries: usize,

        /// Alternatives requested per query
        #[arg(long, default_value = "3")]
        k: usize,

        /// Worker threads (0 = one per hardware thread)
        #[arg(long, default_value = "8")]
        threads: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Dijkstra {
            grid,
            link_length,
            n_queries,
            threads,
            seed,
        } => run_dijkstra_bench(grid, link_length, n_queries, threads, seed),

        Commands::Alternatives {
            grid,
            link_length,
            n_queries,
            k,
            threads,
            seed,
        } => run_alternatives_bench(grid, link_length, n_queries, k, threads, seed),
    }
}

/// Random boundary node name on an n-grid.
fn boundary_node(rng: &mut StdRng, n: usize) -> String {
    let compass = ["WEST", "EAST", "NORTH", "SOUTH"][rng.gen_range(0..4)];
    format!("{compass}_{}", rng.gen_range(0..n))
}

fn build_grid(grid: usize, link_length: f64) -> anyhow::Result<OrientedGraph> {
    println!("[1/3] Building {grid}×{grid} grid...");
    let build_start = Instant::now();
    let graph = generate_manhattan(grid, link_length)?;
    println!(
        "  ✓ Built in {:.2}s ({} nodes, {} links)",
        build_start.elapsed().as_secs_f64(),
        graph.nodes.len(),
        graph.links.len()
    );
    println!();
    Ok(graph)
}

fn run_dijkstra_bench(
    grid: usize,
    link_length: f64,
    n_queries: usize,
    threads: usize,
    seed: u64,
) -> anyhow::Result<()> {
    println!("═══════════════════════════════════════════════════════════════");
    println!("  BATCHED SHORTEST-PATH BENCHMARK");
    println!("═══════════════════════════════════════════════════════════════");
    println!("  Grid: {grid}×{grid}");
    println!("  Queries: {n_queries}");
    println!("  Threads: {threads}");
    println!("  Seed: {seed}");
    println!();

    let graph = build_grid(grid, link_length)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let origins: Vec<String> = (0..n_queries).map(|_| boundary_node(&mut rng, grid)).collect();
    let destinations: Vec<String> =
        (0..n_queries).map(|_| boundary_node(&mut rng, grid)).collect();

    // Sequential baseline
    println!("[2/3] Running {n_queries} queries sequentially...");
    let mut hist = Histogram::<u64>::new(3)?;
    let sequential_start = Instant::now();
    let mut sequential = Vec::with_capacity(n_queries);
    for (origin, destination) in origins.iter().zip(&destinations) {
        let start = Instant::now();
        sequential.push(dijkstra(
            &graph,
            origin,
            destination,
            "length",
            &LabelSet::default(),
        )?);
        hist.record(start.elapsed().as_micros() as u64)?;
    }
    let sequential_time = sequential_start.elapsed();
    println!(
        "  ✓ Sequential: {:.2}s ({:.1} queries/sec)",
        sequential_time.as_secs_f64(),
        n_queries as f64 / sequential_time.as_secs_f64()
    );
    println!();

    // Parallel batch
    println!("[3/3] Running the same batch on {threads} workers...");
    let parallel_start = Instant::now();
    let results = parallel_dijkstra(&graph, &origins, &destinations, "length", &[], threads);
    let parallel_time = parallel_start.elapsed();
    println!(
        "  ✓ Parallel: {:.2}s ({:.1} queries/sec)",
        parallel_time.as_secs_f64(),
        n_queries as f64 / parallel_time.as_secs_f64()
    );
    println!();

    let mut mismatches = 0;
    for (result, expected) in results.iter().zip(&sequential) {
        match result {
            Ok(path) if path == expected => {}
            _ => mismatches += 1,
        }
    }
    println!("───────────────────────────────────────────────────────────────");
    if mismatches == 0 {
        println!("  ✓ All {n_queries} parallel results match the sequential run");
    } else {
        println!("  ✗ {mismatches} mismatches between parallel and sequential runs");
    }
    println!(
        "  Speedup: {:.2}x",
        sequential_time.as_secs_f64() / parallel_time.as_secs_f64()
    );
    println!();

    print_histogram_stats("Per-query", &hist);
    Ok(())
}

fn run_alternatives_bench(
    grid: usize,
    link_length: f64,
    n_queries: usize,
    k: usize,
    threads: usize,
    seed: u64,
) -> anyhow::Result<()> {
    println!("═══════════════════════════════════════════════════════════════");
    println!("  BATCHED ALTERNATIVE-PATH BENCHMARK");
    println!("═══════════════════════════════════════════════════════════════");
    println!("  Grid: {grid}×{grid}");
    println!("  Queries: {n_queries} (k = {k})");
    println!("  Threads: {threads}");
    println!("  Seed: {seed}");
    println!();

    let graph = build_grid(grid, link_length)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let origins: Vec<String> = (0..n_queries).map(|_| boundary_node(&mut rng, grid)).collect();
    let destinations: Vec<String> =
        (0..n_queries).map(|_| boundary_node(&mut rng, grid)).collect();
    let settings = PenaltySettings::new(k, 0.0, f64::INFINITY);

    println!("[2/3] Running {n_queries} alternative-path queries on {threads} workers...");
    let batch_start = Instant::now();
    let results = parallel_k_shortest_paths(
        &graph,
        &origins,
        &destinations,
        "length",
        &[],
        &settings,
        threads,
    );
    let batch_time = batch_start.elapsed();
    println!(
        "  ✓ Batch: {:.2}s ({:.1} queries/sec)",
        batch_time.as_secs_f64(),
        n_queries as f64 / batch_time.as_secs_f64()
    );
    println!();

    println!("[3/3] Summarizing...");
    let mut failures = 0usize;
    let mut total_paths = 0usize;
    let mut hist = Histogram::<u64>::new(3)?;
    for result in &results {
        match result {
            Ok(paths) => {
                total_paths += paths.len();
                hist.record(paths.len() as u64)?;
            }
            Err(_) => failures += 1,
        }
    }
    println!("───────────────────────────────────────────────────────────────");
    println!("  Total alternatives found: {total_paths}");
    println!("  Failed queries: {failures}");
    println!(
        "  Alternatives per query: p50 = {}, max = {}",
        hist.value_at_quantile(0.50),
        hist.max()
    );
    println!();

    Ok(())
}

fn print_histogram_stats(name: &str, hist: &Histogram<u64>) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  {name} timing (μs)");
    println!("───────────────────────────────────────────────────────────────");
    println!("    min:    {:>10.0}", hist.min() as f64);
    println!("    p50:    {:>10.0}", hist.value_at_quantile(0.50) as f64);
    println!("    p95:    {:>10.0}", hist.value_at_quantile(0.95) as f64);
    println!("    p99:    {:>10.0}", hist.value_at_quantile(0.99) as f64);
    println!("    max:    {:>10.0}", hist.max() as f64);
    println!("    mean:   {:>10.1}", hist.mean());
}
