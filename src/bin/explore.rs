use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use crossbin::engine::{ingest, set_ops, FilterCache, NumericColumn};
use jemallocator::Jemalloc;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

/// Timed exploration run over a delimited dataset: load, index, range
/// filters, boolean combination, joint histograms, selection-as-null-mask.
#[derive(Parser, Debug)]
#[command(name = "explore", about = "Timed slice-and-filter run over a delimited dataset")]
struct Args {
    /// Path to the delimited input file
    path: PathBuf,

    /// Histogram bins per column
    #[arg(long, default_value_t = 50)]
    bins: usize,

    /// Field delimiter
    #[arg(long, default_value_t = '\t')]
    delimiter: char,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let start = Instant::now();
    let (mut dataset, summary) = ingest::load_delimited(&args.path, args.delimiter as u8)?;
    println!(
        "loaded {} x {} in {:?} ({} repaired cells)",
        dataset.column_count(),
        dataset.row_count(),
        start.elapsed(),
        summary.errors.len()
    );
    if dataset.column_count() < 2 {
        return Err("need at least two numeric columns to explore".into());
    }

    let start = Instant::now();
    dataset.preprocess(args.bins);
    println!("preprocessed in {:?}", start.elapsed());

    let names: Vec<String> = dataset
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    // Filter on the first two columns, cross-tabulate the next two when
    // the dataset is wide enough.
    let x = names.get(2).unwrap_or(&names[0]).clone();
    let y = names.get(3).unwrap_or(&names[1]).clone();

    let start = Instant::now();
    let joint = dataset.dist2d(&x, &y, None)?;
    println!(
        "dist2d {} x {}: {} occupied bin pairs in {:?}",
        x,
        y,
        joint.len(),
        start.elapsed()
    );

    let (lo, hi) = middle_half(dataset.get(&names[0])?)?;
    let start = Instant::now();
    let hits = dataset.filter(&names[0], lo, hi)?;
    println!(
        "filtered {} rows of {} ([{:.3}, {:.3}]) in {:?}",
        hits.len(),
        names[0],
        lo,
        hi,
        start.elapsed()
    );

    let (lo2, hi2) = middle_half(dataset.get(&names[1])?)?;
    let start = Instant::now();
    let hits2 = dataset.filter(&names[1], lo2, hi2)?;
    println!(
        "filtered {} rows of {} ([{:.3}, {:.3}]) in {:?}",
        hits2.len(),
        names[1],
        lo2,
        hi2,
        start.elapsed()
    );

    let start = Instant::now();
    let selected = set_ops::union(&hits, &hits2);
    let both = set_ops::intersect(&hits, &hits2);
    println!(
        "union {} intersection {} in {:?}",
        selected.len(),
        both.len(),
        start.elapsed()
    );

    let start = Instant::now();
    let conditional = dataset.dist2d(&x, &y, Some(&selected))?;
    println!(
        "conditional dist2d: {} occupied bin pairs in {:?}",
        conditional.len(),
        start.elapsed()
    );

    // Apply the selection the other way around: everything outside it
    // becomes null in a derived column, which is then re-indexed.
    let start = Instant::now();
    let deselected = set_ops::complement(&selected, dataset.row_count());
    let base = dataset.get(&x)?;
    let mut derived = NumericColumn::new(
        format!("{x}__selected"),
        base.values().to_vec(),
        set_ops::union(base.nulls(), &deselected),
    );
    derived.build_index(args.bins);
    println!("applied selection as null mask in {:?}", start.elapsed());

    // Repeat query through the filter cache
    let cache = FilterCache::new();
    let start = Instant::now();
    dataset.filter_cached(&cache, &names[0], lo, hi)?;
    println!("first cached filter in {:?}", start.elapsed());
    let start = Instant::now();
    dataset.filter_cached(&cache, &names[0], lo, hi)?;
    println!("repeat cached filter in {:?}", start.elapsed());

    Ok(())
}

/// Middle half of a column's value span.
fn middle_half(column: &NumericColumn) -> Result<(f64, f64), Box<dyn std::error::Error>> {
    let index = column.index().ok_or("column has no histogram index")?;
    let span = index.max - index.min;
    Ok((index.min + 0.25 * span, index.min + 0.75 * span))
}
