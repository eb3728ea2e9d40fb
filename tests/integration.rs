use std::io::Write;

use crossbin::engine::set_ops;
use crossbin::engine::{ingest, FilterCache, NumericColumn};
use tempfile::NamedTempFile;

fn atlas_fixture() -> NamedTempFile {
    // Two identifier columns, three numeric series, one comment, one null
    // cell per series.
    let mut tmp = NamedTempFile::new().unwrap();
    write!(
        tmp,
        "# synthetic atlas export\n\
         Gene ID\tGene Name\tliver\tbrain\theart\n\
         G1\talpha\t10.0\t200.0\t5.0\n\
         G2\tbeta\t\t400.0\t15.0\n\
         G3\tgamma\t30.0\t\t25.0\n\
         G4\tdelta\t40.0\t800.0\t\n\
         G5\tepsilon\t50.0\t1000.0\t45.0\n"
    )
    .unwrap();
    tmp
}

#[test]
fn end_to_end_slice_and_filter() {
    let tmp = atlas_fixture();
    let (mut dataset, summary) = ingest::load_tsv(tmp.path()).unwrap();

    assert_eq!(summary.rows_processed, 5);
    assert!(summary.errors.is_empty());
    assert_eq!(dataset.column_count(), 3);
    assert_eq!(dataset.row_count(), 5);

    dataset.preprocess(4);

    // liver values 10,30,40,50 with a null at row 1
    let liver = dataset.filter("liver", 25.0, 45.0).unwrap();
    assert_eq!(liver, vec![2, 3]);

    // brain values 200,400,800,1000 with a null at row 2
    let brain = dataset.filter("brain", 300.0, 1000.0).unwrap();
    assert_eq!(brain, vec![1, 3, 4]);

    let both = set_ops::intersect(&liver, &brain);
    assert_eq!(both, vec![3]);
    let either = set_ops::union(&liver, &brain);
    assert_eq!(either, vec![1, 2, 3, 4]);
    let neither = set_ops::complement(&either, dataset.row_count());
    assert_eq!(neither, vec![0]);

    // Joint histogram restricted to the combined selection matches a
    // full-row mask only when the mask is everything.
    let unmasked = dataset.dist2d("liver", "heart", None).unwrap();
    let full: Vec<usize> = (0..dataset.row_count()).collect();
    let full_masked = dataset.dist2d("liver", "heart", Some(&full)).unwrap();
    assert_eq!(unmasked, full_masked);

    let masked = dataset.dist2d("liver", "heart", Some(&both)).unwrap();
    let total: usize = masked.counts.iter().sum();
    // Row 3 is null in heart, so the restricted joint histogram is empty.
    assert_eq!(total, 0);
}

#[test]
fn filters_compose_with_cache() {
    let tmp = atlas_fixture();
    let (mut dataset, _) = ingest::load_tsv(tmp.path()).unwrap();
    dataset.preprocess(8);

    let cache = FilterCache::new();
    let direct = dataset.filter("heart", 5.0, 25.0).unwrap();
    let cached = dataset.filter_cached(&cache, "heart", 5.0, 25.0).unwrap();
    let repeat = dataset.filter_cached(&cache, "heart", 5.0, 25.0).unwrap();
    assert_eq!(direct, vec![0, 1, 2]);
    assert_eq!(direct, cached);
    assert_eq!(direct, repeat);
}

#[test]
fn selection_applied_as_null_mask() {
    // The original exploration flow derives a column whose nulls are the
    // union of real nulls and the deselected rows, then re-indexes it.
    let tmp = atlas_fixture();
    let (mut dataset, _) = ingest::load_tsv(tmp.path()).unwrap();
    dataset.preprocess(4);

    let selected = dataset.filter("liver", 25.0, 45.0).unwrap(); // rows 2, 3
    let deselected = set_ops::complement(&selected, dataset.row_count());
    let heart = dataset.get("heart").unwrap();
    let mut derived = NumericColumn::new(
        "heart_selected",
        heart.values().to_vec(),
        set_ops::union(heart.nulls(), &deselected),
    );
    derived.build_index(4);

    let index = derived.index().unwrap();
    // Only row 2 survives: row 3 is a real heart null.
    let members: Vec<usize> = index
        .bins
        .iter()
        .flat_map(|bin| bin.by_row.iter().copied())
        .collect();
    assert_eq!(members, vec![2]);
    assert_eq!(index.min, 25.0);
    assert_eq!(index.max, 25.0);
}

#[test]
fn preprocess_is_idempotent_per_bin_count() {
    let tmp = atlas_fixture();
    let (mut dataset, _) = ingest::load_tsv(tmp.path()).unwrap();
    dataset.preprocess(4);
    let first = dataset.filter("liver", 0.0, 100.0).unwrap();
    dataset.preprocess(4);
    let second = dataset.filter("liver", 0.0, 100.0).unwrap();
    assert_eq!(first, second);
}
