use crate::helpers::simd_helpers::min_max_f64;

/// Padding added to the value range before dividing it into bins, so the
/// maximum value lands strictly inside the last bin.
pub const BIN_EPSILON: f64 = 1e-6;

/// One contiguous value-range partition of a column's non-null rows.
///
/// The same membership is kept in two orders because the two consumers need
/// different ones: range filters scan boundary bins in value order, while
/// joint-histogram intersection merges bins in row-index order. Neither view
/// may be re-sorted for the other.
#[derive(Debug, Clone, Default)]
pub struct Bin {
    /// Member rows, ascending by underlying value.
    pub by_value: Vec<usize>,
    /// The same rows, ascending by row index.
    pub by_row: Vec<usize>,
}

impl Bin {
    pub fn len(&self) -> usize {
        self.by_row.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_row.is_empty()
    }
}

/// Cached per-column bin structure plus value bounds.
#[derive(Debug, Clone)]
pub struct HistogramIndex {
    /// Minimum non-null value (0.0 for an all-null column).
    pub min: f64,
    /// Maximum non-null value (0.0 for an all-null column).
    pub max: f64,
    pub nbins: usize,
    pub bin_size: f64,
    /// The bins partition exactly the non-null rows of the column.
    pub bins: Vec<Bin>,
}

impl HistogramIndex {
    /// The bin a value belongs to. Callers pass values clamped to
    /// `[min, max]`; the clamp to `nbins - 1` only guards float rounding.
    pub fn bin_of(&self, value: f64) -> usize {
        (((value - self.min) / self.bin_size) as usize).min(self.nbins - 1)
    }
}

/// Build an equal-width histogram index over the non-null rows of a column.
///
/// `nulls` must be strictly ascending; its rows are skipped by a two-pointer
/// merge in both passes. A zero-width value range (constant or empty column)
/// collapses to a single bin of width 1.0 rather than erroring.
pub fn build(values: &[f64], nulls: &[usize], nbins: usize) -> HistogramIndex {
    let requested = nbins.max(1);
    let (min, max) = non_null_bounds(values, nulls).unwrap_or((0.0, 0.0));
    let (nbins, bin_size) = if max == min {
        (1, 1.0)
    } else {
        (requested, (max - min + BIN_EPSILON) / requested as f64)
    };

    let mut index = HistogramIndex {
        min,
        max,
        nbins,
        bin_size,
        bins: (0..nbins).map(|_| Bin::default()).collect(),
    };

    // Rows are visited in ascending index order, so pushing into `by_row`
    // keeps it sorted for free.
    let mut j = 0;
    for (row, &v) in values.iter().enumerate() {
        if j < nulls.len() && nulls[j] == row {
            j += 1;
            continue;
        }
        let b = index.bin_of(v);
        index.bins[b].by_row.push(row);
    }

    for bin in &mut index.bins {
        bin.by_value = bin.by_row.clone();
        if bin.by_value.len() > 1 {
            bin.by_value
                .sort_unstable_by(|&a, &b| values[a].total_cmp(&values[b]));
        }
    }

    index
}

/// Min and max over the non-null values, `None` if every row is null.
fn non_null_bounds(values: &[f64], nulls: &[usize]) -> Option<(f64, f64)> {
    if nulls.is_empty() {
        // Dense fast path: no rows to skip.
        return min_max_f64(values);
    }
    let mut j = 0;
    let mut bounds: Option<(f64, f64)> = None;
    for (row, &v) in values.iter().enumerate() {
        if j < nulls.len() && nulls[j] == row {
            j += 1;
            continue;
        }
        bounds = Some(match bounds {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        });
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn bins_partition_non_null_rows() {
        let mut rng = rand::rng();
        let mut values = Vec::with_capacity(1000);
        let mut nulls = Vec::new();
        for row in 0..1000 {
            if rng.random_range(0..10) == 0 {
                nulls.push(row);
                values.push(0.0);
            } else {
                values.push(rng.random_range(-50.0..50.0));
            }
        }

        let index = build(&values, &nulls, 16);

        let mut seen: Vec<usize> = index
            .bins
            .iter()
            .flat_map(|bin| bin.by_row.iter().copied())
            .collect();
        seen.sort_unstable();
        let expected: Vec<usize> = (0..values.len())
            .filter(|row| !nulls.contains(row))
            .collect();
        // Sorted equality covers both disjointness and full coverage.
        assert_eq!(seen, expected);
    }

    #[test]
    fn every_member_maps_back_to_its_bin() {
        let mut rng = rand::rng();
        let values: Vec<f64> = (0..500).map(|_| rng.random_range(0.0..1.0)).collect();
        let index = build(&values, &[], 8);
        for (b, bin) in index.bins.iter().enumerate() {
            for &row in &bin.by_row {
                assert_eq!(index.bin_of(values[row]), b);
            }
        }
    }

    #[test]
    fn orderings_share_membership() {
        let values = vec![9.0, 1.0, 5.0, 3.0, 7.0, 2.0];
        let index = build(&values, &[], 2);
        for bin in &index.bins {
            let mut by_value = bin.by_value.clone();
            by_value.sort_unstable();
            assert_eq!(by_value, bin.by_row);
            assert!(bin
                .by_value
                .windows(2)
                .all(|w| values[w[0]] <= values[w[1]]));
            assert!(bin.by_row.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn constant_column_collapses_to_one_bin() {
        let index = build(&[4.2, 4.2, 4.2], &[], 50);
        assert_eq!(index.nbins, 1);
        assert_eq!(index.bin_size, 1.0);
        assert_eq!(index.bins[0].by_row, vec![0, 1, 2]);
    }

    #[test]
    fn empty_and_all_null_columns_collapse_to_one_bin() {
        let empty = build(&[], &[], 50);
        assert_eq!(empty.nbins, 1);
        assert!(empty.bins[0].is_empty());

        let all_null = build(&[0.0, 0.0], &[0, 1], 50);
        assert_eq!(all_null.nbins, 1);
        assert!(all_null.bins[0].is_empty());
    }

    #[test]
    fn null_placeholders_never_enter_bins() {
        // The placeholder 0.0 of the null row sits below every real value;
        // it must not stretch the bounds or occupy a bin.
        let index = build(&[0.0, 10.0, 20.0], &[0], 2);
        assert_eq!(index.min, 10.0);
        assert_eq!(index.max, 20.0);
        let total: usize = index.bins.iter().map(Bin::len).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn zero_requested_bins_is_treated_as_one() {
        let index = build(&[1.0, 2.0], &[], 0);
        assert_eq!(index.nbins, 1);
        assert_eq!(index.bins[0].by_row, vec![0, 1]);
    }
}
