use crate::engine::{EngineError, NumericColumn, RowSet};

/// Row indices whose value lies in `[lo, hi]`, ascending.
///
/// The histogram index bounds the search to the two boundary bins: the query
/// range is clamped to the column's value bounds, every bin strictly between
/// the boundary bins is taken wholesale, and only the boundary bins are
/// scanned (they are value-sorted, so each scan stops as soon as it leaves
/// the range). Cost is proportional to the two boundary bins plus the match,
/// not the column length.
///
/// Returns [`EngineError::IndexNotBuilt`] until the column has an index.
pub fn filter(column: &NumericColumn, lo: f64, hi: f64) -> Result<RowSet, EngineError> {
    let index = column
        .index()
        .ok_or_else(|| EngineError::IndexNotBuilt(column.name().to_string()))?;
    let values = column.values();

    let lo = lo.max(index.min);
    let hi = hi.min(index.max);
    let mut hits: RowSet = Vec::new();
    if lo > hi {
        // Query range lies entirely outside the column's bounds.
        return Ok(hits);
    }

    let min_bin = index.bin_of(lo);
    let max_bin = index.bin_of(hi);

    if min_bin == max_bin {
        let bin = &index.bins[min_bin].by_value;
        let mut i = 0;
        while i < bin.len() && values[bin[i]] < lo {
            i += 1;
        }
        while i < bin.len() && values[bin[i]] <= hi {
            hits.push(bin[i]);
            i += 1;
        }
    } else {
        // Boundary bin on the low side: skip values below the range, keep
        // the rest of the bin.
        let first = &index.bins[min_bin].by_value;
        let mut i = 0;
        while i < first.len() && values[first[i]] < lo {
            i += 1;
        }
        hits.extend_from_slice(&first[i..]);

        // Interior bins are fully covered by the range.
        for bin in &index.bins[min_bin + 1..max_bin] {
            hits.extend_from_slice(&bin.by_value);
        }

        // Boundary bin on the high side: keep values up to the range end.
        let last = &index.bins[max_bin].by_value;
        let mut i = 0;
        while i < last.len() && values[last[i]] <= hi {
            hits.push(last[i]);
            i += 1;
        }
    }

    // Hits were collected in bin-then-value order; the row-id set contract
    // is ascending row index.
    hits.sort_unstable();
    Ok(hits)
}
