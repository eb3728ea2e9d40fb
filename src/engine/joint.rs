use crate::engine::{EngineError, NumericColumn};

/// Sparse 2D histogram over bin pairs of two columns.
///
/// `bins[k]` holds the flattened pair id `i * nbins_y + j` of the k-th
/// occupied pair, `counts[k]` the number of co-occurring rows. Pairs with
/// zero count are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JointDistribution {
    pub bins: Vec<usize>,
    pub counts: Vec<usize>,
}

impl JointDistribution {
    /// Number of occupied bin pairs.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// `(pair_id, count)` in pair-id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.bins.iter().copied().zip(self.counts.iter().copied())
    }

    /// Count for the pair `(i, j)`, given the y column's bin count.
    pub fn count(&self, i: usize, j: usize, nbins_y: usize) -> usize {
        let pair = i * nbins_y + j;
        self.bins
            .iter()
            .position(|&b| b == pair)
            .map_or(0, |k| self.counts[k])
    }
}

/// Joint histogram of row co-occurrence between the bins of two columns.
///
/// For every pair of non-empty bins the intersection size of their member
/// rows is computed by a sorted merge over the bins' row-index orderings
/// (`by_row`; the value orderings used by range filtering cannot drive a
/// merge). With a `mask`, a dense membership table of the mask rows is built
/// once and reused across all pairs, so only masked rows are counted.
///
/// `mask` must be ascending with every element in `[0, N)`; this
/// precondition is not validated.
pub fn dist2d(
    x: &NumericColumn,
    y: &NumericColumn,
    mask: Option<&[usize]>,
) -> Result<JointDistribution, EngineError> {
    let xi = x
        .index()
        .ok_or_else(|| EngineError::IndexNotBuilt(x.name().to_string()))?;
    let yi = y
        .index()
        .ok_or_else(|| EngineError::IndexNotBuilt(y.name().to_string()))?;

    let mut dist = JointDistribution::default();
    let in_mask = mask.map(|mask| {
        let mut table = vec![0u8; x.len()];
        for &row in mask {
            table[row] = 1;
        }
        table
    });

    for (i, xbin) in xi.bins.iter().enumerate() {
        if xbin.is_empty() {
            continue;
        }
        for (j, ybin) in yi.bins.iter().enumerate() {
            if ybin.is_empty() {
                continue;
            }
            let count = match &in_mask {
                None => intersection_count(&xbin.by_row, &ybin.by_row),
                Some(table) => masked_intersection_count(&xbin.by_row, &ybin.by_row, table),
            };
            if count > 0 {
                dist.bins.push(i * yi.nbins + j);
                dist.counts.push(count);
            }
        }
    }

    Ok(dist)
}

fn intersection_count(a: &[usize], b: &[usize]) -> usize {
    let mut count = 0;
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        if a[i] < b[j] {
            i += 1;
        } else if a[i] > b[j] {
            j += 1;
        } else {
            count += 1;
            i += 1;
            j += 1;
        }
    }
    count
}

fn masked_intersection_count(a: &[usize], b: &[usize], in_mask: &[u8]) -> usize {
    let mut count = 0;
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        if a[i] < b[j] {
            i += 1;
        } else if a[i] > b[j] {
            j += 1;
        } else {
            if in_mask[a[i]] == 1 {
                count += 1;
            }
            i += 1;
            j += 1;
        }
    }
    count
}
