use std::sync::Arc;

use arrow2::{
    array::{Array, Float64Array},
    bitmap::MutableBitmap,
    chunk::Chunk,
    datatypes::{DataType, Field, Schema},
};
use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};

use crate::engine::{
    cache::{FilterCache, FilterKey},
    filter, histogram, joint,
    histogram::HistogramIndex,
    joint::JointDistribution,
    EngineError, RowSet,
};

/// One named series of float64 values plus its null-row index list.
///
/// `nulls` is the single source of truth for nullability: the value slot of a
/// null row holds a placeholder (0.0 by convention) that must never be read
/// as data. A presence bitmap derived from `nulls` at construction backs
/// [`is_null`](NumericColumn::is_null) and [`value`](NumericColumn::value),
/// so a genuine stored `0.0` is never mistaken for a null.
#[derive(Debug, Clone)]
pub struct NumericColumn {
    name: String,
    values: Vec<f64>,
    nulls: Vec<usize>,
    presence: Vec<u64>,
    index: Option<HistogramIndex>,
}

impl NumericColumn {
    /// Create a column from its dense values and ascending null-row indices.
    ///
    /// Values must be finite; null slots may hold any placeholder. `nulls`
    /// must be strictly ascending and within `[0, values.len())`.
    pub fn new(name: impl Into<String>, values: Vec<f64>, nulls: Vec<usize>) -> Self {
        debug_assert!(nulls.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(nulls.last().map_or(true, |&i| i < values.len()));
        let presence = build_presence(values.len(), &nulls);
        NumericColumn {
            name: name.into(),
            values,
            nulls,
            presence,
            index: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows, nulls included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn non_null_len(&self) -> usize {
        self.values.len() - self.nulls.len()
    }

    /// Raw dense value slots. Null rows hold placeholders; use
    /// [`value`](NumericColumn::value) to read single entries safely.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Ascending indices of the null rows.
    pub fn nulls(&self) -> &[usize] {
        &self.nulls
    }

    pub fn is_null(&self, row: usize) -> bool {
        self.presence[row >> 6] & (1 << (row & 63)) == 0
    }

    /// The value at `row`, or `None` for a null row.
    pub fn value(&self, row: usize) -> Option<f64> {
        if self.is_null(row) {
            None
        } else {
            Some(self.values[row])
        }
    }

    /// The cached histogram index, if [`build_index`](NumericColumn::build_index)
    /// or [`Dataset::preprocess`] has run.
    pub fn index(&self) -> Option<&HistogramIndex> {
        self.index.as_ref()
    }

    /// Build and cache the equal-width histogram index for this column.
    /// The index is frozen until the next explicit rebuild.
    pub fn build_index(&mut self, nbins: usize) {
        self.index = Some(histogram::build(&self.values, &self.nulls, nbins));
    }
}

fn build_presence(len: usize, nulls: &[usize]) -> Vec<u64> {
    let mut bits = vec![u64::MAX; len.div_ceil(64)];
    for &row in nulls {
        bits[row >> 6] &= !(1 << (row & 63));
    }
    bits
}

/// Ordered collection of [`NumericColumn`]s sharing one row count.
/// Iteration order is ingestion order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<NumericColumn>,
}

impl Dataset {
    pub fn new() -> Self {
        Dataset {
            columns: Vec::new(),
        }
    }

    /// Append a column. All columns of a dataset must share the same row
    /// count; this is a construction-time contract, not re-validated per
    /// query.
    pub fn push(&mut self, column: NumericColumn) {
        debug_assert!(
            self.columns.is_empty() || self.columns[0].len() == column.len(),
            "column row count mismatch"
        );
        self.columns.push(column);
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Shared row count of the columns (0 for an empty dataset).
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    /// Columns in ingestion order.
    pub fn columns(&self) -> &[NumericColumn] {
        &self.columns
    }

    pub fn get(&self, name: &str) -> Result<&NumericColumn, EngineError> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| EngineError::MissingColumn(name.to_string()))
    }

    /// Build the histogram index of every column, `nbins` bins each.
    ///
    /// Columns are independent, so the work is spread across the Rayon pool;
    /// the call returns only once every index is in place.
    pub fn preprocess(&mut self, nbins: usize) {
        tracing::debug!(
            columns = self.columns.len(),
            nbins,
            "building histogram indices"
        );
        self.columns
            .par_iter_mut()
            .for_each(|column| column.build_index(nbins));
    }

    /// Row indices whose value in `name` lies in `[lo, hi]`, ascending.
    pub fn filter(&self, name: &str, lo: f64, hi: f64) -> Result<RowSet, EngineError> {
        filter::filter(self.get(name)?, lo, hi)
    }

    /// [`filter`](Dataset::filter) through an LRU cache of past results.
    pub fn filter_cached(
        &self,
        cache: &FilterCache,
        name: &str,
        lo: f64,
        hi: f64,
    ) -> Result<RowSet, EngineError> {
        let key = FilterKey::new(name, lo, hi);
        if let Some(rows) = cache.get(&key) {
            return Ok(rows);
        }
        let rows = self.filter(name, lo, hi)?;
        cache.put(key, rows.clone());
        Ok(rows)
    }

    /// Sparse joint histogram between two columns, optionally restricted to
    /// the rows in `mask` (an ascending row-id set).
    pub fn dist2d(
        &self,
        x: &str,
        y: &str,
        mask: Option<&[usize]>,
    ) -> Result<JointDistribution, EngineError> {
        joint::dist2d(self.get(x)?, self.get(y)?, mask)
    }

    /// Export the columns as nullable Arrow `Float64Array`s, validity taken
    /// from each column's null list.
    pub fn to_arrow(&self) -> (Schema, Chunk<Arc<dyn Array>>) {
        let fields: Vec<Field> = self
            .columns
            .iter()
            .map(|c| Field::new(c.name().to_string(), DataType::Float64, true))
            .collect();
        let schema = Schema::from(fields);

        let arrays: Vec<Arc<dyn Array>> = self
            .columns
            .iter()
            .map(|c| {
                let mut validity = MutableBitmap::with_capacity(c.len());
                for row in 0..c.len() {
                    validity.push(!c.is_null(row));
                }
                let array =
                    Float64Array::new(DataType::Float64, c.values().to_vec().into(), Some(validity.into()));
                Arc::new(array) as Arc<dyn Array>
            })
            .collect();

        (schema, Chunk::new(arrays))
    }
}
