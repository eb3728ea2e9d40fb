//! Ingestion adapter: delimited text file -> [`Dataset`].
//!
//! The expected layout is a header line whose first two fields are row
//! identifiers (gene id / gene name in the original atlas dumps) followed by
//! the names of the numeric series; `#`-prefixed lines are comments. An
//! empty cell records a null (the placeholder 0.0 plus a null-list entry),
//! never a parsed number.
//!
//! Malformed rows are handled permissively: short rows treat the missing
//! trailing cells as nulls, unparsable or non-finite cells become nulls, and
//! each such repair is reported in the returned [`ParseSummary`]. Only an
//! unreadable file is fatal.

use std::fs::File;
use std::path::Path;

use memchr::{memchr, memchr_iter};
use memmap2::Mmap;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::engine::{Dataset, EngineError, NumericColumn};

/// Tab, the delimiter of the original atlas dumps.
pub const DEFAULT_DELIMITER: u8 = b'\t';

/// Leading identifier fields skipped on every line.
const ID_COLUMNS: usize = 2;

#[derive(Debug)]
pub struct ParseSummary {
    pub rows_processed: usize,
    pub errors: Vec<ParseError>,
}

/// One repaired cell or row, by 0-based data-row ordinal.
#[derive(Debug)]
pub struct ParseError {
    pub row: usize,
    pub column: String,
    pub value: String,
    pub error: String,
}

/// Per-chunk parse output; null indices and error rows are chunk-local until
/// the merge rebases them.
struct Batch {
    values: Vec<Vec<f64>>,
    nulls: Vec<Vec<usize>>,
    row_count: usize,
    errors: Vec<ParseError>,
}

/// Load a tab-separated file. See [`load_delimited`].
pub fn load_tsv(path: &Path) -> Result<(Dataset, ParseSummary), EngineError> {
    load_delimited(path, DEFAULT_DELIMITER)
}

/// Loads a delimited text file into a [`Dataset`] using memory mapping.
///
/// Chunks of the mapped file are parsed in parallel, split on line
/// boundaries, then merged in order with chunk-local null indices rebased to
/// global row numbers.
///
/// # Errors
/// Returns an [`EngineError`] if the file cannot be opened or mapped, or if
/// no header naming at least one numeric series is found.
///
/// # Example
/// ```no_run
/// # use crossbin::engine::ingest;
/// let (mut dataset, summary) = ingest::load_tsv("atlas.tsv".as_ref()).unwrap();
/// println!("{} rows, {} repaired cells", summary.rows_processed, summary.errors.len());
/// dataset.preprocess(50);
/// ```
pub fn load_delimited(path: &Path, delimiter: u8) -> Result<(Dataset, ParseSummary), EngineError> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    let buf: &[u8] = &mmap[..];

    let (header, data_start) = header_line(buf)?;
    let fields: Vec<&[u8]> = header.split(|&b| b == delimiter).collect();
    if fields.len() <= ID_COLUMNS {
        return Err(EngineError::Parse(format!(
            "header names no numeric series (got {} fields, need more than {})",
            fields.len(),
            ID_COLUMNS
        )));
    }
    let series: Vec<String> = fields[ID_COLUMNS..]
        .iter()
        .map(|s| String::from_utf8_lossy(s).to_string())
        .collect();

    let data = &buf[data_start..];
    let chunks = find_chunk_boundaries(data, rayon::current_num_threads());

    // Estimate rows per chunk for preallocation
    let avg_line_len = header.len() + 1;
    let estimated_rows = data.len() / chunks.len().max(1) / avg_line_len + 100;

    let batches: Vec<Batch> = chunks
        .par_iter()
        .map(|&(start, end)| parse_chunk(&data[start..end], &series, delimiter, estimated_rows))
        .collect();

    // Merge in chunk order, rebasing row-local indices to global rows.
    let mut values: Vec<Vec<f64>> = (0..series.len()).map(|_| Vec::new()).collect();
    let mut nulls: Vec<Vec<usize>> = (0..series.len()).map(|_| Vec::new()).collect();
    let mut errors = Vec::new();
    let mut base = 0;
    for mut batch in batches {
        for col in 0..series.len() {
            values[col].append(&mut batch.values[col]);
            nulls[col].extend(batch.nulls[col].iter().map(|&row| base + row));
        }
        errors.extend(batch.errors.into_iter().map(|mut e| {
            e.row += base;
            e
        }));
        base += batch.row_count;
    }

    let mut dataset = Dataset::new();
    for (name, (v, n)) in series.into_iter().zip(values.into_iter().zip(nulls)) {
        dataset.push(NumericColumn::new(name, v, n));
    }

    tracing::debug!(
        rows = base,
        columns = dataset.column_count(),
        repaired = errors.len(),
        "loaded delimited file"
    );

    Ok((
        dataset,
        ParseSummary {
            rows_processed: base,
            errors,
        },
    ))
}

/// First non-comment, non-empty line, and the offset just past it.
fn header_line(buf: &[u8]) -> Result<(&[u8], usize), EngineError> {
    let mut offset = 0;
    while offset < buf.len() {
        let end = memchr(b'\n', &buf[offset..]).map_or(buf.len(), |p| offset + p);
        let line = trim_cr(&buf[offset..end]);
        if !line.is_empty() && !line.starts_with(b"#") {
            return Ok((line, (end + 1).min(buf.len())));
        }
        offset = end + 1;
    }
    Err(EngineError::Parse("missing header line".to_string()))
}

fn trim_cr(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    }
}

/// Split `data` into up to `num_chunks` ranges, each ending on a newline.
fn find_chunk_boundaries(data: &[u8], num_chunks: usize) -> Vec<(usize, usize)> {
    if data.is_empty() {
        return vec![];
    }

    let num_chunks = num_chunks.max(1);
    let chunk_size = data.len() / num_chunks;
    let mut boundaries = Vec::with_capacity(num_chunks);
    let mut start = 0;

    for i in 0..num_chunks - 1 {
        let mut end = (i + 1) * chunk_size;
        while end < data.len() && data[end] != b'\n' {
            end += 1;
        }
        if end < data.len() {
            end += 1; // include the newline
        }
        if start < end {
            boundaries.push((start, end));
        }
        start = end;
    }

    if start < data.len() {
        boundaries.push((start, data.len()));
    }

    boundaries
}

fn parse_chunk(chunk: &[u8], series: &[String], delimiter: u8, estimated_rows: usize) -> Batch {
    let ncols = series.len();
    let mut batch = Batch {
        values: (0..ncols)
            .map(|_| Vec::with_capacity(estimated_rows))
            .collect(),
        nulls: (0..ncols).map(|_| Vec::new()).collect(),
        row_count: 0,
        errors: Vec::new(),
    };
    let mut fields: Vec<&[u8]> = Vec::with_capacity(ID_COLUMNS + ncols);

    let mut start = 0;
    for newline_pos in memchr_iter(b'\n', chunk) {
        let line = &chunk[start..newline_pos];
        start = newline_pos + 1;
        parse_line(line, series, delimiter, &mut fields, &mut batch);
    }
    // A final line without a trailing newline still counts.
    if start < chunk.len() {
        let line = &chunk[start..];
        parse_line(line, series, delimiter, &mut fields, &mut batch);
    }

    batch
}

fn parse_line<'a>(
    line: &'a [u8],
    series: &[String],
    delimiter: u8,
    fields: &mut Vec<&'a [u8]>,
    batch: &mut Batch,
) {
    let line = trim_cr(line);
    if line.is_empty() || line.starts_with(b"#") {
        return;
    }

    fields.clear();
    let mut field_start = 0;
    for sep in memchr_iter(delimiter, line) {
        fields.push(&line[field_start..sep]);
        field_start = sep + 1;
    }
    fields.push(&line[field_start..]);

    let row = batch.row_count;
    let expected = ID_COLUMNS + series.len();
    if fields.len() != expected {
        batch.errors.push(ParseError {
            row,
            column: String::new(),
            value: format!("expected {} fields, got {}", expected, fields.len()),
            error: "field count mismatch".to_string(),
        });
    }

    for (col, name) in series.iter().enumerate() {
        let cell: &[u8] = fields.get(ID_COLUMNS + col).copied().unwrap_or(&[]);
        if cell.is_empty() {
            batch.nulls[col].push(row);
            batch.values[col].push(0.0);
            continue;
        }
        match fast_float::parse::<f64, _>(cell) {
            Ok(v) if v.is_finite() => batch.values[col].push(v),
            parsed => {
                let error = match parsed {
                    Ok(_) => "non-finite value".to_string(),
                    Err(e) => e.to_string(),
                };
                batch.errors.push(ParseError {
                    row,
                    column: name.clone(),
                    value: String::from_utf8_lossy(cell).to_string(),
                    error,
                });
                batch.nulls[col].push(row);
                batch.values[col].push(0.0);
            }
        }
    }

    batch.row_count += 1;
}
