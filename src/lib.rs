//! # crossbin
//!
//! `crossbin` is an in-memory binned-index engine for interactive
//! "slice and filter" data exploration. It holds fixed-size numeric columns,
//! partitions each into equal-width histogram bins, and answers range
//! queries, boolean combinations of query results, and two-column joint
//! histograms in time proportional to the touched bins rather than the
//! column length. It supports:
//!
//! - Memory-mapped loading of delimited text files (tab-separated by default)
//! - Null-aware columns (empty cells are tracked by index, never by sentinel)
//! - Equal-width histogram indices, built in parallel with Rayon
//! - Bin-bounded range filters returning sorted row-id sets
//! - Sorted-set algebra (union, intersect, complement) over filter results
//! - Sparse 2D histograms between column pairs, with optional row masks
//! - LRU caching of filter results for repeated interactive queries
//! - Arrow export of the loaded columns (validity bitmaps from the null lists)
//!
//! # Example
//!
//! ```rust
//! use crossbin::engine::set_ops;
//! use crossbin::engine::{Dataset, NumericColumn};
//!
//! let mut dataset = Dataset::new();
//! dataset.push(NumericColumn::new("length", vec![1.0, 5.0, 9.0], vec![]));
//! dataset.push(NumericColumn::new("weight", vec![2.0, 6.0, 0.0], vec![2]));
//! dataset.preprocess(3);
//!
//! // Rows with length in [1, 5]
//! let long = dataset.filter("length", 1.0, 5.0).unwrap();
//! assert_eq!(long, vec![0, 1]);
//!
//! // Combine with a second filter
//! let heavy = dataset.filter("weight", 5.0, 7.0).unwrap();
//! assert_eq!(set_ops::intersect(&long, &heavy), vec![1]);
//!
//! // Joint histogram between the two columns
//! let joint = dataset.dist2d("length", "weight", None).unwrap();
//! assert!(!joint.is_empty());
//! ```

mod helpers;
pub mod engine;
