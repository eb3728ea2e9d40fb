//! Boolean algebra over sorted row-id sets.
//!
//! Every operand must be a [`RowSet`] in its canonical form: strictly
//! ascending, duplicate-free row indices. The routines here trade input
//! validation for throughput and do not re-check that contract; feeding an
//! unsorted or duplicated sequence produces unspecified output.

use std::cmp::Ordering;

use crate::engine::RowSet;

/// Rows present in either `a` or `b`.
pub fn union(a: &[usize], b: &[usize]) -> RowSet {
    let mut res = Vec::with_capacity(a.len() + b.len());
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => {
                res.push(a[i]);
                i += 1;
            }
            Ordering::Greater => {
                res.push(b[j]);
                j += 1;
            }
            Ordering::Equal => {
                res.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    res.extend_from_slice(&a[i..]);
    res.extend_from_slice(&b[j..]);
    res
}

/// Rows present in both `a` and `b`.
pub fn intersect(a: &[usize], b: &[usize]) -> RowSet {
    let mut res = Vec::with_capacity(a.len().min(b.len()));
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                res.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    res
}

/// Rows in `[0, n)` absent from `a`. Every element of `a` must lie in
/// `[0, n)`.
pub fn complement(a: &[usize], n: usize) -> RowSet {
    let mut res = Vec::with_capacity(n.saturating_sub(a.len()));
    let mut i = 0;
    for row in 0..n {
        if i < a.len() && a[i] == row {
            i += 1;
        } else {
            res.push(row);
        }
    }
    res
}
