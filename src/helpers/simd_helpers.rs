#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{
    _mm256_loadu_pd, _mm256_max_pd, _mm256_min_pd, _mm256_set1_pd, _mm256_storeu_pd,
};

/// Single-pass min and max over a dense f64 slice, `None` when empty.
///
/// Uses AVX2 when available at runtime, with a scalar fallback. Values must
/// not contain NaN.
pub fn min_max_f64(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            return Some(unsafe { min_max_f64_avx2(values) });
        }
    }
    Some(min_max_f64_scalar(values))
}

fn min_max_f64_scalar(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn min_max_f64_avx2(values: &[f64]) -> (f64, f64) {
    const LANES: usize = 4; // __m256d holds 4 f64s
    let mut min = _mm256_set1_pd(f64::INFINITY);
    let mut max = _mm256_set1_pd(f64::NEG_INFINITY);

    let chunks = values.chunks_exact(LANES);
    let remainder = chunks.remainder();

    for chunk in chunks {
        let v = _mm256_loadu_pd(chunk.as_ptr());
        min = _mm256_min_pd(min, v);
        max = _mm256_max_pd(max, v);
    }

    // horizontal reduction
    let mut min_arr = [f64::INFINITY; LANES];
    let mut max_arr = [f64::NEG_INFINITY; LANES];
    _mm256_storeu_pd(min_arr.as_mut_ptr(), min);
    _mm256_storeu_pd(max_arr.as_mut_ptr(), max);

    let mut total_min = min_arr.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let mut total_max = max_arr.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));

    for &v in remainder {
        if v < total_min {
            total_min = v;
        }
        if v > total_max {
            total_max = v;
        }
    }

    (total_min, total_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn empty_slice_has_no_bounds() {
        assert_eq!(min_max_f64(&[]), None);
    }

    #[test]
    fn matches_scalar_fold_on_random_data() {
        let mut rng = rand::rng();
        // Lengths straddle the 4-lane boundary.
        for n in [1, 3, 4, 5, 63, 64, 65, 1000] {
            let values: Vec<f64> = (0..n).map(|_| rng.random_range(-1e6..1e6)).collect();
            let expected = min_max_f64_scalar(&values);
            assert_eq!(min_max_f64(&values), Some(expected));
        }
    }
}
