//! Small numeric helpers: group means, sample variance and type-7 quantiles.

/// Arithmetic mean; NaN for an empty slice.
///
/// A NaN anywhere in `values` makes the result NaN.
pub fn mean(values: &[f64]) -> f64 {
    match values.len() {
        0 => f64::NAN,
        n => values.iter().sum::<f64>() / n as f64,
    }
}

/// Unbiased sample variance (`n - 1` denominator); 0.0 below two values.
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    ss / (values.len() - 1) as f64
}

/// Hyndman-Fan type 7 quantile of an ascending slice.
///
/// `p` is clamped to `[0, 1]`. Returns NaN when `sorted` is empty.
pub fn quantile_type7(sorted: &[f64], p: f64) -> f64 {
    let Some(last) = sorted.len().checked_sub(1) else {
        return f64::NAN;
    };
    let pos = last as f64 * p.clamp(0.0, 1.0);
    let below = pos.floor() as usize;
    let above = usize::min(below + 1, last);
    let frac = pos - below as f64;
    sorted[below] + frac * (sorted[above] - sorted[below])
}

/// The finite values of `values`, ascending.
pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    out.sort_by(f64::total_cmp);
    out
}
