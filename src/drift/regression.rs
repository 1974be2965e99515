/// Ordinary least-squares slope of `y` against `x` (units of y per unit of x).
///
/// Returns `None` when the window holds fewer than two points or every `x` is the
/// same, since no line is defined there.
pub fn linreg_slope(samples: &[(f64, f64)]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }
    let n = samples.len() as f64;
    let mx = samples.iter().map(|(x, _)| *x).sum::<f64>() / n;
    let my = samples.iter().map(|(_, y)| *y).sum::<f64>() / n;
    let (mut num, mut den) = (0.0, 0.0);
    for (x, y) in samples {
        let dx = *x - mx;
        num += dx * (*y - my);
        den += dx * dx;
    }
    if den > 0.0 {
        Some(num / den)
    } else {
        None
    }
}

/// Slope in Hz/min for a window of (elapsed seconds, Hz) pairs.
pub fn slope_hz_per_min(samples: &[(f64, f64)]) -> Option<f64> {
    linreg_slope(samples).map(|hz_per_sec| hz_per_sec * 60.0)
}
