// Shapiro-Wilk normality test
//
// Royston, P. (1995). Remark AS R94: A remark on Algorithm AS 181: The W-test
// for normality. Applied Statistics, 44(4), 547-551.
//
// Coefficients a_i come from Royston's polynomial approximation to the
// expected normal order statistics; the p-value from his normalizing
// transformation of W (separate fits for n <= 11 and n > 11). This is the
// algorithm behind R's `shapiro.test`.
//
// H0: the sample is drawn from a normal distribution.

use super::outcome::{require_len, standard_normal, Result, StatsError, TestOutcome};
use statrs::distribution::ContinuousCDF;

/// Royston's approximation is validated up to this size
pub const MAX_RELIABLE_N: usize = 5000;

const SMALL: f64 = 1e-19;

// Polynomial coefficients, lowest order first
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

// 6/pi and asin(sqrt(3/4)), for the exact n = 3 distribution
const PI6: f64 = 1.909_859_317_102_744;
const STQR: f64 = 1.047_197_551_196_598;

/// Shapiro-Wilk W statistic and p-value
///
/// # Errors
/// `InsufficientData` for fewer than 3 observations, `ZeroRange` when all
/// observations are equal.
///
/// # Example
/// ```
/// use abtest::hypothesis::shapiro_wilk;
///
/// let outcome = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
/// assert!((outcome.statistic - 1.0).abs() < 1e-12);
/// ```
pub fn shapiro_wilk(sample: &[f64]) -> Result<TestOutcome> {
    require_len(sample, 3)?;

    let n = sample.len();
    if n > MAX_RELIABLE_N {
        tracing::warn!(n, "Shapiro-Wilk p-value may be inaccurate for n > 5000");
    }

    let mut x = sample.to_vec();
    x.sort_by(f64::total_cmp);

    let range = x[n - 1] - x[0];
    if range < SMALL {
        return Err(StatsError::ZeroRange);
    }

    let a = coefficients(n)?;
    let w = w_statistic(&x, &a);
    let pvalue = w_pvalue(w, n)?;

    Ok(TestOutcome::new(w, pvalue))
}

/// Antisymmetric weights a_1..a_{n/2} (the upper half mirrors with sign flip)
fn coefficients(n: usize) -> Result<Vec<f64>> {
    let half = n / 2;
    if n == 3 {
        return Ok(vec![std::f64::consts::FRAC_1_SQRT_2]);
    }

    let normal = standard_normal()?;
    let an25 = n as f64 + 0.25;
    let m: Vec<f64> = (1..=half)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / an25))
        .collect();

    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let mut a = vec![0.0; half];
    a[0] = a1;

    let (first_scaled, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        let fac = ((summ2 - 2.0 * m[0].powi(2) - 2.0 * m[1].powi(2))
            / (1.0 - 2.0 * a1.powi(2) - 2.0 * a2.powi(2)))
        .sqrt();
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0].powi(2)) / (1.0 - 2.0 * a1.powi(2))).sqrt();
        (1, fac)
    };

    for i in first_scaled..half {
        a[i] = -m[i] / fac;
    }

    Ok(a)
}

/// W = (sum a_i (x_(n+1-i) - x_(i)))^2 / sum (x - mean)^2 over sorted x
fn w_statistic(sorted: &[f64], a: &[f64]) -> f64 {
    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let ss: f64 = sorted.iter().map(|x| (x - mean).powi(2)).sum();

    let numerator: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (sorted[n - 1 - i] - sorted[i]))
        .sum();

    (numerator * numerator / ss).min(1.0)
}

fn w_pvalue(w: f64, n: usize) -> Result<f64> {
    if n == 3 {
        let p = PI6 * (w.sqrt().asin() - STQR);
        return Ok(p.max(0.0));
    }

    let nf = n as f64;
    let mut w1 = (1.0 - w).ln();

    let (m, s) = if n <= 11 {
        let gamma = poly(&G, nf);
        if w1 >= gamma {
            return Ok(SMALL);
        }
        w1 = -(gamma - w1).ln();
        (poly(&C3, nf), poly(&C4, nf).exp())
    } else {
        let ln_n = nf.ln();
        (poly(&C5, ln_n), poly(&C6, ln_n).exp())
    };

    let normal = standard_normal()?;
    Ok(normal.sf((w1 - m) / s))
}

/// Evaluate c[0] + c[1] x + c[2] x^2 + ...
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}
