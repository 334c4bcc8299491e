//! Interval scanner: samples `f` on a regular grid and reports where it changes
//! sign, to seed the root finders.

use crate::config::ScanSettings;
use crate::error::RootFindError;
use crate::traits::ScalarFunction;
use log::debug;
use serde::Serialize;

/// Sampled values below this magnitude count as roots.
pub const ROOT_EPSILON: f64 = 1e-12;

/// Consecutive samples ranked by `|f(a)| + |f(b)|`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedPair {
    pub a: f64,
    pub b: f64,
    pub score: f64,
}

/// Grid points `start, start + step, ...` with `end` always included, paired
/// with `f` at each point. Non-finite values are kept so callers can skip them.
pub fn sample<F: ScalarFunction + ?Sized>(
    f: &F,
    settings: &ScanSettings,
) -> Result<Vec<(f64, f64)>, RootFindError> {
    settings.validate()?;
    let ScanSettings { start, end, step } = *settings;
    let count = ((end - start) / step).floor() as usize;
    let mut points = Vec::with_capacity(count + 2);
    for i in 0..=count {
        let x = start + i as f64 * step;
        if end - x > step * 1e-9 {
            points.push(x);
        }
    }
    points.push(end);
    Ok(points.into_iter().map(|x| (x, f.evaluate(x))).collect())
}

fn finite_pairs(samples: &[(f64, f64)]) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
    samples
        .windows(2)
        .map(|w| (w[0], w[1]))
        .filter(|((_, fa), (_, fb))| fa.is_finite() && fb.is_finite())
}

fn changes_sign(fa: f64, fb: f64) -> bool {
    fa != 0.0 && fb != 0.0 && (fa < 0.0) != (fb < 0.0)
}

/// Consecutive sample pairs `(a, b)` with `f(a) * f(b) < 0`, left to right.
pub fn scan<F: ScalarFunction + ?Sized>(
    f: &F,
    settings: &ScanSettings,
) -> Result<Vec<(f64, f64)>, RootFindError> {
    let samples = sample(f, settings)?;
    let brackets: Vec<(f64, f64)> = finite_pairs(&samples)
        .filter(|((_, fa), (_, fb))| changes_sign(*fa, *fb))
        .map(|((a, _), (b, _))| (a, b))
        .collect();
    debug!(
        "scan over [{}, {}] step {}: {} sample(s), {} bracket(s)",
        settings.start,
        settings.end,
        settings.step,
        samples.len(),
        brackets.len()
    );
    Ok(brackets)
}

/// The first consecutive pair that either changes sign or has an endpoint
/// where `|f| < ROOT_EPSILON`.
pub fn find_bracket<F: ScalarFunction + ?Sized>(
    f: &F,
    settings: &ScanSettings,
) -> Result<Option<(f64, f64)>, RootFindError> {
    let samples = sample(f, settings)?;
    let found = finite_pairs(&samples)
        .find(|((_, fa), (_, fb))| {
            changes_sign(*fa, *fb) || fa.abs() < ROOT_EPSILON || fb.abs() < ROOT_EPSILON
        })
        .map(|((a, _), (b, _))| (a, b));
    Ok(found)
}

/// Consecutive pairs in ascending order of `|f(a)| + |f(b)|`. Pairs touching a
/// sampled root are left out.
pub fn rank_pairs<F: ScalarFunction + ?Sized>(
    f: &F,
    settings: &ScanSettings,
) -> Result<Vec<RankedPair>, RootFindError> {
    let samples = sample(f, settings)?;
    let mut ranked: Vec<RankedPair> = finite_pairs(&samples)
        .filter(|((_, fa), (_, fb))| fa.abs() >= ROOT_EPSILON && fb.abs() >= ROOT_EPSILON)
        .map(|((a, fa), (b, fb))| RankedPair {
            a,
            b,
            score: fa.abs() + fb.abs(),
        })
        .collect();
    ranked.sort_by(|l, r| l.score.total_cmp(&r.score));
    Ok(ranked)
}

/// Seeds for the secant method: the first bracket when one exists, otherwise
/// the best-ranked pair.
pub fn suggest_secant_seeds<F: ScalarFunction + ?Sized>(
    f: &F,
    settings: &ScanSettings,
) -> Result<Option<(f64, f64)>, RootFindError> {
    if let Some(bracket) = find_bracket(f, settings)? {
        return Ok(Some(bracket));
    }
    Ok(rank_pairs(f, settings)?
        .first()
        .map(|pair| (pair.a, pair.b)))
}
