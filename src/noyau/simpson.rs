// src/noyau/simpson.rs
//
// Règle de Simpson composite sur n sous-intervalles (n pair, 2 ≤ n ≤ MAX_SIMPSON_N).

use super::bornes::MAX_SIMPSON_N;
use super::erreur::{CalcError, Result};
use super::expr::Expr;
use super::lecture::evalue_en;

pub fn simpson(e: &Expr, var: &str, a: f64, b: f64, n: i64) -> Result<f64> {
    if n < 2 || n % 2 != 0 {
        return Err(CalcError::argument(format!(
            "n doit être pair et ≥ 2 (reçu {n})"
        )));
    }
    if n > MAX_SIMPSON_N {
        return Err(CalcError::argument(format!(
            "n trop grand (reçu {n}, maximum {MAX_SIMPSON_N})"
        )));
    }
    if !a.is_finite() || !b.is_finite() {
        return Err(CalcError::argument("bornes non finies"));
    }

    let f = |x: f64| evalue_en(e, var, x);
    let h = (b - a) / n as f64;

    let mut s = f(a)? + f(b)?;
    for i in 1..n {
        let poids = if i % 2 == 1 { 4.0 } else { 2.0 };
        s += poids * f(a + i as f64 * h)?;
    }
    Ok(s * h / 3.0)
}
