// src/noyau/serie.rs
//
// Développement de Taylor à l’ordre n autour d’un centre :
//   Σ_{i=0..n} f⁽ⁱ⁾(c) / i! · (x - c)^i

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;
use tracing::debug;

use super::bornes::MAX_ORDRE_TAYLOR;
use super::derive::differentiate;
use super::erreur::{CalcError, Result};
use super::expr::Expr;
use super::simplifie::simplify;

pub fn taylor(e: &Expr, var: &str, centre: &Expr, n: i64) -> Result<Expr> {
    if n < 0 {
        return Err(CalcError::argument("l’ordre du développement doit être ≥ 0"));
    }
    if n > MAX_ORDRE_TAYLOR {
        return Err(CalcError::argument(format!(
            "ordre du développement limité à {MAX_ORDRE_TAYLOR}"
        )));
    }

    let centre = simplify(centre)?;
    let ecart = Expr::difference(Expr::sym(var), centre.clone());

    let mut derivee = simplify(e)?;
    let mut factorielle = BigInt::one();
    let mut termes = Vec::with_capacity(n as usize + 1);

    for i in 0..=n {
        if i > 0 {
            factorielle *= i;
            derivee = differentiate(&derivee, var, 1)?;
        }
        let valeur = simplify(&derivee.substitue(var, &centre))?;
        if !valeur.est_zero() {
            termes.push(Expr::produit(vec![
                valeur,
                Expr::rationnel(BigRational::new(BigInt::one(), factorielle.clone())),
                Expr::puissance(ecart.clone(), Expr::entier(i)),
            ]));
        }
    }

    debug!(ordre = n, termes = termes.len(), "développement de Taylor");
    simplify(&Expr::somme(termes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::rpn::parse;

    fn s(txt: &str) -> Expr {
        simplify(&parse(txt).unwrap()).unwrap()
    }

    fn t(txt: &str, centre: Expr, n: i64) -> Expr {
        taylor(&parse(txt).unwrap(), "x", &centre, n).unwrap()
    }

    #[test]
    fn exponentielle_en_zero() {
        assert_eq!(
            t("exp(x)", Expr::zero(), 4),
            s("1 + x + x^2/2 + x^3/6 + x^4/24")
        );
    }

    #[test]
    fn sinus_termes_impairs() {
        assert_eq!(t("sin(x)", Expr::zero(), 5), s("x - x^3/6 + x^5/120"));
        assert_eq!(t("cos(x)", Expr::zero(), 3), s("1 - x^2/2"));
    }

    #[test]
    fn polynome_reproduit() {
        assert_eq!(t("x^3 - 2x + 1", Expr::zero(), 6), s("x^3 - 2x + 1"));
    }

    #[test]
    fn centre_non_nul() {
        // log(x) autour de 1 : (x-1) - (x-1)^2/2
        assert_eq!(t("log(x)", Expr::un(), 2), s("(x - 1) - (x - 1)^2/2"));
    }

    #[test]
    fn ordre_zero_et_ordre_negatif() {
        assert_eq!(t("exp(x)", Expr::zero(), 0), Expr::un());
        assert!(matches!(
            taylor(&Expr::sym("x"), "x", &Expr::zero(), -1),
            Err(CalcError::InvalidArgument(_))
        ));
    }
}
