// src/noyau/derive.rs
//
// Dérivation structurelle.
// - somme, produit n-aire (Leibniz), puissance générale
//     d(f^g) = f^g (g' log f + g f'/f)
//   avec les cas g constant (g f^(g-1) f') et f constant (f^g log f g')
// - chaîne : sin -> cos, cos -> -sin, tan -> 1 + tan², exp -> exp, log -> 1/u
// - ordre n : n passes, chacune suivie de simplify

use super::bornes::{MAX_ORDRE_DERIVATION, MAX_PROFONDEUR};
use super::erreur::{CalcError, Result};
use super::expr::{Expr, Fonction};
use super::simplifie::simplify;

/// Dérivée d’ordre `ordre` (≥ 1) par rapport à `var`, simplifiée.
pub fn differentiate(e: &Expr, var: &str, ordre: u32) -> Result<Expr> {
    if ordre == 0 {
        return Err(CalcError::argument("l’ordre de dérivation doit être ≥ 1"));
    }
    if ordre > MAX_ORDRE_DERIVATION {
        return Err(CalcError::argument(format!(
            "ordre de dérivation limité à {MAX_ORDRE_DERIVATION}"
        )));
    }

    let mut cur = simplify(e)?;
    for _ in 0..ordre {
        cur = simplify(&derive_une_fois(&cur, var, 0)?)?;
        if cur.est_zero() {
            break;
        }
    }
    Ok(cur)
}

fn derive_une_fois(e: &Expr, var: &str, profondeur: usize) -> Result<Expr> {
    if profondeur > MAX_PROFONDEUR {
        return Err(CalcError::non_supportee("dérivation trop profonde"));
    }
    if !e.depend_de(var) {
        return Ok(Expr::zero());
    }
    let d = |u: &Expr| derive_une_fois(u, var, profondeur + 1);

    Ok(match e {
        Expr::Nb(_) => Expr::zero(),
        Expr::Sym(s) => {
            if s == var {
                Expr::un()
            } else {
                Expr::zero()
            }
        }

        Expr::Add(termes) => Expr::somme(termes.iter().map(d).collect::<Result<Vec<_>>>()?),

        // (f1 f2 … fn)' = Σ f1 … fi' … fn
        Expr::Mul(facteurs) => {
            let mut termes = Vec::with_capacity(facteurs.len());
            for (i, fi) in facteurs.iter().enumerate() {
                if !fi.depend_de(var) {
                    continue;
                }
                let mut produit: Vec<Expr> = Vec::with_capacity(facteurs.len());
                for (j, fj) in facteurs.iter().enumerate() {
                    if j == i {
                        produit.push(d(fi)?);
                    } else {
                        produit.push(fj.clone());
                    }
                }
                termes.push(Expr::produit(produit));
            }
            Expr::somme(termes)
        }

        Expr::Pow(f, g) => {
            let (f, g) = (f.as_ref(), g.as_ref());
            if !g.depend_de(var) {
                // g f^(g-1) f'
                Expr::produit(vec![
                    g.clone(),
                    Expr::puissance(f.clone(), Expr::difference(g.clone(), Expr::un())),
                    d(f)?,
                ])
            } else if !f.depend_de(var) {
                // f^g log f g'
                Expr::produit(vec![e.clone(), Expr::log(f.clone()), d(g)?])
            } else {
                // f^g (g' log f + g f'/f)
                Expr::produit(vec![
                    e.clone(),
                    Expr::somme(vec![
                        Expr::produit(vec![d(g)?, Expr::log(f.clone())]),
                        Expr::produit(vec![g.clone(), d(f)?, Expr::inverse(f.clone())]),
                    ]),
                ])
            }
        }

        Expr::Func(fun, u) => {
            let u = u.as_ref();
            let externe = match fun {
                Fonction::Sin => Expr::cos(u.clone()),
                Fonction::Cos => Expr::neg(Expr::sin(u.clone())),
                Fonction::Tan => Expr::somme(vec![
                    Expr::un(),
                    Expr::puissance(Expr::tan(u.clone()), Expr::entier(2)),
                ]),
                Fonction::Exp => e.clone(),
                Fonction::Log => Expr::inverse(u.clone()),
            };
            Expr::produit(vec![externe, d(u)?])
        }

        // marqueur : on le résout puis on dérive le résultat
        Expr::Derivee(c, v, n) => {
            let interieur = differentiate(c, v, *n)?;
            d(&interieur)?
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::rpn::parse;

    fn d(txt: &str) -> Expr {
        differentiate(&parse(txt).unwrap(), "x", 1).unwrap()
    }

    fn s(txt: &str) -> Expr {
        simplify(&parse(txt).unwrap()).unwrap()
    }

    #[test]
    fn regles_de_base() {
        assert_eq!(d("x^3"), s("3x^2"));
        assert_eq!(d("5"), Expr::zero());
        assert_eq!(d("y"), Expr::zero());
        assert_eq!(d("x"), Expr::un());
        assert_eq!(d("1/x"), s("-x^(-2)"));
        assert_eq!(d("sqrt(x)"), s("(1/2) x^(-1/2)"));
    }

    #[test]
    fn regle_de_la_chaine() {
        assert_eq!(d("sin(2x)"), s("2cos(2x)"));
        assert_eq!(d("cos(x)"), s("-sin(x)"));
        assert_eq!(d("exp(3x)"), s("3exp(3x)"));
        assert_eq!(d("log(x)"), s("1/x"));
        assert_eq!(d("tan(x)"), s("1 + tan(x)^2"));
        assert_eq!(d("e^(x^2)"), s("2x exp(x^2)"));
    }

    #[test]
    fn produit_et_puissance_generale() {
        assert_eq!(d("x sin(x)"), s("sin(x) + x cos(x)"));
        assert_eq!(d("2^x"), s("2^x log(2)"));
        assert_eq!(d("x^x"), s("x^x (log(x) + 1)"));
    }

    #[test]
    fn ordre_superieur() {
        let p = parse("x^4 - 3x^2 + 7").unwrap();
        assert_eq!(differentiate(&p, "x", 2).unwrap(), s("12x^2 - 6"));
        assert_eq!(differentiate(&p, "x", 5).unwrap(), Expr::zero());
    }

    #[test]
    fn ordre_zero_refuse() {
        assert!(matches!(
            differentiate(&Expr::sym("x"), "x", 0),
            Err(CalcError::InvalidArgument(_))
        ));
    }

    #[test]
    fn variable_explicite() {
        let e = parse("x y^2").unwrap();
        assert_eq!(differentiate(&e, "y", 1).unwrap(), s("2x y"));
    }
}
