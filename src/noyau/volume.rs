// src/noyau/volume.rs
//
// Volume d’un solide de révolution (méthode des disques).
// - axe x : V = π ∫_a^b f(x)² dx
// - axe y : x = g(y) obtenu en inversant y = f(x) couche par couche,
//           puis V = π ∫_a^b g(y)² dy

use tracing::debug;

use super::bornes::MAX_PROFONDEUR;
use super::erreur::{CalcError, Result};
use super::expr::{Expr, Fonction};
use super::integre::{integrate_definite, Integrale};
use super::simplifie::simplify;

/// Variable de l’image pour la rotation autour de l’axe y.
pub const VAR_IMAGE: &str = "y";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Axe {
    #[default]
    X,
    Y,
}

pub fn volume_of_revolution(e: &Expr, var: &str, a: &Expr, b: &Expr, axe: Axe) -> Result<Integrale> {
    let (rayon, variable) = match axe {
        Axe::X => (simplify(e)?, var),
        Axe::Y => (inverse(e, var, VAR_IMAGE)?, VAR_IMAGE),
    };
    debug!(rayon = %rayon, axe = ?axe, "volume de révolution");

    let integrande = Expr::produit(vec![
        Expr::pi(),
        Expr::puissance(rayon, Expr::entier(2)),
    ]);
    integrate_definite(&integrande, variable, a, b)
}

/// Résout f(var) = image pour var, en retirant une couche à la fois.
pub fn inverse(f: &Expr, var: &str, image: &str) -> Result<Expr> {
    if f.depend_de(image) || !f.depend_de(var) {
        return Err(CalcError::NotInvertible);
    }

    let mut courant = simplify(f)?;
    let mut cible = Expr::sym(image);

    for _ in 0..MAX_PROFONDEUR {
        let (suivant, nouvelle_cible) = match &courant {
            Expr::Sym(s) if s == var => return simplify(&cible),

            Expr::Add(termes) => {
                let (t, autres) = une_seule_dependance(termes, var)?;
                (t, Expr::difference(cible, Expr::somme(autres)))
            }
            Expr::Mul(facteurs) => {
                let (t, autres) = une_seule_dependance(facteurs, var)?;
                (t, Expr::quotient(cible, Expr::produit(autres)))
            }

            // b^k, k constant
            Expr::Pow(b, k) if !k.depend_de(var) => (
                b.as_ref().clone(),
                Expr::puissance(cible, Expr::inverse(k.as_ref().clone())),
            ),
            // b^u, b constant
            Expr::Pow(b, u) if !b.depend_de(var) => (
                u.as_ref().clone(),
                Expr::quotient(Expr::log(cible), Expr::log(b.as_ref().clone())),
            ),

            Expr::Func(Fonction::Exp, u) => (u.as_ref().clone(), Expr::log(cible)),
            Expr::Func(Fonction::Log, u) => (u.as_ref().clone(), Expr::exp(cible)),

            _ => return Err(CalcError::NotInvertible),
        };
        courant = suivant;
        cible = nouvelle_cible;
    }
    Err(CalcError::NotInvertible)
}

/// Le seul enfant qui dépend de var, et les autres.
fn une_seule_dependance(enfants: &[Expr], var: &str) -> Result<(Expr, Vec<Expr>)> {
    let (dependants, autres): (Vec<Expr>, Vec<Expr>) =
        enfants.iter().cloned().partition(|t| t.depend_de(var));
    match <[Expr; 1]>::try_from(dependants) {
        Ok([t]) => Ok((t, autres)),
        Err(_) => Err(CalcError::NotInvertible),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::rpn::parse;

    fn s(txt: &str) -> Expr {
        simplify(&parse(txt).unwrap()).unwrap()
    }

    fn inv(txt: &str) -> Result<Expr> {
        inverse(&parse(txt).unwrap(), "x", "y")
    }

    #[test]
    fn inversions() {
        assert_eq!(inv("2x + 1"), Ok(s("(y - 1)/2")));
        assert_eq!(inv("x^2"), Ok(s("sqrt(y)")));
        assert_eq!(inv("exp(x)"), Ok(s("log(y)")));
        assert_eq!(inv("3 log(x)"), Ok(s("exp(y/3)")));
    }

    #[test]
    fn non_inversibles() {
        assert_eq!(inv("sin(x)"), Err(CalcError::NotInvertible));
        assert_eq!(inv("x + sin(x)"), Err(CalcError::NotInvertible));
        assert_eq!(inv("x y"), Err(CalcError::NotInvertible));
    }

    #[test]
    fn volume_autour_de_x() {
        // cône : π ∫_0^1 x² dx = π/3
        let v = volume_of_revolution(&parse("x").unwrap(), "x", &Expr::zero(), &Expr::un(), Axe::X)
            .unwrap();
        assert_eq!(v.valeur, s("pi/3"));
        assert!(!v.approximative);
    }

    #[test]
    fn volume_autour_de_y() {
        // y = x², x = √y : π ∫_0^1 y dy = π/2
        let v = volume_of_revolution(&parse("x^2").unwrap(), "x", &Expr::zero(), &Expr::un(), Axe::Y)
            .unwrap();
        assert_eq!(v.valeur, s("pi/2"));
    }

    #[test]
    fn volume_non_inversible() {
        assert!(matches!(
            volume_of_revolution(&parse("sin(x)").unwrap(), "x", &Expr::zero(), &Expr::un(), Axe::Y),
            Err(CalcError::NotInvertible)
        ));
    }
}
