// src/noyau/edo.rs
//
// Équations différentielles linéaires homogènes reconnues par motif :
// - ordre 1 : y' + p(x) y = 0          -> y = C1 exp(-∫p)
// - ordre 2 : y'' + p y' + q y = 0     (p, q constants) -> équation caractéristique

use tracing::debug;

use super::erreur::{CalcError, Result};
use super::expr::Expr;
use super::integre::integrate_indefinite;
use super::lecture::evalue_constante;
use super::simplifie::simplify;

/// Fonction inconnue.
pub const INCONNUE: &str = "y";
pub const C1: &str = "C1";
pub const C2: &str = "C2";

#[derive(Clone, Debug, PartialEq)]
pub struct SolutionEdo {
    /// Équation, avec marqueurs Derivee (affichage seulement).
    pub equation: Expr,
    /// Solution générale, en C1 (et C2).
    pub forme_generale: Expr,
}

pub fn ode1(p: &Expr, var: &str) -> Result<SolutionEdo> {
    if p.depend_de(INCONNUE) {
        return Err(CalcError::UnsupportedOde(
            "le coefficient dépend de y (équation non linéaire)".into(),
        ));
    }
    let p = simplify(p)?;
    let Some(primitive) = integrate_indefinite(&p, var) else {
        return Err(CalcError::UnsupportedOde(format!(
            "pas de primitive connue pour {p}"
        )));
    };

    let forme_generale = simplify(&Expr::produit(vec![
        Expr::sym(C1),
        Expr::exp(Expr::neg(primitive)),
    ]))?;
    debug!(solution = %forme_generale, "EDO d’ordre 1");

    Ok(SolutionEdo {
        equation: equation(&[(1, Expr::un()), (0, p)], var),
        forme_generale,
    })
}

pub fn ode2(p: &Expr, q: &Expr, var: &str) -> Result<SolutionEdo> {
    for c in [p, q] {
        if c.depend_de(var) || c.depend_de(INCONNUE) {
            return Err(CalcError::UnsupportedOde(
                "coefficients non constants".into(),
            ));
        }
    }
    let p = simplify(p)?;
    let q = simplify(q)?;

    // r² + p r + q = 0
    let delta = simplify(&Expr::difference(
        Expr::puissance(p.clone(), Expr::entier(2)),
        Expr::produit(vec![Expr::entier(4), q.clone()]),
    ))?;
    let signe = if delta.est_zero() {
        0.0
    } else {
        evalue_constante(&delta).map_err(|_| {
            CalcError::UnsupportedOde(format!("discriminant non numérique : {delta}"))
        })?
    };

    let x = Expr::sym(var);
    let moitie = |e: Expr| Expr::produit(vec![Expr::fraction(1, 2), e]);
    let exp_rx = |r: Expr| Expr::exp(Expr::produit(vec![r, x.clone()]));
    let moins_p = Expr::neg(p.clone());

    let solution = if signe > 0.0 {
        let racine = Expr::racine(delta.clone());
        let r1 = moitie(Expr::somme(vec![moins_p.clone(), racine.clone()]));
        let r2 = moitie(Expr::difference(moins_p, racine));
        Expr::somme(vec![
            Expr::produit(vec![Expr::sym(C1), exp_rx(r1)]),
            Expr::produit(vec![Expr::sym(C2), exp_rx(r2)]),
        ])
    } else if signe == 0.0 {
        Expr::produit(vec![
            Expr::somme(vec![
                Expr::sym(C1),
                Expr::produit(vec![Expr::sym(C2), x.clone()]),
            ]),
            exp_rx(moitie(moins_p)),
        ])
    } else {
        let beta = moitie(Expr::racine(Expr::neg(delta.clone())));
        let bx = Expr::produit(vec![beta, x.clone()]);
        Expr::produit(vec![
            exp_rx(moitie(moins_p)),
            Expr::somme(vec![
                Expr::produit(vec![Expr::sym(C1), Expr::cos(bx.clone())]),
                Expr::produit(vec![Expr::sym(C2), Expr::sin(bx)]),
            ]),
        ])
    };

    let forme_generale = simplify(&solution)?;
    debug!(delta = %delta, solution = %forme_generale, "EDO d’ordre 2");

    Ok(SolutionEdo {
        equation: equation(&[(2, Expr::un()), (1, p), (0, q)], var),
        forme_generale,
    })
}

/// Σ coeff · y⁽ⁿ⁾ (termes nuls omis), non simplifié.
fn equation(termes: &[(u32, Expr)], var: &str) -> Expr {
    let y = Expr::sym(INCONNUE);
    Expr::somme(
        termes
            .iter()
            .filter(|(_, c)| !c.est_zero())
            .map(|(ordre, c)| {
                let yn = if *ordre == 0 {
                    y.clone()
                } else {
                    Expr::derivee(y.clone(), var, *ordre)
                };
                if c.est_un() {
                    yn
                } else {
                    Expr::produit(vec![c.clone(), yn])
                }
            })
            .collect(),
    )
}
