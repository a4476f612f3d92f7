// src/noyau/identites_trig.rs
//
// Identités trigonométriques exactes, appliquées par le simplificateur.
// Chaque règle fait strictement décroître l’arbre (ou le remplace par une forme
// plus simple) : pas de boucle possible dans le point fixe.
//
// Règles incluses :
// B1 Parité
//   sin(-u) -> -sin(u)
//   cos(-u) -> cos(u)
//   tan(-u) -> -tan(u)
// B2 Décalage par un multiple de π/2 (u + kπ/2, k entier)
//   sin : k mod 4 = 1 -> cos(u), 2 -> -sin(u), 3 -> -cos(u)
//   cos : k mod 4 = 1 -> -sin(u), 2 -> -cos(u), 3 -> sin(u)
//   tan : k pair -> tan(u) (k impair : on laisse tel quel)
// B3 Pythagoricienne
//   c·sin(u)^2 + c·cos(u)^2 -> c
// BONUS sin(u)·cos(u)^-1 -> tan(u)
//
// Les résultats sont “bruts” : l’appelant resimplifie.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use super::canon::oppose_si_negatif;
use super::expr::{Expr, Fonction, PI};
use super::nombre::Nombre;

/* ------------------------ B1 parité ------------------------ */

pub fn parite(f: Fonction, arg: &Expr) -> Option<Expr> {
    let u = oppose_arg(arg)?;
    Some(match f {
        Fonction::Sin => Expr::neg(Expr::sin(u)),
        Fonction::Cos => Expr::cos(u),
        Fonction::Tan => Expr::neg(Expr::tan(u)),
        Fonction::Exp | Fonction::Log => return None,
    })
}

/// -arg si arg est “négatif” : terme négatif, ou somme dont tous les termes le sont.
fn oppose_arg(arg: &Expr) -> Option<Expr> {
    match arg {
        Expr::Add(termes) => {
            let opposes = termes
                .iter()
                .map(oppose_si_negatif)
                .collect::<Option<Vec<_>>>()?;
            Some(Expr::somme(opposes))
        }
        autre => oppose_si_negatif(autre),
    }
}

/* ------------------------ B2 décalages ------------------------ */

pub fn decalage(f: Fonction, arg: &Expr) -> Option<Expr> {
    let Expr::Add(termes) = arg else {
        return None;
    };

    // repère le terme c·π
    let (i, c) = termes
        .iter()
        .enumerate()
        .find_map(|(i, t)| coeff_pi_non_nul(t).map(|c| (i, c)))?;

    // k = 2c doit être entier
    let k2 = c * BigRational::from_integer(BigInt::from(2));
    if !k2.is_integer() {
        return None;
    }
    let quatre = BigInt::from(4);
    let mut k = k2.numer() % &quatre;
    if k.is_negative() {
        k += &quatre;
    }
    let k = k.to_i64()?;

    let mut reste = termes.clone();
    reste.remove(i);
    let u = Expr::somme(reste);

    Some(match (f, k) {
        (Fonction::Sin, 0) => Expr::sin(u),
        (Fonction::Sin, 1) => Expr::cos(u),
        (Fonction::Sin, 2) => Expr::neg(Expr::sin(u)),
        (Fonction::Sin, 3) => Expr::neg(Expr::cos(u)),

        (Fonction::Cos, 0) => Expr::cos(u),
        (Fonction::Cos, 1) => Expr::neg(Expr::sin(u)),
        (Fonction::Cos, 2) => Expr::neg(Expr::cos(u)),
        (Fonction::Cos, 3) => Expr::sin(u),

        (Fonction::Tan, 0 | 2) => Expr::tan(u),

        _ => return None,
    })
}

fn coeff_pi_non_nul(t: &Expr) -> Option<BigRational> {
    match t {
        Expr::Sym(s) if s == PI => Some(BigRational::from_integer(BigInt::from(1))),
        Expr::Mul(_) => t.as_coeff_pi().filter(|c| !c.is_zero()),
        _ => None,
    }
}

/* ------------------------ B3 Pythagore ------------------------ */

/// c·sin(u)^2 + c·cos(u)^2 -> c (sur une liste de termes déjà regroupés).
/// Retourne la somme des constantes dégagées.
pub fn pythagore(termes: &mut Vec<Expr>) -> Nombre {
    let mut degage = Nombre::zero();
    let mut i = 0;
    while i < termes.len() {
        if let Some((c, u)) = carre_trig(&termes[i], Fonction::Sin) {
            let j = termes.iter().position(|t| {
                carre_trig(t, Fonction::Cos).is_some_and(|(c2, u2)| c2 == c && u2 == u)
            });
            if let Some(j) = j {
                degage = degage.add(&c);
                let (a, b) = (i.max(j), i.min(j));
                termes.remove(a);
                termes.remove(b);
                i = 0;
                continue;
            }
        }
        i += 1;
    }
    degage
}

/// c·f(u)^2 -> (c, u)
fn carre_trig(t: &Expr, f: Fonction) -> Option<(Nombre, Expr)> {
    let (c, reste) = match t {
        Expr::Mul(v) if v.len() == 2 => match &v[0] {
            Expr::Nb(c) => (c.clone(), &v[1]),
            _ => return None,
        },
        autre => (Nombre::un(), autre),
    };
    match reste {
        Expr::Pow(b, x) if x.as_entier() == Some(2) => match b.as_ref() {
            Expr::Func(g, u) if *g == f => Some((c, u.as_ref().clone())),
            _ => None,
        },
        _ => None,
    }
}

/* ------------------------ BONUS sin/cos -> tan ------------------------ */

/// Dans une liste de facteurs : sin(u) et cos(u)^-1 -> tan(u).
/// Retourne true si une réécriture a eu lieu.
pub fn sin_sur_cos(facteurs: &mut Vec<Expr>) -> bool {
    let mut change = false;
    let mut i = 0;
    while i < facteurs.len() {
        if let Expr::Func(Fonction::Sin, u) = &facteurs[i] {
            let cible = Expr::puissance(Expr::cos(u.as_ref().clone()), Expr::entier(-1));
            if let Some(j) = facteurs.iter().position(|t| *t == cible) {
                let tan = Expr::tan(u.as_ref().clone());
                facteurs[i] = tan;
                facteurs.remove(j);
                change = true;
                i = 0;
                continue;
            }
        }
        i += 1;
    }
    change
}
