// src/noyau/lecture.rs
//
// Lecture numérique (f64) d’un arbre : évaluation en un point, constantes.
// Sert à Simpson, aux bornes numériques et à l’analyse de signe des limites.

use super::derive::differentiate;
use super::erreur::{CalcError, Result};
use super::expr::{Expr, Fonction, E, INFINI, PI};

/// f(v) en flottant, avec les mêmes erreurs de domaine que le simplificateur.
pub(crate) fn applique_fonction(f: Fonction, v: f64) -> Result<f64> {
    let r = match f {
        Fonction::Sin => v.sin(),
        Fonction::Cos => v.cos(),
        Fonction::Tan => {
            if v.cos().abs() < 1e-15 {
                return Err(CalcError::domaine("tangente non définie"));
            }
            v.tan()
        }
        Fonction::Exp => v.exp(),
        Fonction::Log => {
            if v <= 0.0 {
                return Err(CalcError::domaine("logarithme d’un nombre négatif ou nul"));
            }
            v.ln()
        }
    };
    fini(r)
}

/// Valeur de `e` en `var = x`.
pub fn evalue_en(e: &Expr, var: &str, x: f64) -> Result<f64> {
    evalue(e, &|s: &str| (s == var).then_some(x))
}

/// Valeur d’une expression sans variable libre (bornes « pi/2 », « e^2 »…).
pub fn evalue_constante(e: &Expr) -> Result<f64> {
    evalue(e, &|_: &str| None)
}

fn evalue(e: &Expr, lie: &dyn Fn(&str) -> Option<f64>) -> Result<f64> {
    match e {
        Expr::Nb(n) => fini(n.to_f64()),
        Expr::Sym(s) => {
            if let Some(v) = lie(s) {
                return Ok(v);
            }
            match s.as_str() {
                PI => Ok(std::f64::consts::PI),
                E => Ok(std::f64::consts::E),
                INFINI => Err(CalcError::domaine("l’infini n’a pas de valeur numérique")),
                autre => Err(CalcError::domaine(format!("variable libre « {autre} »"))),
            }
        }
        Expr::Add(v) => {
            let mut acc = 0.0;
            for t in v {
                acc += evalue(t, lie)?;
            }
            fini(acc)
        }
        Expr::Mul(v) => {
            let mut acc = 1.0;
            for t in v {
                acc *= evalue(t, lie)?;
            }
            fini(acc)
        }
        Expr::Pow(b, x) => {
            let b = evalue(b, lie)?;
            let x = evalue(x, lie)?;
            if b == 0.0 && x < 0.0 {
                return Err(CalcError::domaine("division par zéro"));
            }
            if b < 0.0 && x.fract() != 0.0 {
                return Err(CalcError::domaine("puissance non réelle"));
            }
            fini(b.powf(x))
        }
        Expr::Func(f, u) => applique_fonction(*f, evalue(u, lie)?),
        Expr::Derivee(c, var, n) => evalue(&differentiate(c, var, *n)?, lie),
    }
}

fn fini(v: f64) -> Result<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CalcError::domaine("valeur numérique non finie"))
    }
}
