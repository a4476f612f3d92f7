//! Tests scientifiques (campagne) : propriétés mathématiques + garde-fous.
//!
//! But : vérifier les invariants du moteur sans faire chauffer la machine.
//! - budget temps global par test
//! - tailles bornées (degré, ordre, profondeur)
//! - idempotence du simplificateur par propriétés (proptest)

use std::time::{Duration, Instant};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;
use proptest::prelude::*;

use super::derive::differentiate;
use super::edo::{ode1, C1};
use super::erreur::CalcError;
use super::expr::Expr;
use super::format::render;
use super::integre::integrate_indefinite;
use super::limite::{limit, Direction};
use super::rpn::parse;
use super::serie::taylor;
use super::simplifie::simplify;
use super::simpson::simpson;

fn s(txt: &str) -> Expr {
    simplify(&parse(txt).unwrap_or_else(|e| panic!("expr={txt:?} err={e}")))
        .unwrap_or_else(|e| panic!("expr={txt:?} err={e}"))
}

fn x() -> Expr {
    Expr::sym("x")
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Simplificateur : point fixe ------------------------ */

fn feuille() -> impl Strategy<Value = Expr> {
    prop_oneof![
        (-6i64..7).prop_map(Expr::entier),
        (-6i64..7, 1i64..5).prop_map(|(n, d)| Expr::fraction(n, d)),
        Just(Expr::sym("x")),
        Just(Expr::pi()),
    ]
}

fn arbre() -> impl Strategy<Value = Expr> {
    feuille().prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..4).prop_map(Expr::somme),
            prop::collection::vec(inner.clone(), 2..4).prop_map(Expr::produit),
            (inner.clone(), -2i64..4).prop_map(|(b, k)| Expr::puissance(b, Expr::entier(k))),
            inner.clone().prop_map(Expr::sin),
            inner.clone().prop_map(Expr::cos),
            inner.clone().prop_map(Expr::exp),
            inner.prop_map(Expr::log),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sci_simplify_idempotent(e in arbre()) {
        // erreurs de domaine (log(0), 0^-1…) : rien à vérifier
        if let Ok(une_fois) = simplify(&e) {
            prop_assert_eq!(simplify(&une_fois), Ok(une_fois.clone()));
        }
    }
}

/* ------------------------ Dérivation des polynômes ------------------------ */

#[test]
fn sci_polynome_derive_degre_plus_un_fois() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    // coefficients déterministes, dominant non nul
    let mut graine: i64 = 7;
    for d in 1..=6u32 {
        let mut termes = Vec::new();
        let mut dominant = 0;
        for i in 0..=d {
            graine = (graine * 31 + 11) % 17;
            let c = if i == d { graine % 5 + 1 } else { graine - 8 };
            if i == d {
                dominant = c;
            }
            termes.push(Expr::produit(vec![
                Expr::entier(c),
                Expr::puissance(x(), Expr::entier(i64::from(i))),
            ]));
        }
        let p = Expr::somme(termes);

        assert_eq!(differentiate(&p, "x", d + 1), Ok(Expr::zero()), "degré {d}");

        let factorielle: i64 = (1..=i64::from(d)).product();
        assert_eq!(
            differentiate(&p, "x", d),
            Ok(Expr::entier(dominant * factorielle)),
            "degré {d}"
        );
        budget(t0, max);
    }
}

#[test]
fn sci_ordre_de_derivation_borne() {
    assert_eq!(differentiate(&Expr::sin(x()), "x", 64), Ok(Expr::sin(x())));
    assert!(matches!(
        differentiate(&Expr::sin(x()), "x", 65),
        Err(CalcError::InvalidArgument(_))
    ));
}

/* ------------------------ Intégration : aller-retour ------------------------ */

#[test]
fn sci_derivee_de_la_primitive() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);

    for f in [
        "x^3",
        "3x^2 - 4x + 7",
        "exp(2x)",
        "sin(x)",
        "cos(x)",
        "1/x",
        "log(x)",
        "2^x",
        "(2x + 1)^4",
    ] {
        let primitive = integrate_indefinite(&parse(f).unwrap(), "x")
            .unwrap_or_else(|| panic!("pas de primitive pour {f:?}"));
        let retour = differentiate(&primitive, "x", 1).unwrap();
        assert_eq!(simplify(&retour).unwrap(), s(f), "f={f:?} F={primitive}");
        budget(t0, max);
    }
}

/* ------------------------ Taylor ------------------------ */

#[test]
fn sci_taylor_exponentielle_coefficients() {
    let n = 8i64;
    let mut factorielle = BigInt::one();
    let mut termes = Vec::new();
    for i in 0..=n {
        if i > 0 {
            factorielle *= i;
        }
        termes.push(Expr::produit(vec![
            Expr::rationnel(BigRational::new(BigInt::one(), factorielle.clone())),
            Expr::puissance(x(), Expr::entier(i)),
        ]));
    }
    let attendu = simplify(&Expr::somme(termes)).unwrap();
    assert_eq!(taylor(&Expr::exp(x()), "x", &Expr::zero(), n), Ok(attendu));
}

/* ------------------------ Simpson, limites, EDO, rendu ------------------------ */

#[test]
fn sci_simpson_parabole() {
    let v = simpson(&s("x^2"), "x", 0.0, 2.0, 2).unwrap();
    assert!((v - 8.0 / 3.0).abs() < 1e-9, "v={v}");
    assert!(matches!(
        simpson(&s("x^2"), "x", 0.0, 2.0, 3),
        Err(CalcError::InvalidArgument(_))
    ));
}

#[test]
fn sci_limite_sinus_cardinal() {
    assert_eq!(
        limit(&s("sin(x)/x"), "x", &Expr::zero(), Direction::DeuxCotes),
        Ok(Expr::un())
    );
}

#[test]
fn sci_edo1_coefficients_constants() {
    assert_eq!(ode1(&Expr::zero(), "x").unwrap().forme_generale, Expr::sym(C1));
    for k in 1..=5 {
        let attendu = simplify(&Expr::produit(vec![
            Expr::sym(C1),
            Expr::exp(Expr::produit(vec![Expr::entier(-k), x()])),
        ]))
        .unwrap();
        assert_eq!(ode1(&Expr::entier(k), "x").unwrap().forme_generale, attendu, "k={k}");
    }
}

#[test]
fn sci_rendu_lineaire() {
    assert_eq!(render(&parse("2x+3").unwrap()), "2x + 3");
}

/* ------------------------ Garde-fous ------------------------ */

#[test]
fn sci_profondeur_excessive_refusee() {
    let mut e = x();
    for _ in 0..300 {
        e = Expr::sin(e);
    }
    assert!(matches!(simplify(&e), Err(CalcError::UnsupportedOperation(_))));
}

#[test]
fn sci_stress_somme_longue() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    // 400 x + 400/2
    let expr = vec!["x + 1/2"; 400].join(" + ");
    budget(t0, max);
    assert_eq!(s(&expr), s("400x + 200"));
    budget(t0, max);
}
