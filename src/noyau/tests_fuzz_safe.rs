//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler lecture + simplification + dérivation sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée, exposants bornés (pas de tour de puissances)
//! - budget temps global
//! - toute erreur doit être typée (CalcError), jamais un panic
//! - invariant clé : simplify est un point fixe

use std::time::{Duration, Instant};

use super::derive::differentiate;
use super::erreur::CalcError;
use super::format::render;
use super::rpn::parse;
use super::simplifie::simplify;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn gen_nombre(rng: &mut Rng) -> String {
    let a = rng.pick(8);
    if rng.coin() {
        format!("{a}/{}", rng.pick(5) + 1)
    } else {
        format!("{a}")
    }
}

fn gen_atom(rng: &mut Rng) -> String {
    match rng.pick(6) {
        0 | 1 => "x".to_string(),
        2 => gen_nombre(rng),
        3 => "pi".to_string(),
        4 => "e".to_string(),
        _ => format!("{}x", rng.pick(5) + 1),
    }
}

fn gen_exposant(rng: &mut Rng) -> &'static str {
    match rng.pick(5) {
        0 => "2",
        1 => "3",
        2 => "-1",
        3 => "(1/2)",
        _ => "x",
    }
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }

    match rng.pick(11) {
        0 => gen_atom(rng),
        1 => format!("({}+{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        2 => format!("({}-{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        3 => format!("({}*{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        4 => format!("({}/{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        5 => format!("({})^{}", gen_expr(rng, depth - 1), gen_exposant(rng)),
        6 => format!("sin({})", gen_expr(rng, depth - 1)),
        7 => format!("cos({})", gen_expr(rng, depth - 1)),
        8 => format!("tan({})", gen_expr(rng, depth - 1)),
        9 => format!("exp({})", gen_expr(rng, depth - 1)),
        _ => format!("log({})", gen_expr(rng, depth - 1)),
    }
}

/// Texte quelconque sur un alphabet proche de la grammaire.
fn gen_bruit(rng: &mut Rng) -> String {
    const ALPHABET: &[u8] = b"x+-*/^()0123456789 .sincoexplgtaqrpy";
    let n = rng.pick(24) as usize;
    (0..n)
        .map(|_| ALPHABET[rng.pick(ALPHABET.len() as u32) as usize] as char)
        .collect()
}

/// parse -> simplify -> (point fixe, rendu, dérivée). Retourne le rendu ou l’erreur.
fn passe_complete(expr: &str) -> Result<String, CalcError> {
    let e = parse(expr)?;
    let une_fois = simplify(&e)?;
    assert_eq!(
        simplify(&une_fois),
        Ok(une_fois.clone()),
        "point fixe violé: expr={expr:?}"
    );
    let rendu = render(&une_fois);
    assert!(!rendu.is_empty(), "rendu vide: expr={expr:?}");

    // la dérivée peut échouer (domaine), jamais paniquer
    let _ = differentiate(&une_fois, "x", 1);
    Ok(rendu)
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_point_fixe_et_erreurs_typees() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);

    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..150 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 4);
        match passe_complete(&expr) {
            Ok(_) => seen_ok += 1,
            Err(e) => {
                // une expression bien formée n’échoue jamais à la lecture
                assert!(
                    !matches!(e, CalcError::Parse { .. }),
                    "erreur de lecture inattendue: expr={expr:?} err={e}"
                );
                seen_err += 1;
            }
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 10, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_determinisme() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);

    let tirage = |seed: u64| -> Vec<Result<String, CalcError>> {
        let mut rng = Rng::new(seed);
        (0..40)
            .map(|_| passe_complete(&gen_expr(&mut rng, 3)))
            .collect()
    };

    let a = tirage(0xBADC0DE_u64);
    budget(t0, max);
    let b = tirage(0xBADC0DE_u64);
    budget(t0, max);
    assert_eq!(a, b);
}

#[test]
fn fuzz_safe_bruit_sans_panic() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    let mut rng = Rng::new(0x5EED_u64);
    let mut rejets = 0usize;

    for _ in 0..400 {
        budget(t0, max);
        let texte = gen_bruit(&mut rng);
        if passe_complete(&texte).is_err() {
            rejets += 1;
        }
    }

    // du bruit : la plupart des chaînes sont rejetées
    assert!(rejets > 100, "trop peu de rejets: {rejets}");
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    // ((x+x)+(x+x))+… : 512 feuilles, profondeur 10
    let mut items: Vec<String> = vec!["x".to_string(); 512];
    while items.len() > 1 {
        items = items
            .chunks(2)
            .map(|c| match c {
                [a, b] => format!("({a}+{b})"),
                [a] => a.clone(),
                _ => String::new(),
            })
            .collect();
    }
    let expr = items.pop().unwrap_or_default();
    budget(t0, max);

    assert_eq!(passe_complete(&expr), Ok("512x".to_string()));
}
