// src/noyau/jetons.rs
//
// Tokenisation.
// - nombres décimaux lus en rationnels exacts (0.25 -> 1/4, 1e3 -> 1000), repli f64 sinon
// - opérateurs + - * / ^ (et ** comme ^)
// - parenthèses
// - π / pi, e, oo (infini, points de limite)
// - fonctions sin cos tan exp log (ln) sqrt (√)
// - symboles x, y, n ; un mot fait uniquement de ces lettres est découpé (xy -> x y)
// - multiplication implicite insérée après coup (2x, 2(x+1), (x+1)(x-1), x y…)
//
// Chaque jeton garde sa position (index de caractère, base 0) pour les erreurs.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;

use super::bornes::MAX_EXPOSANT;
use super::erreur::{CalcError, GenreAnalyse, Result};
use super::nombre::{format_flottant, Nombre};

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(Nombre),

    // Fonction (sin, cos, …) ou symbole (x, pi, …) ; rpn.rs décide.
    Ident(String),

    Plus,
    Minus,
    Neg, // moins unaire (posé par to_rpn)
    Star,
    Slash,
    Caret,

    LPar,
    RPar,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Jeton {
    pub tok: Tok,
    pub position: usize,
}

impl Jeton {
    fn new(tok: Tok, position: usize) -> Self {
        Jeton { tok, position }
    }
}

/// Fonctions reconnues (toujours suivies de `(`).
pub fn is_fonction_ident(name: &str) -> bool {
    matches!(
        name,
        "sin" | "cos" | "tan" | "exp" | "log" | "ln" | "sqrt"
    )
}

/// Symboles reconnus (variables et constantes).
pub fn is_symbole_ident(name: &str) -> bool {
    matches!(name, "x" | "y" | "n" | "pi" | "e" | "oo")
}

/// Lettres qu’un mot inconnu peut contenir pour être découpé.
fn is_symbole_lettre(c: char) -> bool {
    matches!(c, 'x' | 'y' | 'n' | 'e')
}

/// Tokenise une chaîne (multiplication implicite comprise).
pub fn tokenize(s: &str) -> Result<Vec<Jeton>> {
    let brut = tokenize_brut(s)?;
    Ok(insere_multiplications(brut))
}

fn tokenize_brut(s: &str) -> Result<Vec<Jeton>> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Parenthèses
        if c == '(' {
            out.push(Jeton::new(Tok::LPar, i));
            i += 1;
            continue;
        }
        if c == ')' {
            out.push(Jeton::new(Tok::RPar, i));
            i += 1;
            continue;
        }

        // Opérateurs
        let op = match c {
            '+' => Some(Tok::Plus),
            '-' | '−' => Some(Tok::Minus),
            '*' if i + 1 < chars.len() && chars[i + 1] == '*' => {
                out.push(Jeton::new(Tok::Caret, i));
                i += 2;
                continue;
            }
            '*' | '×' => Some(Tok::Star),
            '/' => Some(Tok::Slash),
            '^' => Some(Tok::Caret),
            _ => None,
        };
        if let Some(tok) = op {
            out.push(Jeton::new(tok, i));
            i += 1;
            continue;
        }

        if c == 'π' {
            out.push(Jeton::new(Tok::Ident("pi".to_string()), i));
            i += 1;
            continue;
        }
        if c == '√' {
            out.push(Jeton::new(Tok::Ident("sqrt".to_string()), i));
            i += 1;
            continue;
        }
        if c == '∞' {
            out.push(Jeton::new(Tok::Ident("oo".to_string()), i));
            i += 1;
            continue;
        }

        // Identifiants ASCII : [a-zA-Z][a-zA-Z0-9_]*
        if c.is_ascii_alphabetic() {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let w = word.to_lowercase();

            if is_fonction_ident(&w) || is_symbole_ident(&w) {
                out.push(Jeton::new(Tok::Ident(w), start));
            } else if w.chars().all(is_symbole_lettre) {
                // xy -> x y (la multiplication implicite suivra)
                for (k, l) in w.chars().enumerate() {
                    out.push(Jeton::new(Tok::Ident(l.to_string()), start + k));
                }
            } else {
                return Err(CalcError::parse(GenreAnalyse::IdentifiantInconnu, start));
            }
            continue;
        }

        // Nombre décimal : 12, 0.25, .5, 2.5e-3
        if c.is_ascii_digit() || (c == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit())
        {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let mut frac_str = String::new();
            if i < chars.len() && chars[i] == '.' {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    frac_str.push(chars[i]);
                    i += 1;
                }
            }
            let mantisse: String = chars[start..i].iter().collect();

            // exposant seulement si un chiffre suit (2e reste 2·e)
            let mut exposant = String::new();
            if i < chars.len() && matches!(chars[i], 'e' | 'E') {
                let signe = matches!(chars.get(i + 1), Some('+' | '-'));
                let debut = if signe { i + 2 } else { i + 1 };
                if chars.get(debut).is_some_and(|c| c.is_ascii_digit()) {
                    if signe && chars[i + 1] == '-' {
                        exposant.push('-');
                    }
                    i = debut;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        exposant.push(chars[i]);
                        i += 1;
                    }
                }
            }

            let texte: String = chars[start..i].iter().collect();
            let nombre = lit_decimal(&mantisse, &frac_str, &exposant, &texte);
            out.push(Jeton::new(Tok::Num(nombre), start));
            continue;
        }

        return Err(CalcError::parse(GenreAnalyse::JetonInattendu, i));
    }

    Ok(out)
}

/// "12.25" -> 49/4, "2.5e-3" -> 1/400 exacts ; repli f64 si la lecture exacte échoue
/// (ou si l’exposant dépasse MAX_EXPOSANT).
fn lit_decimal(mantisse: &str, frac_str: &str, exposant: &str, texte: &str) -> Nombre {
    let chiffres: String = mantisse.chars().filter(|c| c.is_ascii_digit()).collect();
    let exposant = if exposant.is_empty() {
        Some(0)
    } else {
        exposant
            .parse::<i64>()
            .ok()
            .filter(|k| k.abs() <= MAX_EXPOSANT)
    };
    match (BigInt::parse_bytes(chiffres.as_bytes(), 10), exposant) {
        (Some(m), Some(k)) => {
            let k = k - frac_str.len() as i64;
            let dix = BigInt::from(10u32);
            let r = if k >= 0 {
                BigRational::from_integer(m * dix.pow(k as u32))
            } else {
                BigRational::new(m, dix.pow((-k) as u32))
            };
            Nombre::Rat(r)
        }
        _ => Nombre::Flot(texte.parse::<f64>().unwrap_or(f64::NAN)),
    }
}

fn termine_valeur(t: &Tok) -> bool {
    match t {
        Tok::Num(_) | Tok::RPar => true,
        Tok::Ident(name) => !is_fonction_ident(name),
        _ => false,
    }
}

fn commence_valeur(t: &Tok) -> bool {
    matches!(t, Tok::Num(_) | Tok::Ident(_) | Tok::LPar)
}

/// Insère `*` entre deux jetons juxtaposés qui forment un produit.
/// Nombre suivi de nombre : pas d’insertion (rpn.rs le refusera).
fn insere_multiplications(jetons: Vec<Jeton>) -> Vec<Jeton> {
    let mut out: Vec<Jeton> = Vec::with_capacity(jetons.len() * 2);
    for j in jetons {
        if let Some(prev) = out.last() {
            let deux_nombres = matches!(prev.tok, Tok::Num(_)) && matches!(j.tok, Tok::Num(_));
            if termine_valeur(&prev.tok) && commence_valeur(&j.tok) && !deux_nombres {
                out.push(Jeton::new(Tok::Star, j.position));
            }
        }
        out.push(j);
    }
    out
}

/// Format utilitaire (démarche) : liste de jetons en texte.
pub fn format_tokens(jetons: &[Jeton]) -> String {
    let mut out = Vec::new();
    for j in jetons {
        let s = match &j.tok {
            Tok::Num(Nombre::Rat(r)) => {
                if r.denom().is_one() {
                    format!("{}", r.numer())
                } else {
                    format!("{}/{}", r.numer(), r.denom())
                }
            }
            Tok::Num(Nombre::Flot(v)) => format_flottant(*v),
            Tok::Ident(name) if name == "pi" => "π".to_string(),
            Tok::Ident(name) => name.clone(),

            Tok::Plus => "+".to_string(),
            Tok::Minus => "-".to_string(),
            Tok::Neg => "neg".to_string(),
            Tok::Star => "*".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::Caret => "^".to_string(),

            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
        };
        out.push(s);
    }
    out.join(" ")
}
