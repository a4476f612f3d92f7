// src/noyau/nombre.rs
//
// Nombre hybride.
// - Rat : rationnel exact (BigRational), le cas normal
// - Flot : f64, seulement quand un littéral ne se lit pas en rationnel
//   ou quand un flottant contamine une opération
//
// Règle : Rat ⊕ Rat reste exact ; dès qu’un Flot participe, le résultat est Flot.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use std::fmt;

use super::bornes::MAX_EXPOSANT;
use super::erreur::{CalcError, Result};

#[derive(Clone, Debug, PartialEq)]
pub enum Nombre {
    Rat(BigRational),
    Flot(f64),
}

impl Nombre {
    pub fn entier(n: i64) -> Self {
        Nombre::Rat(BigRational::from_integer(BigInt::from(n)))
    }

    /// n/d (d ≠ 0, réservé aux constantes internes).
    pub fn fraction(n: i64, d: i64) -> Self {
        Nombre::Rat(BigRational::new(BigInt::from(n), BigInt::from(d)))
    }

    pub fn zero() -> Self {
        Nombre::Rat(BigRational::zero())
    }

    pub fn un() -> Self {
        Nombre::Rat(BigRational::one())
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Nombre::Rat(r) => r.is_zero(),
            Nombre::Flot(f) => *f == 0.0,
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Nombre::Rat(r) => r.is_one(),
            Nombre::Flot(f) => *f == 1.0,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Nombre::Rat(r) => r.is_negative(),
            Nombre::Flot(f) => *f < 0.0,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Nombre::Rat(_))
    }

    /// Entier exact (Rat de dénominateur 1) tenant dans un i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Nombre::Rat(r) if r.is_integer() => r.numer().to_i64(),
            _ => None,
        }
    }

    pub fn as_rat(&self) -> Option<&BigRational> {
        match self {
            Nombre::Rat(r) => Some(r),
            Nombre::Flot(_) => None,
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Nombre::Rat(r) => r.to_f64().unwrap_or(f64::NAN),
            Nombre::Flot(f) => *f,
        }
    }

    pub fn add(&self, o: &Nombre) -> Nombre {
        match (self, o) {
            (Nombre::Rat(a), Nombre::Rat(b)) => Nombre::Rat(a + b),
            _ => Nombre::Flot(self.to_f64() + o.to_f64()),
        }
    }

    pub fn mul(&self, o: &Nombre) -> Nombre {
        match (self, o) {
            (Nombre::Rat(a), Nombre::Rat(b)) => Nombre::Rat(a * b),
            _ => Nombre::Flot(self.to_f64() * o.to_f64()),
        }
    }

    pub fn neg(&self) -> Nombre {
        match self {
            Nombre::Rat(r) => Nombre::Rat(-r.clone()),
            Nombre::Flot(f) => Nombre::Flot(-f),
        }
    }

    pub fn abs(&self) -> Nombre {
        if self.is_negative() {
            self.neg()
        } else {
            self.clone()
        }
    }

    pub fn inverse(&self) -> Result<Nombre> {
        if self.is_zero() {
            return Err(CalcError::domaine("division par zéro"));
        }
        Ok(match self {
            Nombre::Rat(r) => Nombre::Rat(r.recip()),
            Nombre::Flot(f) => Nombre::Flot(1.0 / f),
        })
    }

    /// Puissance numérique.
    /// - Ok(Some(v)) : valeur calculée (exacte si possible)
    /// - Ok(None) : pas de valeur exacte, la puissance reste symbolique (ex: 2^(1/2))
    /// - Err : 0^(négatif), puissance non réelle d’un flottant
    pub fn pow(&self, exposant: &Nombre) -> Result<Option<Nombre>> {
        match (self, exposant) {
            (Nombre::Rat(b), Nombre::Rat(x)) => puissance_exacte(b, x),
            _ => {
                let (b, x) = (self.to_f64(), exposant.to_f64());
                if b == 0.0 && x < 0.0 {
                    return Err(CalcError::domaine("division par zéro"));
                }
                let v = b.powf(x);
                if !v.is_finite() {
                    return Err(CalcError::domaine("puissance non réelle ou non finie"));
                }
                Ok(Some(Nombre::Flot(v)))
            }
        }
    }
}

fn puissance_exacte(b: &BigRational, x: &BigRational) -> Result<Option<Nombre>> {
    if b.is_zero() {
        if x.is_negative() {
            return Err(CalcError::domaine("division par zéro"));
        }
        return Ok(Some(if x.is_zero() {
            Nombre::un()
        } else {
            Nombre::zero()
        }));
    }

    if x.is_integer() {
        return Ok(x
            .numer()
            .to_i64()
            .filter(|k| k.abs() <= MAX_EXPOSANT)
            .map(|k| Nombre::Rat(rational_pow_int(b.clone(), k))));
    }

    // p/q : racine q-ième exacte seulement (base ≥ 0)
    if b.is_negative() {
        return Ok(None);
    }
    let (p, q) = match (x.numer().to_i64(), x.denom().to_u32()) {
        (Some(p), Some(q)) if p.abs() <= MAX_EXPOSANT => (p, q),
        _ => return Ok(None),
    };
    Ok(racine_exacte(b, q).map(|r| Nombre::Rat(rational_pow_int(r, p))))
}

pub(crate) fn rational_pow_int(base: BigRational, exp: i64) -> BigRational {
    if exp == 0 {
        return BigRational::one();
    }
    if exp < 0 {
        let pos = rational_pow_int(base, -exp);
        return pos.recip();
    }

    let mut e = exp as u64;
    let mut acc = BigRational::one();
    let mut b = base;

    while e > 0 {
        if (e & 1) == 1 {
            acc *= b.clone();
        }
        e >>= 1;
        if e > 0 {
            b *= b.clone();
        }
    }
    acc
}

/// Racine q-ième exacte d’un rationnel positif (numérateur et dénominateur parfaits).
pub(crate) fn racine_exacte(r: &BigRational, q: u32) -> Option<BigRational> {
    if r.is_negative() || q == 0 {
        return None;
    }
    let sn = int_racine_exacte(r.numer(), q)?;
    let sd = int_racine_exacte(r.denom(), q)?;
    Some(BigRational::new(sn, sd))
}

fn int_racine_exacte(x: &BigInt, q: u32) -> Option<BigInt> {
    if x.is_negative() {
        return None;
    }
    let s = x.nth_root(q);
    if s.pow(q) == *x {
        Some(s)
    } else {
        None
    }
}

/// n = s² · reste, avec reste sans facteur carré (essai par division).
pub(crate) fn extrait_carre_parfait(n: &BigInt) -> (BigInt, BigInt) {
    if n.is_zero() {
        return (BigInt::zero(), BigInt::zero());
    }
    if n.is_one() {
        return (BigInt::one(), BigInt::one());
    }

    let mut reste = n.clone();
    let mut s = BigInt::one();

    let mut p = BigInt::from(2);
    while &p * &p <= reste {
        let p2 = &p * &p;

        while (&reste % &p2).is_zero() {
            reste /= &p2;
            s *= &p;
        }

        if p == BigInt::from(2) {
            p = BigInt::from(3);
        } else {
            p += 2;
        }
    }

    (s, reste)
}

/// Flottant lisible : 12 décimales au plus, zéros de queue retirés.
pub fn format_flottant(v: f64) -> String {
    let s = format!("{v:.12}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

impl fmt::Display for Nombre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nombre::Rat(r) => {
                if r.denom().is_one() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
            Nombre::Flot(v) => f.write_str(&format_flottant(*v)),
        }
    }
}
