// src/noyau/trig.rs
//
// Trig spéciale (angles “exactement reconnus”) pour sin/cos/tan
// -----------------------------------------------------------
// - Extraction coeff·π via as_coeff_pi()
// - Réduction modulo période via mod_rationnel() (sin/cos: 2 ; tan: 1)
// - Table angles spéciaux sur n ∈ {1,2,3,4,6}
// - tan aux multiples impairs de π/2 : erreur de domaine

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use super::erreur::{CalcError, Result};
use super::expr::{Expr, Fonction};

/// Reconnaît les angles spéciaux lorsque l’argument (déjà simplifié) est un
/// multiple rationnel de π.
///
/// Retour:
/// - Ok(Some(valeur_exacte)) si reconnu (valeur déjà canonique)
/// - Ok(None) si non reconnu
/// - Err(Domain) pour tan(π/2 + kπ)
pub fn trig_special(x: &Expr, f: Fonction) -> Result<Option<Expr>> {
    // 1) extraire coeff·π
    let Some(coeff) = x.as_coeff_pi() else {
        return Ok(None);
    };

    // 2) réduire modulo période
    let coeff_reduit = match f {
        Fonction::Tan => mod_rationnel(&coeff, 1),
        _ => mod_rationnel(&coeff, 2),
    };

    // 3) convertir en k/n "petit"
    let Some((k, n)) = rational_to_small_kn(&coeff_reduit) else {
        return Ok(None);
    };

    // 4) réduction modulo 2π : k mod (2n)
    let a = (k.rem_euclid(2 * n), n);

    let rat = Expr::fraction;
    // c·√r
    let c_racine = |c: Expr, r: i64| {
        let racine = Expr::racine(Expr::entier(r));
        if c.est_un() {
            racine
        } else {
            Expr::Mul(vec![c, racine])
        }
    };

    let zero = || rat(0, 1);
    let one = || rat(1, 1);
    let neg_one = || rat(-1, 1);

    let v = match f {
        Fonction::Sin => match a {
            (0, _) | (1, 1) | (2, 1) => zero(),
            (1, 6) | (5, 6) => rat(1, 2),
            (7, 6) | (11, 6) => rat(-1, 2),
            (1, 4) | (3, 4) => c_racine(rat(1, 2), 2),
            (5, 4) | (7, 4) => c_racine(rat(-1, 2), 2),
            (1, 3) | (2, 3) => c_racine(rat(1, 2), 3),
            (4, 3) | (5, 3) => c_racine(rat(-1, 2), 3),
            (1, 2) => one(),
            (3, 2) => neg_one(),
            _ => return Ok(None),
        },

        Fonction::Cos => match a {
            (0, _) | (2, 1) => one(),
            (1, 1) => neg_one(),
            (1, 6) | (11, 6) => c_racine(rat(1, 2), 3),
            (5, 6) | (7, 6) => c_racine(rat(-1, 2), 3),
            (1, 4) | (7, 4) => c_racine(rat(1, 2), 2),
            (3, 4) | (5, 4) => c_racine(rat(-1, 2), 2),
            (1, 3) | (5, 3) => rat(1, 2),
            (2, 3) | (4, 3) => rat(-1, 2),
            (1, 2) | (3, 2) => zero(),
            _ => return Ok(None),
        },

        Fonction::Tan => match a {
            (0, _) | (1, 1) | (2, 1) => zero(),
            (1, 6) | (7, 6) => c_racine(rat(1, 3), 3),
            (5, 6) | (11, 6) => c_racine(rat(-1, 3), 3),
            (1, 4) | (5, 4) => one(),
            (3, 4) | (7, 4) => neg_one(),
            (1, 3) | (4, 3) => c_racine(one(), 3),
            (2, 3) | (5, 3) => c_racine(neg_one(), 3),
            (1, 2) | (3, 2) => {
                return Err(CalcError::domaine(format!(
                    "tan({}) indéfini",
                    format_angle_kn_pi(a.0, a.1)
                )))
            }
            _ => return Ok(None),
        },

        Fonction::Exp | Fonction::Log => return Ok(None),
    };

    Ok(Some(v))
}

/* ------------------------ Outils ------------------------ */

fn format_angle_kn_pi(k: i64, n: i64) -> String {
    if k == 0 {
        return "0".to_string();
    }
    if n == 1 {
        return match k {
            1 => "π".to_string(),
            _ => format!("{k}π"),
        };
    }
    if k == 1 {
        return format!("π/{n}");
    }
    format!("{k}π/{n}")
}

/// Réduction modulo `periode` sur un coefficient rationnel.
/// Retourne un rationnel dans [0, periode).
///
/// Si coeff = n/d, alors coeff mod periode = (n mod (periode*d))/d.
pub(crate) fn mod_rationnel(coeff: &BigRational, periode: i64) -> BigRational {
    if periode <= 0 || coeff.is_zero() {
        return coeff.clone();
    }

    let d = coeff.denom().clone(); // denom > 0 (num_rational)
    let m = BigInt::from(periode) * &d;

    let mut r = coeff.numer() % &m;
    if r.is_negative() {
        r += &m;
    }
    BigRational::new(r, d)
}

/// Convertit un rationnel en (k,n) i64 réduit.
/// Accepte seulement n ∈ {1,2,3,4,6}.
fn rational_to_small_kn(r: &BigRational) -> Option<(i64, i64)> {
    let denom = r.denom().to_i64()?;
    let numer = r.numer().to_i64()?;

    let g = gcd_i64(numer.abs(), denom.abs());
    let k = numer / g;
    let n = denom / g;

    if [1, 2, 3, 4, 6].contains(&n) {
        Some((k, n))
    } else {
        None
    }
}

fn gcd_i64(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angle(k: i64, n: i64) -> Expr {
        Expr::multiple_de_pi(BigRational::new(k.into(), n.into()))
    }

    #[test]
    fn sin_cos_angles_classiques() {
        assert_eq!(trig_special(&angle(1, 6), Fonction::Sin), Ok(Some(Expr::fraction(1, 2))));
        assert_eq!(trig_special(&angle(1, 3), Fonction::Cos), Ok(Some(Expr::fraction(1, 2))));
        assert_eq!(trig_special(&angle(1, 1), Fonction::Cos), Ok(Some(Expr::entier(-1))));
        assert_eq!(
            trig_special(&angle(1, 4), Fonction::Sin),
            Ok(Some(Expr::Mul(vec![
                Expr::fraction(1, 2),
                Expr::racine(Expr::entier(2))
            ])))
        );
    }

    #[test]
    fn reduction_modulo_periode() {
        // sin(-π/6) = -1/2 ; cos(13π/6) = √3/2
        assert_eq!(trig_special(&angle(-1, 6), Fonction::Sin), Ok(Some(Expr::fraction(-1, 2))));
        assert_eq!(
            trig_special(&angle(13, 6), Fonction::Cos),
            Ok(Some(Expr::Mul(vec![
                Expr::fraction(1, 2),
                Expr::racine(Expr::entier(3))
            ])))
        );
    }

    #[test]
    fn tan_pi_sur_2_domaine() {
        assert!(matches!(
            trig_special(&angle(1, 2), Fonction::Tan),
            Err(CalcError::Domain(_))
        ));
        assert!(matches!(
            trig_special(&angle(-3, 2), Fonction::Tan),
            Err(CalcError::Domain(_))
        ));
        assert_eq!(trig_special(&angle(1, 3), Fonction::Tan), Ok(Some(Expr::racine(Expr::entier(3)))));
    }

    #[test]
    fn angle_non_reconnu() {
        assert_eq!(trig_special(&angle(1, 5), Fonction::Sin), Ok(None));
        assert_eq!(trig_special(&Expr::sym("x"), Fonction::Sin), Ok(None));
    }

    #[test]
    fn modulo_rationnel() {
        let r = mod_rationnel(&BigRational::new((-1).into(), 6.into()), 2);
        assert_eq!(r, BigRational::new(11.into(), 6.into()));
    }
}
