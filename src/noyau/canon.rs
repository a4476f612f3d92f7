// src/noyau/canon.rs
//
// Ordre canonique (total, déterministe) des enfants de Add / Mul :
// - nombres d’abord
// - puis symboles (ordre lexicographique)
// - puis termes composés, par rang puis par clé textuelle
//
// Deux arbres égaux ont la même clé ; deux arbres différents ont des clés différentes.

use std::cmp::Ordering;

use super::expr::Expr;
use super::nombre::Nombre;

fn rang(e: &Expr) -> u8 {
    match e {
        Expr::Nb(_) => 0,
        Expr::Sym(_) => 1,
        Expr::Pow(_, _) => 2,
        Expr::Mul(_) => 3,
        Expr::Add(_) => 4,
        Expr::Func(_, _) => 5,
        Expr::Derivee(_, _, _) => 6,
    }
}

pub(crate) fn key_string(e: &Expr) -> String {
    match e {
        Expr::Nb(Nombre::Rat(r)) => {
            let n = r.numer().to_string();
            let d = r.denom().to_string();
            format!("R{n}/{d}")
        }
        Expr::Nb(Nombre::Flot(v)) => format!("F{v:e}"),
        Expr::Sym(s) => format!("S({s})"),
        Expr::Add(v) => format!("ADD({})", cles(v)),
        Expr::Mul(v) => format!("MUL({})", cles(v)),
        Expr::Pow(b, x) => format!("POW({},{})", key_string(b), key_string(x)),
        Expr::Func(f, u) => format!("{}({})", f.nom().to_uppercase(), key_string(u)),
        Expr::Derivee(c, v, n) => format!("D({},{v},{n})", key_string(c)),
    }
}

fn cles(v: &[Expr]) -> String {
    v.iter().map(key_string).collect::<Vec<_>>().join(",")
}

pub fn cmp_expr(a: &Expr, b: &Expr) -> Ordering {
    let ra = rang(a);
    let rb = rang(b);
    ra.cmp(&rb).then_with(|| key_string(a).cmp(&key_string(b)))
}

/// Trie une liste d’enfants dans l’ordre canonique.
pub fn trie(v: &mut [Expr]) {
    v.sort_by(cmp_expr);
}

/// Si le terme est syntaxiquement négatif (nombre < 0 ou coefficient < 0),
/// retourne son opposé, sous forme canonique.
pub(crate) fn oppose_si_negatif(e: &Expr) -> Option<Expr> {
    match e {
        Expr::Nb(n) if n.is_negative() => Some(Expr::Nb(n.neg())),
        Expr::Mul(v) => match v.first() {
            Some(Expr::Nb(c)) if c.is_negative() => {
                let c = c.neg();
                let mut reste: Vec<Expr> = v[1..].to_vec();
                if !c.is_one() {
                    reste.insert(0, Expr::Nb(c));
                }
                Some(if reste.len() == 1 {
                    reste.remove(0)
                } else {
                    Expr::Mul(reste)
                })
            }
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nombres_puis_symboles_puis_composes() {
        let x = Expr::sym("x");
        let mut v = vec![
            Expr::sin(x.clone()),
            Expr::puissance(x.clone(), Expr::entier(2)),
            x.clone(),
            Expr::entier(3),
            Expr::pi(),
        ];
        trie(&mut v);
        assert_eq!(v[0], Expr::entier(3));
        assert_eq!(v[1], Expr::pi());
        assert_eq!(v[2], x.clone());
        assert_eq!(v[3], Expr::puissance(x.clone(), Expr::entier(2)));
        assert_eq!(v[4], Expr::sin(x));
    }

    #[test]
    fn signe_extrait() {
        let x = Expr::sym("x");
        assert_eq!(
            oppose_si_negatif(&Expr::Mul(vec![Expr::entier(-1), x.clone()])),
            Some(x.clone())
        );
        assert_eq!(
            oppose_si_negatif(&Expr::Mul(vec![Expr::entier(-2), x.clone()])),
            Some(Expr::Mul(vec![Expr::entier(2), x.clone()]))
        );
        assert_eq!(oppose_si_negatif(&Expr::entier(-3)), Some(Expr::entier(3)));
        assert_eq!(oppose_si_negatif(&x), None);
    }

    #[test]
    fn ordre_total_deterministe() {
        let a = Expr::cos(Expr::sym("x"));
        let b = Expr::sin(Expr::sym("x"));
        assert_eq!(cmp_expr(&a, &b), Ordering::Less);
        assert_eq!(cmp_expr(&b, &a), Ordering::Greater);
        assert_eq!(cmp_expr(&a, &a), Ordering::Equal);
    }
}
