// src/noyau/expr.rs
//
// Arbre d’expression (ET).
// - Nb  : nombre (rationnel exact ou flottant)
// - Sym : symbole (x, y, n, pi, e ; internes : oo, C1, C2)
// - Add / Mul : n-aires
// - Pow / Func / Derivee : enfants partagés via Arc (Send + Sync)
//
// Formes dérivées :
//   a - b  = Add[a, Mul[-1, b]]
//   a / b  = Mul[a, Pow(b, -1)]
//   √u     = Pow(u, 1/2)
//
// Les constructeurs (somme, produit, puissance…) ne simplifient pas : ils aplatissent
// et écrasent seulement les listes de taille 0 ou 1. La forme canonique est l’affaire
// de simplifie.rs.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use std::fmt;
use std::sync::Arc;

use super::bornes::{MAX_NOEUDS, MAX_PROFONDEUR};
use super::nombre::Nombre;

pub const PI: &str = "pi";
pub const E: &str = "e";
pub const INFINI: &str = "oo";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fonction {
    Sin,
    Cos,
    Tan,
    Exp,
    Log,
}

impl Fonction {
    pub fn nom(self) -> &'static str {
        match self {
            Fonction::Sin => "sin",
            Fonction::Cos => "cos",
            Fonction::Tan => "tan",
            Fonction::Exp => "exp",
            Fonction::Log => "log",
        }
    }

    pub fn depuis_nom(nom: &str) -> Option<Fonction> {
        match nom {
            "sin" => Some(Fonction::Sin),
            "cos" => Some(Fonction::Cos),
            "tan" => Some(Fonction::Tan),
            "exp" => Some(Fonction::Exp),
            "log" | "ln" => Some(Fonction::Log),
            _ => None,
        }
    }

    pub fn est_trig(self) -> bool {
        matches!(self, Fonction::Sin | Fonction::Cos | Fonction::Tan)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Nb(Nombre),
    Sym(String),
    Add(Vec<Expr>),
    Mul(Vec<Expr>),
    Pow(Arc<Expr>, Arc<Expr>),
    Func(Fonction, Arc<Expr>),
    Derivee(Arc<Expr>, String, u32),
}

impl Expr {
    /* ------------------------ Feuilles ------------------------ */

    pub fn nb(n: Nombre) -> Expr {
        Expr::Nb(n)
    }

    pub fn entier(n: i64) -> Expr {
        Expr::Nb(Nombre::entier(n))
    }

    pub fn fraction(n: i64, d: i64) -> Expr {
        Expr::Nb(Nombre::fraction(n, d))
    }

    pub fn rationnel(r: BigRational) -> Expr {
        Expr::Nb(Nombre::Rat(r))
    }

    pub fn flottant(v: f64) -> Expr {
        Expr::Nb(Nombre::Flot(v))
    }

    pub fn zero() -> Expr {
        Expr::entier(0)
    }

    pub fn un() -> Expr {
        Expr::entier(1)
    }

    pub fn sym(nom: &str) -> Expr {
        Expr::Sym(nom.to_string())
    }

    pub fn pi() -> Expr {
        Expr::sym(PI)
    }

    pub fn e() -> Expr {
        Expr::sym(E)
    }

    pub fn infini() -> Expr {
        Expr::sym(INFINI)
    }

    /* ------------------------ Constructeurs ------------------------ */

    pub fn somme(termes: Vec<Expr>) -> Expr {
        let mut plats = Vec::with_capacity(termes.len());
        for t in termes {
            match t {
                Expr::Add(v) => plats.extend(v),
                autre => plats.push(autre),
            }
        }
        match plats.len() {
            0 => Expr::zero(),
            1 => plats.remove(0),
            _ => Expr::Add(plats),
        }
    }

    pub fn produit(facteurs: Vec<Expr>) -> Expr {
        let mut plats = Vec::with_capacity(facteurs.len());
        for f in facteurs {
            match f {
                Expr::Mul(v) => plats.extend(v),
                autre => plats.push(autre),
            }
        }
        match plats.len() {
            0 => Expr::un(),
            1 => plats.remove(0),
            _ => Expr::Mul(plats),
        }
    }

    pub fn puissance(base: Expr, exposant: Expr) -> Expr {
        if exposant.est_un() {
            return base;
        }
        Expr::Pow(Arc::new(base), Arc::new(exposant))
    }

    pub fn func(f: Fonction, arg: Expr) -> Expr {
        Expr::Func(f, Arc::new(arg))
    }

    pub fn sin(arg: Expr) -> Expr {
        Expr::func(Fonction::Sin, arg)
    }

    pub fn cos(arg: Expr) -> Expr {
        Expr::func(Fonction::Cos, arg)
    }

    pub fn tan(arg: Expr) -> Expr {
        Expr::func(Fonction::Tan, arg)
    }

    pub fn exp(arg: Expr) -> Expr {
        Expr::func(Fonction::Exp, arg)
    }

    pub fn log(arg: Expr) -> Expr {
        Expr::func(Fonction::Log, arg)
    }

    pub fn neg(e: Expr) -> Expr {
        match e {
            Expr::Nb(n) => Expr::Nb(n.neg()),
            autre => Expr::produit(vec![Expr::entier(-1), autre]),
        }
    }

    pub fn difference(a: Expr, b: Expr) -> Expr {
        Expr::somme(vec![a, Expr::neg(b)])
    }

    pub fn inverse(a: Expr) -> Expr {
        Expr::puissance(a, Expr::entier(-1))
    }

    pub fn quotient(a: Expr, b: Expr) -> Expr {
        Expr::produit(vec![a, Expr::inverse(b)])
    }

    pub fn racine(a: Expr) -> Expr {
        Expr::puissance(a, Expr::fraction(1, 2))
    }

    pub fn derivee(cible: Expr, var: &str, ordre: u32) -> Expr {
        Expr::Derivee(Arc::new(cible), var.to_string(), ordre)
    }

    /* ------------------------ Prédicats ------------------------ */

    pub fn as_nombre(&self) -> Option<&Nombre> {
        match self {
            Expr::Nb(n) => Some(n),
            _ => None,
        }
    }

    pub fn est_zero(&self) -> bool {
        self.as_nombre().is_some_and(Nombre::is_zero)
    }

    pub fn est_un(&self) -> bool {
        self.as_nombre().is_some_and(Nombre::is_one)
    }

    pub fn est_sym(&self, nom: &str) -> bool {
        matches!(self, Expr::Sym(s) if s == nom)
    }

    /// Le symbole `var` apparaît-il dans l’arbre ?
    pub fn depend_de(&self, var: &str) -> bool {
        match self {
            Expr::Nb(_) => false,
            Expr::Sym(s) => s == var,
            Expr::Add(v) | Expr::Mul(v) => v.iter().any(|t| t.depend_de(var)),
            Expr::Pow(b, x) => b.depend_de(var) || x.depend_de(var),
            Expr::Func(_, u) => u.depend_de(var),
            Expr::Derivee(c, _, _) => c.depend_de(var),
        }
    }

    pub fn contient_infini(&self) -> bool {
        self.depend_de(INFINI)
    }

    /// Remplace chaque occurrence du symbole `var` par `valeur` (sans simplifier).
    pub fn substitue(&self, var: &str, valeur: &Expr) -> Expr {
        self.remplace(&Expr::sym(var), valeur)
    }

    /// Remplace chaque sous-arbre égal à `motif` par `par` (sans simplifier).
    pub fn remplace(&self, motif: &Expr, par: &Expr) -> Expr {
        if self == motif {
            return par.clone();
        }
        match self {
            Expr::Nb(_) | Expr::Sym(_) => self.clone(),
            Expr::Add(v) => Expr::somme(v.iter().map(|t| t.remplace(motif, par)).collect()),
            Expr::Mul(v) => Expr::produit(v.iter().map(|t| t.remplace(motif, par)).collect()),
            Expr::Pow(b, x) => Expr::Pow(
                Arc::new(b.remplace(motif, par)),
                Arc::new(x.remplace(motif, par)),
            ),
            Expr::Func(f, u) => Expr::func(*f, u.remplace(motif, par)),
            Expr::Derivee(c, v, n) => Expr::Derivee(Arc::new(c.remplace(motif, par)), v.clone(), *n),
        }
    }

    /// Profondeur de l’arbre, calculée sans récursion.
    /// Retourne None si le garde-fou de noeuds saute.
    pub fn profondeur(&self) -> Option<usize> {
        let mut pile: Vec<(&Expr, usize)> = vec![(self, 1)];
        let mut max = 0usize;
        let mut visites = 0usize;

        while let Some((e, d)) = pile.pop() {
            visites += 1;
            if visites > MAX_NOEUDS {
                return None;
            }
            max = max.max(d);
            if max > MAX_PROFONDEUR {
                return Some(max);
            }
            match e {
                Expr::Nb(_) | Expr::Sym(_) => {}
                Expr::Add(v) | Expr::Mul(v) => pile.extend(v.iter().map(|t| (t, d + 1))),
                Expr::Pow(b, x) => {
                    pile.push((b.as_ref(), d + 1));
                    pile.push((x.as_ref(), d + 1));
                }
                Expr::Func(_, u) | Expr::Derivee(u, _, _) => pile.push((u.as_ref(), d + 1)),
            }
        }
        Some(max)
    }

    /// Détecte un coeff·π (coeff rationnel) : 0, π, Mul[c, π].
    pub fn as_coeff_pi(&self) -> Option<BigRational> {
        match self {
            Expr::Nb(Nombre::Rat(r)) if r.is_zero() => Some(r.clone()),
            Expr::Sym(s) if s == PI => Some(BigRational::one()),
            Expr::Mul(v) if v.len() == 2 => match (&v[0], &v[1]) {
                (Expr::Nb(Nombre::Rat(c)), Expr::Sym(s)) if s == PI => Some(c.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Coefficient·π sous forme d’arbre (0 → 0, 1 → π).
    pub fn multiple_de_pi(c: BigRational) -> Expr {
        if c.is_zero() {
            return Expr::zero();
        }
        if c.is_one() {
            return Expr::pi();
        }
        Expr::Mul(vec![Expr::rationnel(c), Expr::pi()])
    }

    /// Entier exact porté par l’arbre, s’il y en a un.
    pub fn as_entier(&self) -> Option<i64> {
        self.as_nombre().and_then(Nombre::as_i64)
    }

    pub fn as_bigint(&self) -> Option<BigInt> {
        match self {
            Expr::Nb(Nombre::Rat(r)) if r.is_integer() => Some(r.numer().clone()),
            _ => None,
        }
    }
}

/* ------------------------ Affichage texte (journal, démarche) ------------------------ */

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Nb(n) => {
                if n.is_negative() {
                    write!(f, "({n})")
                } else {
                    write!(f, "{n}")
                }
            }
            Expr::Sym(s) if s == PI => write!(f, "π"),
            Expr::Sym(s) if s == INFINI => write!(f, "∞"),
            Expr::Sym(s) => write!(f, "{s}"),
            Expr::Add(v) => ecrit_liste(f, v, " + "),
            Expr::Mul(v) => ecrit_liste(f, v, "*"),
            Expr::Pow(b, x) => write!(f, "{b}^{x}"),
            Expr::Func(fun, u) => write!(f, "{}({u})", fun.nom()),
            Expr::Derivee(c, v, n) => write!(f, "d^{n}/d{v}^{n}[{c}]"),
        }
    }
}

fn ecrit_liste(f: &mut fmt::Formatter<'_>, v: &[Expr], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, t) in v.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{t}")?;
    }
    write!(f, ")")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::sym("x")
    }

    #[test]
    fn constructeurs_ecrasent_les_listes() {
        assert_eq!(Expr::somme(vec![]), Expr::zero());
        assert_eq!(Expr::produit(vec![x()]), x());
        assert_eq!(Expr::puissance(x(), Expr::un()), x());

        let s = Expr::somme(vec![Expr::somme(vec![x(), Expr::un()]), Expr::pi()]);
        assert_eq!(s, Expr::Add(vec![x(), Expr::un(), Expr::pi()]));
    }

    #[test]
    fn formes_derivees() {
        assert_eq!(
            Expr::difference(x(), Expr::entier(2)),
            Expr::Add(vec![x(), Expr::entier(-2)])
        );
        assert_eq!(
            Expr::quotient(Expr::un(), x()),
            Expr::Mul(vec![
                Expr::un(),
                Expr::Pow(Arc::new(x()), Arc::new(Expr::entier(-1)))
            ])
        );
    }

    #[test]
    fn dependance_et_substitution() {
        let e = Expr::sin(Expr::produit(vec![Expr::entier(2), x()]));
        assert!(e.depend_de("x"));
        assert!(!e.depend_de("y"));

        let s = e.substitue("x", &Expr::pi());
        assert_eq!(s, Expr::sin(Expr::Mul(vec![Expr::entier(2), Expr::pi()])));
        assert!(!s.depend_de("x"));
    }

    #[test]
    fn remplacement_de_sous_arbre() {
        let u = Expr::puissance(x(), Expr::entier(2));
        let e = Expr::cos(u.clone());
        assert_eq!(e.remplace(&u, &Expr::sym("_u")), Expr::cos(Expr::sym("_u")));
    }

    #[test]
    fn coeff_pi() {
        let e = Expr::Mul(vec![Expr::fraction(3, 4), Expr::pi()]);
        assert_eq!(
            e.as_coeff_pi(),
            Some(BigRational::new(3.into(), 4.into()))
        );
        assert_eq!(x().as_coeff_pi(), None);
        assert_eq!(Expr::multiple_de_pi(BigRational::one()), Expr::pi());
    }

    #[test]
    fn profondeur_iterative() {
        let mut e = x();
        for _ in 0..10 {
            e = Expr::sin(e);
        }
        assert_eq!(e.profondeur(), Some(11));
    }
}
