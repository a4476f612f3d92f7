// src/noyau/limite.rs
//
// Limites.
// - substitution directe d’abord (point fini)
// - sinon évaluation structurelle sur Fini(e) | +∞ | -∞
// - formes 0/0, ∞/∞, 0·∞, ∞ - ∞ : L’Hôpital (budget partagé MAX_LHOPITAL)
// - signe d’une quantité qui tend vers 0 : évaluation numérique en point ∓ ε
// - point ±oo accepté (la direction est alors ignorée)

use tracing::debug;

use super::bornes::{EPSILON_APPROCHE, MAX_LHOPITAL, TOLERANCE};
use super::derive::differentiate;
use super::erreur::{CalcError, Result};
use super::expr::{Expr, Fonction, INFINI};
use super::lecture::{evalue_constante, evalue_en};
use super::simplifie::simplify;

/// Côté d’approche.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Gauche,
    Droite,
    DeuxCotes,
}

#[derive(Clone, Debug, PartialEq)]
enum Valeur {
    Fini(Expr),
    PlusInfini,
    MoinsInfini,
}

impl Valeur {
    fn depuis_signe(s: i8) -> Valeur {
        if s > 0 {
            Valeur::PlusInfini
        } else {
            Valeur::MoinsInfini
        }
    }

    fn est_zero(&self) -> bool {
        matches!(self, Valeur::Fini(e) if e.est_zero())
    }

    fn est_infini(&self) -> bool {
        !matches!(self, Valeur::Fini(_))
    }

    fn en_expr(self) -> Expr {
        match self {
            Valeur::Fini(e) => e,
            Valeur::PlusInfini => Expr::infini(),
            Valeur::MoinsInfini => Expr::neg(Expr::infini()),
        }
    }
}

#[derive(Clone, Debug)]
enum Point {
    Fini(Expr, f64),
    PlusInfini,
    MoinsInfini,
}

impl Point {
    fn depuis(p: &Expr) -> Result<Point> {
        let p = simplify(p)?;
        if p.est_sym(INFINI) {
            return Ok(Point::PlusInfini);
        }
        if let Expr::Mul(v) = &p {
            if v.len() == 2 && v[0] == Expr::entier(-1) && v[1].est_sym(INFINI) {
                return Ok(Point::MoinsInfini);
            }
        }
        let x = evalue_constante(&p)
            .map_err(|_| CalcError::argument(format!("point de limite non numérique : {p}")))?;
        Ok(Point::Fini(p, x))
    }
}

/// lim_{var -> point} e, du côté demandé.
pub fn limit(e: &Expr, var: &str, point: &Expr, direction: Direction) -> Result<Expr> {
    let e = simplify(e)?;
    let point = Point::depuis(point)?;

    let valeur = match (&point, direction) {
        (Point::Fini(..), Direction::DeuxCotes) => {
            let g = une_limite(&e, var, &point, Direction::Gauche)?;
            let d = une_limite(&e, var, &point, Direction::Droite)?;
            if !memes_valeurs(&g, &d) {
                debug!(gauche = ?g, droite = ?d, "limites latérales différentes");
                return Err(CalcError::LimitUndefined);
            }
            d
        }
        (Point::Fini(..), cote) => une_limite(&e, var, &point, cote)?,
        _ => une_limite(&e, var, &point, Direction::Gauche)?,
    };
    Ok(valeur.en_expr())
}

fn une_limite(e: &Expr, var: &str, point: &Point, cote: Direction) -> Result<Valeur> {
    let mut ctx = Contexte {
        var,
        point: point.clone(),
        cote,
        restant: MAX_LHOPITAL,
    };
    ctx.lim(e)
}

fn memes_valeurs(a: &Valeur, b: &Valeur) -> bool {
    match (a, b) {
        (Valeur::Fini(x), Valeur::Fini(y)) => {
            x == y
                || match (evalue_constante(x), evalue_constante(y)) {
                    (Ok(x), Ok(y)) => (x - y).abs() <= TOLERANCE * x.abs().max(1.0),
                    _ => false,
                }
        }
        _ => a == b,
    }
}

/* ------------------------ Moteur ------------------------ */

struct Contexte<'a> {
    var: &'a str,
    point: Point,
    cote: Direction,
    /// Réécritures L’Hôpital encore permises.
    restant: usize,
}

impl Contexte<'_> {
    fn lim(&mut self, e: &Expr) -> Result<Valeur> {
        if !e.depend_de(self.var) {
            return Ok(Valeur::Fini(simplify(e)?));
        }
        if let Point::Fini(p, _) = &self.point {
            if let Ok(v) = simplify(&e.substitue(self.var, p)) {
                if !v.contient_infini() {
                    return Ok(Valeur::Fini(v));
                }
            }
        }

        match e {
            Expr::Nb(_) => Ok(Valeur::Fini(e.clone())),
            Expr::Sym(_) => Ok(match &self.point {
                Point::Fini(p, _) => Valeur::Fini(p.clone()),
                Point::PlusInfini => Valeur::PlusInfini,
                Point::MoinsInfini => Valeur::MoinsInfini,
            }),
            Expr::Add(termes) => self.lim_somme(termes),
            Expr::Mul(facteurs) => self.lim_produit(facteurs),
            Expr::Pow(b, k) => self.lim_puissance(b, k),
            Expr::Func(f, u) => self.lim_fonction(*f, u),
            Expr::Derivee(_, _, _) => {
                let r = simplify(e)?;
                self.lim(&r)
            }
        }
    }

    fn lim_somme(&mut self, termes: &[Expr]) -> Result<Valeur> {
        let mut finis = Vec::new();
        let mut plus = false;
        let mut moins = false;
        let mut premier_infini = 0;
        for (i, t) in termes.iter().enumerate() {
            match self.lim(t)? {
                Valeur::Fini(v) => finis.push(v),
                Valeur::PlusInfini => {
                    if !plus && !moins {
                        premier_infini = i;
                    }
                    plus = true;
                }
                Valeur::MoinsInfini => {
                    if !plus && !moins {
                        premier_infini = i;
                    }
                    moins = true;
                }
            }
        }
        match (plus, moins) {
            (false, false) => Ok(Valeur::Fini(simplify(&Expr::somme(finis))?)),
            (true, false) => Ok(Valeur::PlusInfini),
            (false, true) => Ok(Valeur::MoinsInfini),
            (true, true) => self.infini_moins_infini(termes, premier_infini),
        }
    }

    /// ∞ - ∞ : dénominateur commun si possible, sinon mise en facteur d’un terme infini.
    fn infini_moins_infini(&mut self, termes: &[Expr], k: usize) -> Result<Valeur> {
        self.consomme()?;
        let fractions: Vec<(Expr, Expr)> = termes.iter().map(separe_fraction).collect();

        if fractions.iter().any(|(_, d)| !d.est_un()) {
            let den = Expr::produit(fractions.iter().map(|(_, d)| d.clone()).collect());
            let num = Expr::somme(
                fractions
                    .iter()
                    .enumerate()
                    .map(|(i, (n, _))| {
                        let mut f = vec![n.clone()];
                        f.extend(
                            fractions
                                .iter()
                                .enumerate()
                                .filter(|&(j, _)| j != i)
                                .map(|(_, (_, d))| d.clone()),
                        );
                        Expr::produit(f)
                    })
                    .collect(),
            );
            return self.lim_quotient(&simplify(&num)?, &simplify(&den)?);
        }

        // t·(Σ u/t)
        let t = &termes[k];
        let reste = simplify(&Expr::somme(
            termes
                .iter()
                .map(|u| Expr::quotient(u.clone(), t.clone()))
                .collect(),
        ))?;
        self.lim_facteurs(&[t.clone(), reste])
    }

    fn lim_produit(&mut self, facteurs: &[Expr]) -> Result<Valeur> {
        let (n, d) = separe_facteurs(facteurs);
        if !d.est_un() {
            return self.lim_quotient(&n, &d);
        }
        self.lim_facteurs(facteurs)
    }

    /// Produit sans dénominateur ; 0·∞ devient un quotient.
    fn lim_facteurs(&mut self, facteurs: &[Expr]) -> Result<Valeur> {
        let mut valeurs = Vec::with_capacity(facteurs.len());
        for f in facteurs {
            valeurs.push(self.lim(f)?);
        }

        if valeurs.iter().any(Valeur::est_zero) && valeurs.iter().any(Valeur::est_infini) {
            let mut zeros = Vec::new();
            let mut autres = Vec::new();
            for (f, v) in facteurs.iter().zip(&valeurs) {
                if v.est_zero() {
                    zeros.push(f.clone());
                } else {
                    autres.push(f.clone());
                }
            }
            let f = Expr::produit(zeros);
            let g = Expr::produit(autres);
            return self.zero_fois_infini(&f, &g);
        }

        produit_valeurs(valeurs)
    }

    /// f -> 0, g -> ∞. Le log reste au numérateur, l’exponentielle passe au
    /// dénominateur ; en cas d’échec on essaie l’autre écriture.
    fn zero_fois_infini(&mut self, f: &Expr, g: &Expr) -> Result<Valeur> {
        let g_sur_inv_f = contient_fonction(g, Fonction::Log) || contient_fonction(f, Fonction::Exp);
        let ecritures = if g_sur_inv_f {
            [(g, f), (f, g)]
        } else {
            [(f, g), (g, f)]
        };

        let budget = self.restant;
        for (num, inv) in ecritures {
            self.restant = budget;
            match simplify(&Expr::inverse(inv.clone())).and_then(|d| self.lim_quotient(num, &d)) {
                Err(CalcError::LimitUndefined) => continue,
                autre => return autre,
            }
        }
        Err(CalcError::LimitUndefined)
    }

    fn lim_quotient(&mut self, n: &Expr, d: &Expr) -> Result<Valeur> {
        let ln = self.lim(n)?;
        let ld = self.lim(d)?;
        match (ln, ld) {
            (Valeur::Fini(a), Valeur::Fini(b)) if !b.est_zero() => {
                Ok(Valeur::Fini(simplify(&Expr::quotient(a, b))?))
            }
            (Valeur::Fini(a), Valeur::Fini(_)) if a.est_zero() => self.lhopital(n, d),
            (Valeur::Fini(a), Valeur::Fini(_)) => {
                Ok(Valeur::depuis_signe(signe_de(&a)? * self.signe_approche(d)?))
            }
            (Valeur::Fini(_), _) => Ok(Valeur::Fini(Expr::zero())),
            (inf, Valeur::Fini(b)) => {
                let s = if inf == Valeur::PlusInfini { 1 } else { -1 };
                let sd = if b.est_zero() {
                    self.signe_approche(d)?
                } else {
                    signe_de(&b)?
                };
                Ok(Valeur::depuis_signe(s * sd))
            }
            _ => self.lhopital(n, d),
        }
    }

    fn lhopital(&mut self, n: &Expr, d: &Expr) -> Result<Valeur> {
        self.consomme()?;
        let dn = differentiate(n, self.var, 1)?;
        let dd = differentiate(d, self.var, 1)?;
        if dd.est_zero() {
            return Err(CalcError::LimitUndefined);
        }
        let q = simplify(&Expr::quotient(dn, dd))?;
        debug!(quotient = %q, "L’Hôpital");
        self.lim(&q)
    }

    fn consomme(&mut self) -> Result<()> {
        if self.restant == 0 {
            debug!("budget de L’Hôpital épuisé");
            return Err(CalcError::LimitUndefined);
        }
        self.restant -= 1;
        Ok(())
    }

    fn lim_puissance(&mut self, b: &Expr, k: &Expr) -> Result<Valeur> {
        // b^k = exp(k log b)
        if k.depend_de(self.var) {
            let r = simplify(&Expr::exp(Expr::produit(vec![
                k.clone(),
                Expr::log(b.clone()),
            ])))?;
            return self.lim(&r);
        }
        if let Some(c) = k.as_nombre().filter(|c| c.is_negative()) {
            let d = simplify(&Expr::puissance(b.clone(), Expr::Nb(c.neg())))?;
            return self.lim_quotient(&Expr::un(), &d);
        }

        match self.lim(b)? {
            Valeur::Fini(v) => Ok(Valeur::Fini(simplify(&Expr::puissance(v, k.clone()))?)),
            Valeur::PlusInfini => Ok(if signe_de(k)? > 0 {
                Valeur::PlusInfini
            } else {
                Valeur::Fini(Expr::zero())
            }),
            Valeur::MoinsInfini => match k.as_entier() {
                Some(n) if n % 2 == 0 => Ok(Valeur::PlusInfini),
                Some(_) => Ok(Valeur::MoinsInfini),
                None => Err(CalcError::LimitUndefined),
            },
        }
    }

    fn lim_fonction(&mut self, f: Fonction, u: &Expr) -> Result<Valeur> {
        match (f, self.lim(u)?) {
            (_, Valeur::Fini(v)) => match simplify(&Expr::func(f, v.clone())) {
                Ok(r) => Ok(Valeur::Fini(r)),
                Err(CalcError::Domain(_)) => match f {
                    Fonction::Log if v.est_zero() => {
                        if self.signe_approche(u)? > 0 {
                            Ok(Valeur::MoinsInfini)
                        } else {
                            Err(CalcError::LimitUndefined)
                        }
                    }
                    // pôle de tan
                    Fonction::Tan => {
                        self.lim_quotient(&Expr::sin(u.clone()), &Expr::cos(u.clone()))
                    }
                    _ => Err(CalcError::LimitUndefined),
                },
                Err(err) => Err(err),
            },
            (Fonction::Exp | Fonction::Log, Valeur::PlusInfini) => Ok(Valeur::PlusInfini),
            (Fonction::Exp, Valeur::MoinsInfini) => Ok(Valeur::Fini(Expr::zero())),
            _ => Err(CalcError::LimitUndefined),
        }
    }

    /// Signe de e au voisinage du point, du côté d’approche.
    fn signe_approche(&self, e: &Expr) -> Result<i8> {
        let grand = 1.0 / EPSILON_APPROCHE;
        let x = match &self.point {
            Point::Fini(_, p) => {
                let eps = EPSILON_APPROCHE * p.abs().max(1.0);
                if self.cote == Direction::Gauche {
                    p - eps
                } else {
                    p + eps
                }
            }
            Point::PlusInfini => grand,
            Point::MoinsInfini => -grand,
        };
        let v = evalue_en(e, self.var, x).map_err(|_| CalcError::LimitUndefined)?;
        signe_f64(v)
    }
}

/* ------------------------ Outils ------------------------ */

fn signe_f64(v: f64) -> Result<i8> {
    if v > 0.0 {
        Ok(1)
    } else if v < 0.0 {
        Ok(-1)
    } else {
        Err(CalcError::LimitUndefined)
    }
}

fn signe_de(e: &Expr) -> Result<i8> {
    evalue_constante(e)
        .map_err(|_| CalcError::LimitUndefined)
        .and_then(signe_f64)
}

fn produit_valeurs(valeurs: Vec<Valeur>) -> Result<Valeur> {
    let mut signe: i8 = 1;
    let mut infini = false;
    let mut finis = Vec::new();
    for v in valeurs {
        match v {
            Valeur::Fini(e) => finis.push(e),
            Valeur::PlusInfini => infini = true,
            Valeur::MoinsInfini => {
                infini = true;
                signe = -signe;
            }
        }
    }
    if !infini {
        return Ok(Valeur::Fini(simplify(&Expr::produit(finis))?));
    }
    for f in &finis {
        signe *= signe_de(f)?;
    }
    Ok(Valeur::depuis_signe(signe))
}

/// Numérateur / dénominateur d’un terme : les puissances à exposant
/// numérique négatif passent au dénominateur.
fn separe_fraction(e: &Expr) -> (Expr, Expr) {
    match e {
        Expr::Mul(v) => separe_facteurs(v),
        autre => separe_facteurs(std::slice::from_ref(autre)),
    }
}

fn separe_facteurs(facteurs: &[Expr]) -> (Expr, Expr) {
    let mut num = Vec::new();
    let mut den = Vec::new();
    for f in facteurs {
        match f {
            Expr::Pow(b, k) => match k.as_nombre() {
                Some(c) if c.is_negative() => {
                    den.push(Expr::puissance(b.as_ref().clone(), Expr::Nb(c.neg())))
                }
                _ => num.push(f.clone()),
            },
            autre => num.push(autre.clone()),
        }
    }
    (Expr::produit(num), Expr::produit(den))
}

fn contient_fonction(e: &Expr, f: Fonction) -> bool {
    match e {
        Expr::Func(g, u) => *g == f || contient_fonction(u, f),
        Expr::Add(v) | Expr::Mul(v) => v.iter().any(|t| contient_fonction(t, f)),
        Expr::Pow(b, x) => contient_fonction(b, f) || contient_fonction(x, f),
        Expr::Derivee(c, _, _) => contient_fonction(c, f),
        Expr::Nb(_) | Expr::Sym(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::rpn::parse;

    fn lim(txt: &str, point: &str, direction: Direction) -> Result<Expr> {
        limit(
            &parse(txt).unwrap(),
            "x",
            &parse(point).unwrap(),
            direction,
        )
    }

    #[test]
    fn substitution_directe() {
        assert_eq!(lim("x^2 + 1", "2", Direction::DeuxCotes), Ok(Expr::entier(5)));
        assert_eq!(lim("cos(x)", "pi", Direction::DeuxCotes), Ok(Expr::entier(-1)));
    }

    #[test]
    fn forme_zero_sur_zero() {
        assert_eq!(lim("sin(x)/x", "0", Direction::DeuxCotes), Ok(Expr::un()));
        assert_eq!(lim("(x^2 - 1)/(x - 1)", "1", Direction::DeuxCotes), Ok(Expr::entier(2)));
        assert_eq!(
            lim("(1 - cos(x))/x^2", "0", Direction::DeuxCotes),
            Ok(Expr::fraction(1, 2))
        );
    }

    #[test]
    fn limites_laterales() {
        assert_eq!(lim("1/x", "0", Direction::Droite), Ok(Expr::infini()));
        assert_eq!(lim("1/x", "0", Direction::Gauche), Ok(Expr::neg(Expr::infini())));
        assert_eq!(lim("1/x", "0", Direction::DeuxCotes), Err(CalcError::LimitUndefined));
        assert_eq!(lim("1/x^2", "0", Direction::DeuxCotes), Ok(Expr::infini()));
    }

    #[test]
    fn zero_fois_infini() {
        assert_eq!(lim("x log(x)", "0", Direction::Droite), Ok(Expr::zero()));
        assert_eq!(lim("log(x)", "0", Direction::Droite), Ok(Expr::neg(Expr::infini())));
    }

    #[test]
    fn a_l_infini() {
        assert_eq!(lim("1/x", "oo", Direction::DeuxCotes), Ok(Expr::zero()));
        assert_eq!(lim("(2x + 1)/(x + 3)", "oo", Direction::DeuxCotes), Ok(Expr::entier(2)));
        assert_eq!(lim("(1 + 1/x)^x", "oo", Direction::DeuxCotes), Ok(Expr::e()));
        assert_eq!(lim("x^2 exp(-x)", "oo", Direction::DeuxCotes), Ok(Expr::zero()));
        assert_eq!(lim("x^2 - x", "oo", Direction::DeuxCotes), Ok(Expr::infini()));
        assert_eq!(lim("exp(x)", "-oo", Direction::DeuxCotes), Ok(Expr::zero()));
    }

    #[test]
    fn trig_a_l_infini_indefinie() {
        assert_eq!(lim("sin(x)", "oo", Direction::DeuxCotes), Err(CalcError::LimitUndefined));
    }
}
