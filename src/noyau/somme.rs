// src/noyau/somme.rs
//
// Séries Σ_{n=1}^{∞} u(n), par reconnaissance de formes :
// 1) terme nul -> 0, terme constant non nul -> divergente
// 2) géométrique : u(n+1)/u(n) constant r, |r| < 1 -> u(1)/(1 - r)
// 3) Riemann c/n^p : p ≤ 1 divergente, p ∈ {2,4,6,8} -> ζ(p)
// 4) télescopique c/((n+a)(n+b)) avec b - a entier, y compris c/(k n² + s n + t)
// 5) différence f(n) - f(n+1) -> f(1) - lim f
// 6) somme de termes : série par série, si chacune a une forme close
// 7) u(n) ne tend pas vers 0 -> divergente

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use tracing::debug;

use super::bornes::MAX_EXPOSANT;
use super::derive::differentiate;
use super::erreur::{CalcError, Result};
use super::expr::Expr;
use super::lecture::evalue_constante;
use super::limite::{limit, Direction};
use super::nombre::{racine_exacte, Nombre};
use super::simplifie::simplify;

pub fn summation(e: &Expr, var: &str) -> Result<Expr> {
    let e = simplify(e)?;
    if e.est_zero() {
        return Ok(Expr::zero());
    }
    if !e.depend_de(var) {
        return Err(CalcError::Divergent);
    }

    if let Some(r) = geometrique(&e, var)? {
        return Ok(r);
    }
    if let Some(r) = riemann(&e, var)? {
        return Ok(r);
    }
    if let Some(r) = telescopique(&e, var)? {
        return Ok(r);
    }
    if let Some(r) = difference(&e, var)? {
        return Ok(r);
    }
    if let Expr::Add(termes) = &e {
        if let Some(r) = terme_a_terme(termes, var)? {
            return Ok(r);
        }
    }

    // condition nécessaire de convergence
    match limit(&e, var, &Expr::infini(), Direction::DeuxCotes) {
        Ok(l) if !l.est_zero() => {
            debug!(limite = %l, "terme général non nul à l’infini");
            Err(CalcError::Divergent)
        }
        Ok(_) | Err(CalcError::LimitUndefined) => Err(CalcError::SummationUnknown),
        Err(err) => Err(err),
    }
}

/// n -> n + 1
fn decale(e: &Expr, var: &str) -> Expr {
    e.substitue(var, &Expr::somme(vec![Expr::sym(var), Expr::un()]))
}

/// (produit des facteurs constants, facteurs qui dépendent de var)
fn separe_constante(e: &Expr, var: &str) -> (Expr, Vec<Expr>) {
    match e {
        Expr::Mul(v) => {
            let (c, reste): (Vec<Expr>, Vec<Expr>) =
                v.iter().cloned().partition(|f| !f.depend_de(var));
            (Expr::produit(c), reste)
        }
        autre => (Expr::un(), vec![autre.clone()]),
    }
}

/// Σ (u + v + …) = Σ u + Σ v + …
fn terme_a_terme(termes: &[Expr], var: &str) -> Result<Option<Expr>> {
    let mut sommes = Vec::with_capacity(termes.len());
    let mut divergentes = 0;
    for t in termes {
        match summation(t, var) {
            Ok(s) => sommes.push(s),
            Err(CalcError::Divergent) => divergentes += 1,
            Err(err) if err.est_limitation() => return Ok(None),
            Err(err) => return Err(err),
        }
    }
    match divergentes {
        0 => Ok(Some(simplify(&Expr::somme(sommes))?)),
        // convergente + divergente
        1 => Err(CalcError::Divergent),
        _ => Ok(None),
    }
}

/* ------------------------ Géométrique ------------------------ */

fn geometrique(e: &Expr, var: &str) -> Result<Option<Expr>> {
    let raison = match simplify(&Expr::quotient(decale(e, var), e.clone())) {
        Ok(r) if !r.depend_de(var) => r,
        _ => return Ok(None),
    };
    let module = evalue_constante(&raison)
        .map_err(|_| CalcError::non_supportee(format!("raison non numérique : {raison}")))?
        .abs();
    if module >= 1.0 {
        debug!(raison = %raison, "série géométrique divergente");
        return Err(CalcError::Divergent);
    }
    let premier = e.substitue(var, &Expr::un());
    Ok(Some(simplify(&Expr::quotient(
        premier,
        Expr::difference(Expr::un(), raison),
    ))?))
}

/* ------------------------ Riemann ------------------------ */

fn riemann(e: &Expr, var: &str) -> Result<Option<Expr>> {
    let (c, facteurs) = separe_constante(e, var);
    let [Expr::Pow(b, k)] = facteurs.as_slice() else {
        return Ok(None);
    };
    if !b.est_sym(var) {
        return Ok(None);
    }
    let Some(k) = k.as_nombre().and_then(Nombre::as_rat) else {
        return Ok(None);
    };
    let p = -k;
    if p <= BigRational::one() {
        return Err(CalcError::Divergent);
    }

    let (puissance_pi, denominateur) = match p.to_integer().to_i64() {
        Some(2) if p.is_integer() => (2, 6),
        Some(4) if p.is_integer() => (4, 90),
        Some(6) if p.is_integer() => (6, 945),
        Some(8) if p.is_integer() => (8, 9450),
        _ => return Err(CalcError::SummationUnknown),
    };
    Ok(Some(simplify(&Expr::produit(vec![
        c,
        Expr::fraction(1, denominateur),
        Expr::puissance(Expr::pi(), Expr::entier(puissance_pi)),
    ]))?))
}

/* ------------------------ Télescopique ------------------------ */

fn telescopique(e: &Expr, var: &str) -> Result<Option<Expr>> {
    let (c, facteurs) = separe_constante(e, var);
    let mut denominateurs = Vec::new();
    for f in &facteurs {
        match f {
            Expr::Pow(b, k) if k.as_entier() == Some(-1) => denominateurs.push(b.as_ref().clone()),
            _ => return Ok(None),
        }
    }

    // c / (k (n + a)(n + b))
    let (k, a, b) = match denominateurs.as_slice() {
        [l1, l2] => match (decalage(l1, var), decalage(l2, var)) {
            (Some(a), Some(b)) => (BigRational::one(), a, b),
            _ => return Ok(None),
        },
        [q] => match racines_quadratique(q, var)? {
            Some(r) => r,
            None => return Ok(None),
        },
        _ => return Ok(None),
    };

    let (a, b) = if a < b { (a, b) } else { (b, a) };
    let ecart = &b - &a;
    // n + a ne s’annule pas pour n ≥ 1
    if ecart.is_zero()
        || !ecart.is_integer()
        || a <= -BigRational::one()
        || ecart.to_integer() > BigInt::from(MAX_EXPOSANT)
    {
        return Ok(None);
    }

    // 1/((n+a)(n+b)) = (1/(n+a) - 1/(n+b)) / (b - a)
    // Σ_{n≥1} = (1/(a+1) + … + 1/(a+d)) / d, d = b - a
    let mut harmonique = BigRational::zero();
    let mut j = &a + BigRational::one();
    while j <= b {
        harmonique += j.recip();
        j += BigRational::one();
    }
    let coeff = harmonique / (k * ecart);
    debug!(a = %a, b = %b, "série télescopique");
    Ok(Some(simplify(&Expr::produit(vec![c, Expr::rationnel(coeff)]))?))
}

/// n + a (a rationnel) -> a
fn decalage(l: &Expr, var: &str) -> Option<BigRational> {
    match l {
        Expr::Sym(s) if s == var => Some(BigRational::zero()),
        Expr::Add(v) if v.len() == 2 && v[1].est_sym(var) => {
            v[0].as_nombre().and_then(Nombre::as_rat).cloned()
        }
        _ => None,
    }
}

/// q = k n² + s n + t = k (n + a)(n + b), a et b rationnels -> (k, a, b)
fn racines_quadratique(
    q: &Expr,
    var: &str,
) -> Result<Option<(BigRational, BigRational, BigRational)>> {
    if !differentiate(q, var, 3)?.est_zero() {
        return Ok(None);
    }
    let en_zero = |e: &Expr| -> Result<Option<BigRational>> {
        let v = simplify(&e.substitue(var, &Expr::zero()))?;
        Ok(v.as_nombre().and_then(Nombre::as_rat).cloned())
    };
    let (Some(t), Some(s), Some(k2)) = (
        en_zero(q)?,
        en_zero(&differentiate(q, var, 1)?)?,
        en_zero(&differentiate(q, var, 2)?)?,
    ) else {
        return Ok(None);
    };
    if k2.is_zero() {
        return Ok(None);
    }
    let k = k2 / BigRational::from_integer(BigInt::from(2));

    // a + b = s/k, ab = t/k
    let somme = &s / &k;
    let produit = &t / &k;
    let quatre = BigRational::from_integer(BigInt::from(4));
    let delta = &somme * &somme - quatre * produit;
    if delta.is_negative() {
        return Ok(None);
    }
    let Some(racine) = racine_exacte(&delta, 2) else {
        return Ok(None);
    };
    let deux = BigRational::from_integer(BigInt::from(2));
    let a = (&somme - &racine) / &deux;
    let b = (&somme + &racine) / &deux;
    Ok(Some((k, a, b)))
}

/* ------------------------ Différence ------------------------ */

fn difference(e: &Expr, var: &str) -> Result<Option<Expr>> {
    let Expr::Add(termes) = e else {
        return Ok(None);
    };
    let [t1, t2] = termes.as_slice() else {
        return Ok(None);
    };

    for (f, g) in [(t1, t2), (t2, t1)] {
        // g = -f(n+1) ?
        let test = simplify(&Expr::somme(vec![decale(f, var), g.clone()]));
        if !matches!(test, Ok(ref z) if z.est_zero()) {
            continue;
        }
        let f1 = simplify(&f.substitue(var, &Expr::un()))?;
        let l = limit(f, var, &Expr::infini(), Direction::DeuxCotes)?;
        if l.contient_infini() {
            return Err(CalcError::Divergent);
        }
        debug!(f = %f, "série télescopique (différence)");
        return Ok(Some(simplify(&Expr::difference(f1, l))?));
    }
    Ok(None)
}
