// src/noyau/integre.rs
//
// Intégration symbolique, par stratégies successives (profondeur bornée) :
// 1) constantes, linéarité (somme, facteurs constants)
// 2) table de primitives, argument intérieur linéaire a·x + b accepté
// 3) développement des produits de sommes et des petites puissances de sommes
// 4) changement de variable u (arguments de fonctions, bases et exposants)
// 5) intégration par parties (ordre log, algébrique, trig, exp)
//
// Intégrale définie : F(b) - F(a), découpée aux singularités intérieures (limites
// latérales de F), bornes ±oo par limite ; sinon Simpson (résultat marqué approché).

use tracing::debug;

use super::bornes::{
    MAX_CANDIDATS_SUBSTITUTION, MAX_DEVELOPPEMENT, MAX_PROFONDEUR_INTEGRATION, MAX_SINGULARITES,
    MAX_TERMES_DEVELOPPES, SIMPSON_N_DEFAUT, TOLERANCE,
};
use super::derive::differentiate;
use super::erreur::{CalcError, Result};
use super::expr::{Expr, Fonction, INFINI};
use super::lecture::evalue_constante;
use super::limite::{limit, Direction};
use super::nombre::Nombre;
use super::simplifie::simplify;
use super::simpson::simpson;

/// Variable muette du changement de variable.
const VAR_SUBSTITUTION: &str = "_u";

/// Résultat d’une intégrale définie.
#[derive(Clone, Debug, PartialEq)]
pub struct Integrale {
    pub valeur: Expr,
    /// true si la valeur vient de la règle de Simpson.
    pub approximative: bool,
}

/// Primitive de `e` par rapport à `var` (sans constante), ou None.
pub fn integrate_indefinite(e: &Expr, var: &str) -> Option<Expr> {
    match integre(e, var, 0) {
        Ok(r) => r,
        Err(err) => {
            debug!(%err, expr = %e, "intégration abandonnée");
            None
        }
    }
}

/// ∫_a^b e d(var), bornes ±oo acceptées.
pub fn integrate_definite(e: &Expr, var: &str, a: &Expr, b: &Expr) -> Result<Integrale> {
    // bornes symboliques : F(b) - F(a) sans découpage
    let numeriques = borne_f64(a).and_then(|xa| Ok((xa, borne_f64(b)?)));
    let impropre =
        matches!(numeriques, Ok((xa, xb)) if !xa.is_finite() || !xb.is_finite());

    if let Some(primitive) = integrate_indefinite(e, var) {
        match valeur_exacte(e, &primitive, var, (a, b), numeriques.as_ref().ok().copied()) {
            Ok(valeur) => {
                return Ok(Integrale {
                    valeur,
                    approximative: false,
                })
            }
            Err(CalcError::Divergent) => return Err(CalcError::Divergent),
            Err(err) if !impropre && (err.est_limitation() || matches!(err, CalcError::Domain(_))) => {
                debug!(%err, "primitive non évaluable sur l’intervalle, Simpson");
            }
            Err(err) => return Err(err),
        }
    } else {
        debug!(expr = %e, "pas de primitive, Simpson");
    }

    if impropre {
        return Err(CalcError::non_supportee(
            "intégrale impropre sans primitive exploitable",
        ));
    }
    let (xa, xb) = numeriques?;
    let (bas, haut) = if xa <= xb { (xa, xb) } else { (xb, xa) };
    let mut poles = Vec::new();
    singularites(e, var, bas, haut, &mut poles)?;
    if let Some((p, _)) = poles.first() {
        return Err(CalcError::non_supportee(format!(
            "singularité possible en {var} = {p}, Simpson impossible"
        )));
    }

    let v = simpson(e, var, xa, xb, SIMPSON_N_DEFAUT)?;
    Ok(Integrale {
        valeur: Expr::flottant(v),
        approximative: true,
    })
}

/// Σ des morceaux F(fin) - F(début) entre a, les singularités intérieures et b.
/// Une limite infinie de F en un noeud rend l’intégrale divergente.
fn valeur_exacte(
    e: &Expr,
    primitive: &Expr,
    var: &str,
    (a, b): (&Expr, &Expr),
    numeriques: Option<(f64, f64)>,
) -> Result<Expr> {
    let croissant = numeriques.map_or(true, |(xa, xb)| xa <= xb);

    let mut points = Vec::new();
    if let Some((xa, xb)) = numeriques {
        let (bas, haut) = if croissant { (xa, xb) } else { (xb, xa) };
        singularites(e, var, bas, haut, &mut points)?;
        singularites(primitive, var, bas, haut, &mut points)?;
    }
    points.sort_by(|p, q| p.1.total_cmp(&q.1));
    points.dedup_by(|p, q| (p.1 - q.1).abs() <= TOLERANCE * p.1.abs().max(1.0));
    if !croissant {
        points.reverse();
    }
    if !points.is_empty() {
        debug!(n = points.len(), "intégrale découpée aux singularités");
    }

    let mut noeuds = vec![a.clone()];
    noeuds.extend(points.into_iter().map(|(p, _)| p));
    noeuds.push(b.clone());

    // début d’un morceau approché par l’intérieur, fin aussi
    let (cote_debut, cote_fin) = if croissant {
        (Direction::Droite, Direction::Gauche)
    } else {
        (Direction::Gauche, Direction::Droite)
    };

    let mut termes = Vec::with_capacity(2 * noeuds.len());
    let mut divergente = false;
    let mut erreur = None;
    for morceau in noeuds.windows(2) {
        for (noeud, cote, signe) in [(&morceau[1], cote_fin, 1), (&morceau[0], cote_debut, -1)] {
            match valeur_en(primitive, var, noeud, cote) {
                Ok(v) if v.contient_infini() => divergente = true,
                Ok(v) if signe > 0 => termes.push(v),
                Ok(v) => termes.push(Expr::neg(v)),
                Err(err) => {
                    erreur.get_or_insert(err);
                }
            }
        }
    }
    if divergente {
        return Err(CalcError::Divergent);
    }
    if let Some(err) = erreur {
        return Err(err);
    }

    let valeur = simplify(&Expr::somme(termes))?;
    if valeur.contient_infini() {
        return Err(CalcError::Divergent);
    }
    Ok(valeur)
}

/// F(borne) ; limite de F si la borne est ±oo ou si la substitution sort du domaine.
fn valeur_en(f: &Expr, var: &str, borne: &Expr, cote: Direction) -> Result<Expr> {
    if borne.contient_infini() {
        return limit(f, var, borne, cote);
    }
    match simplify(&f.substitue(var, borne)) {
        Ok(v) => Ok(v),
        Err(CalcError::Domain(msg)) => {
            debug!(%msg, borne = %borne, "borne hors domaine, limite latérale");
            limit(f, var, borne, cote)
        }
        Err(err) => Err(err),
    }
}

/// Valeur numérique d’une borne ; oo et -oo donnent ±∞.
fn borne_f64(borne: &Expr) -> Result<f64> {
    let b = simplify(borne)?;
    if b.est_sym(INFINI) {
        return Ok(f64::INFINITY);
    }
    if let Expr::Mul(v) = &b {
        if v.len() == 2 && v[0] == Expr::entier(-1) && v[1].est_sym(INFINI) {
            return Ok(f64::NEG_INFINITY);
        }
    }
    evalue_constante(&b)
}

/* ------------------------ Singularités ------------------------ */

/// Points de ]bas, haut[ où e peut ne pas être définie : zéros des dénominateurs
/// et des arguments de log, pôles de tan.
fn singularites(e: &Expr, var: &str, bas: f64, haut: f64, out: &mut Vec<(Expr, f64)>) -> Result<()> {
    match e {
        Expr::Nb(_) | Expr::Sym(_) => {}
        Expr::Add(v) | Expr::Mul(v) => {
            for t in v {
                singularites(t, var, bas, haut, out)?;
            }
        }
        Expr::Pow(b, k) => {
            if k.as_nombre().is_some_and(Nombre::is_negative) {
                zeros(b, var, bas, haut, out)?;
            }
            singularites(b, var, bas, haut, out)?;
            singularites(k, var, bas, haut, out)?;
        }
        Expr::Func(f, u) => {
            match f {
                Fonction::Log => zeros(u, var, bas, haut, out)?,
                Fonction::Tan => zeros_trig(u, demi_pi(), var, bas, haut, out)?,
                _ => {}
            }
            singularites(u, var, bas, haut, out)?;
        }
        Expr::Derivee(c, _, _) => singularites(c, var, bas, haut, out)?,
    }
    if out.len() > MAX_SINGULARITES {
        return Err(CalcError::non_supportee("trop de singularités sur l’intervalle"));
    }
    Ok(())
}

fn demi_pi() -> Expr {
    Expr::produit(vec![Expr::fraction(1, 2), Expr::pi()])
}

/// Zéros de q : facteurs d’un produit, polynômes de degré ≤ 2, sin et cos d’argument linéaire.
fn zeros(q: &Expr, var: &str, bas: f64, haut: f64, out: &mut Vec<(Expr, f64)>) -> Result<()> {
    if !q.depend_de(var) {
        return Ok(());
    }
    match q {
        Expr::Mul(v) => {
            for f in v {
                zeros(f, var, bas, haut, out)?;
            }
            return Ok(());
        }
        Expr::Pow(b, k) if k.as_nombre().is_some_and(|c| !c.is_negative() && !c.is_zero()) => {
            return zeros(b, var, bas, haut, out);
        }
        Expr::Func(Fonction::Sin, u) => return zeros_trig(u, Expr::zero(), var, bas, haut, out),
        Expr::Func(Fonction::Cos, u) => return zeros_trig(u, demi_pi(), var, bas, haut, out),
        _ => {}
    }
    for r in racines_polynome(q, var)? {
        ajoute_point(r, bas, haut, out)?;
    }
    Ok(())
}

/// Racines réelles de q = k x² + s x + t (coefficients numériques), sinon aucune.
fn racines_polynome(q: &Expr, var: &str) -> Result<Vec<Expr>> {
    if !differentiate(q, var, 3)?.est_zero() {
        return Ok(Vec::new());
    }
    let en_zero = |e: &Expr| simplify(&e.substitue(var, &Expr::zero()));
    let t = en_zero(q)?;
    let s = en_zero(&differentiate(q, var, 1)?)?;
    let k = simplify(&Expr::quotient(en_zero(&differentiate(q, var, 2)?)?, Expr::entier(2)))?;
    let (Ok(kf), Ok(sf), Ok(tf)) = (evalue_constante(&k), evalue_constante(&s), evalue_constante(&t))
    else {
        return Ok(Vec::new());
    };

    if kf == 0.0 {
        if sf == 0.0 {
            return Ok(Vec::new());
        }
        return Ok(vec![Expr::neg(Expr::quotient(t, s))]);
    }
    if sf * sf - 4.0 * kf * tf < 0.0 {
        return Ok(Vec::new());
    }
    let delta = Expr::difference(
        Expr::puissance(s.clone(), Expr::entier(2)),
        Expr::produit(vec![Expr::entier(4), k.clone(), t]),
    );
    let deux_k = Expr::produit(vec![Expr::entier(2), k]);
    Ok([-1, 1]
        .into_iter()
        .map(|signe| {
            Expr::quotient(
                Expr::somme(vec![
                    Expr::neg(s.clone()),
                    Expr::produit(vec![Expr::entier(signe), Expr::racine(delta.clone())]),
                ]),
                deux_k.clone(),
            )
        })
        .collect())
}

/// u = α x + β : points où u = c + kπ.
fn zeros_trig(
    u: &Expr,
    c: Expr,
    var: &str,
    bas: f64,
    haut: f64,
    out: &mut Vec<(Expr, f64)>,
) -> Result<()> {
    let Some(alpha) = pente(u, var)? else {
        return Ok(());
    };
    let beta = simplify(&u.substitue(var, &Expr::zero()))?;
    let (Ok(af), Ok(bf), Ok(cf)) = (evalue_constante(&alpha), evalue_constante(&beta), evalue_constante(&c))
    else {
        return Ok(());
    };
    if !bas.is_finite() || !haut.is_finite() {
        return Err(CalcError::non_supportee(
            "pôles périodiques sur un intervalle infini",
        ));
    }

    let (u1, u2) = (af * bas + bf, af * haut + bf);
    let (u1, u2) = if u1 <= u2 { (u1, u2) } else { (u2, u1) };
    let k_min = ((u1 - cf) / std::f64::consts::PI).floor();
    let k_max = ((u2 - cf) / std::f64::consts::PI).ceil();
    if k_max - k_min > MAX_SINGULARITES as f64 {
        return Err(CalcError::non_supportee("trop de singularités sur l’intervalle"));
    }
    for k in (k_min as i64)..=(k_max as i64) {
        let point = Expr::quotient(
            Expr::difference(
                Expr::somme(vec![c.clone(), Expr::produit(vec![Expr::entier(k), Expr::pi()])]),
                beta.clone(),
            ),
            alpha.clone(),
        );
        ajoute_point(point, bas, haut, out)?;
    }
    Ok(())
}

/// Garde le point s’il est strictement intérieur à ]bas, haut[.
fn ajoute_point(p: Expr, bas: f64, haut: f64, out: &mut Vec<(Expr, f64)>) -> Result<()> {
    let p = simplify(&p)?;
    let Ok(x) = evalue_constante(&p) else {
        return Ok(());
    };
    let marge = TOLERANCE * x.abs().max(1.0);
    if x - bas > marge && haut - x > marge {
        out.push((p, x));
    }
    Ok(())
}

/* ------------------------ Moteur ------------------------ */

fn integre(e: &Expr, var: &str, profondeur: usize) -> Result<Option<Expr>> {
    if profondeur > MAX_PROFONDEUR_INTEGRATION {
        return Ok(None);
    }
    let e = simplify(e)?;
    match integre_simplifie(&e, var, profondeur)? {
        Some(f) => Ok(Some(simplify(&f)?)),
        None => Ok(None),
    }
}

fn integre_simplifie(e: &Expr, var: &str, profondeur: usize) -> Result<Option<Expr>> {
    // ∫c = c·x
    if !e.depend_de(var) {
        return Ok(Some(Expr::produit(vec![e.clone(), Expr::sym(var)])));
    }

    match e {
        Expr::Add(termes) => {
            let mut primitives = Vec::with_capacity(termes.len());
            for t in termes {
                match integre(t, var, profondeur)? {
                    Some(f) => primitives.push(f),
                    None => return Ok(None),
                }
            }
            return Ok(Some(Expr::somme(primitives)));
        }
        Expr::Mul(facteurs) => {
            let (constantes, variables): (Vec<Expr>, Vec<Expr>) =
                facteurs.iter().cloned().partition(|f| !f.depend_de(var));
            if !constantes.is_empty() {
                return Ok(integre(&Expr::produit(variables), var, profondeur)?
                    .map(|g| Expr::produit(vec![Expr::produit(constantes), g])));
            }
        }
        _ => {}
    }

    if let Some(f) = table(e, var)? {
        return Ok(Some(f));
    }
    if let Some(d) = developpe(e) {
        if let Some(f) = integre(&d, var, profondeur + 1)? {
            return Ok(Some(f));
        }
    }
    if let Some(f) = substitution(e, var, profondeur)? {
        return Ok(Some(f));
    }
    par_parties(e, var, profondeur)
}

/* ------------------------ Table ------------------------ */

/// Dérivée constante non nulle de u (u linéaire en var), sinon None.
fn pente(u: &Expr, var: &str) -> Result<Option<Expr>> {
    let a = differentiate(u, var, 1)?;
    if a.est_zero() || a.depend_de(var) {
        return Ok(None);
    }
    Ok(Some(a))
}

fn table(e: &Expr, var: &str) -> Result<Option<Expr>> {
    Ok(match e {
        Expr::Sym(_) => Some(Expr::produit(vec![
            Expr::fraction(1, 2),
            Expr::puissance(e.clone(), Expr::entier(2)),
        ])),

        Expr::Pow(b, k) if !k.depend_de(var) => {
            if let Expr::Func(f, u) = b.as_ref() {
                if let Some(r) = puissance_trig(*f, u, k, var)? {
                    return Ok(Some(r));
                }
            }
            match pente(b, var)? {
                Some(a) if k.as_entier() == Some(-1) => {
                    Some(Expr::quotient(Expr::log(b.as_ref().clone()), a))
                }
                Some(a) => {
                    let k1 = Expr::somme(vec![k.as_ref().clone(), Expr::un()]);
                    Some(Expr::quotient(
                        Expr::puissance(b.as_ref().clone(), k1.clone()),
                        Expr::produit(vec![k1, a]),
                    ))
                }
                None => None,
            }
        }

        // b^u, b constant
        Expr::Pow(b, u) if !b.depend_de(var) => pente(u, var)?.map(|a| {
            Expr::quotient(e.clone(), Expr::produit(vec![a, Expr::log(b.as_ref().clone())]))
        }),

        Expr::Func(f, u) => pente(u, var)?.map(|a| {
            let u = u.as_ref().clone();
            let primitive = match f {
                Fonction::Sin => Expr::neg(Expr::cos(u)),
                Fonction::Cos => Expr::sin(u),
                Fonction::Tan => Expr::neg(Expr::log(Expr::cos(u))),
                Fonction::Exp => e.clone(),
                Fonction::Log => {
                    Expr::difference(Expr::produit(vec![u.clone(), Expr::log(u.clone())]), u)
                }
            };
            Expr::quotient(primitive, a)
        }),

        _ => None,
    })
}

/// sin², cos², tan² par l’angle moitié ; cos^-2 -> tan ; sin et cos impairs
/// en polynôme de l’autre fonction.
fn puissance_trig(f: Fonction, u: &Expr, k: &Expr, var: &str) -> Result<Option<Expr>> {
    let Some(k) = k.as_entier() else {
        return Ok(None);
    };
    let Some(a) = pente(u, var)? else {
        return Ok(None);
    };
    let u = u.clone();
    let sin_2u_sur_4 = || {
        Expr::produit(vec![
            Expr::fraction(1, 4),
            Expr::sin(Expr::produit(vec![Expr::entier(2), u.clone()])),
        ])
    };
    let moitie_u = || Expr::produit(vec![Expr::fraction(1, 2), u.clone()]);

    let primitive = match (f, k) {
        (Fonction::Sin, 2) => Expr::difference(moitie_u(), sin_2u_sur_4()),
        (Fonction::Cos, 2) => Expr::somme(vec![moitie_u(), sin_2u_sur_4()]),
        (Fonction::Tan, 2) => Expr::difference(Expr::tan(u.clone()), u.clone()),
        (Fonction::Cos, -2) => Expr::tan(u.clone()),
        (Fonction::Sin | Fonction::Cos, k)
            if k >= 3 && k % 2 == 1 && (k - 1) / 2 <= MAX_DEVELOPPEMENT =>
        {
            puissance_impaire(f, &u, (k - 1) / 2)
        }
        _ => return Ok(None),
    };
    Ok(Some(Expr::quotient(primitive, a)))
}

/// ∫ sin^(2k+1) u du = -∫ (1 - c²)^k dc avec c = cos u (cos : avec sin u, signe +).
fn puissance_impaire(f: Fonction, u: &Expr, k: i64) -> Expr {
    let (autre, signe) = match f {
        Fonction::Sin => (Expr::cos(u.clone()), -1),
        _ => (Expr::sin(u.clone()), 1),
    };
    let mut termes = Vec::with_capacity(k as usize + 1);
    let mut binome: i64 = 1;
    for j in 0..=k {
        let degre = 2 * j + 1;
        let alterne = if j % 2 == 0 { 1 } else { -1 };
        termes.push(Expr::produit(vec![
            Expr::fraction(signe * alterne * binome, degre),
            Expr::puissance(autre.clone(), Expr::entier(degre)),
        ]));
        binome = binome * (k - j) / (j + 1);
    }
    Expr::somme(termes)
}

/* ------------------------ Développement ------------------------ */

/// Développe un produit contenant des sommes, ou une petite puissance entière
/// d’une somme. None si rien à développer ou si trop de termes.
fn developpe(e: &Expr) -> Option<Expr> {
    let facteurs: Vec<Expr> = match e {
        Expr::Mul(v) => v.clone(),
        autre => vec![autre.clone()],
    };

    let mut termes = vec![Expr::un()];
    let mut a_developper = false;
    for f in &facteurs {
        let facteur_termes = match f {
            Expr::Add(v) => {
                a_developper = true;
                v.clone()
            }
            Expr::Pow(b, k) => match (b.as_ref(), k.as_entier()) {
                (Expr::Add(v), Some(k)) if (2..=MAX_DEVELOPPEMENT).contains(&k) => {
                    a_developper = true;
                    let mut acc = vec![Expr::un()];
                    for _ in 0..k {
                        acc = croise(&acc, v)?;
                    }
                    acc
                }
                _ => vec![f.clone()],
            },
            autre => vec![autre.clone()],
        };
        termes = croise(&termes, &facteur_termes)?;
    }

    a_developper.then(|| Expr::somme(termes))
}

fn croise(a: &[Expr], b: &[Expr]) -> Option<Vec<Expr>> {
    if a.len() * b.len() > MAX_TERMES_DEVELOPPES {
        return None;
    }
    Some(
        a.iter()
            .flat_map(|x| b.iter().map(move |y| Expr::produit(vec![x.clone(), y.clone()])))
            .collect(),
    )
}

/* ------------------------ Changement de variable ------------------------ */

fn substitution(e: &Expr, var: &str, profondeur: usize) -> Result<Option<Expr>> {
    let mut candidats = Vec::new();
    candidats_substitution(e, var, &mut candidats);

    for u in candidats {
        let du = differentiate(&u, var, 1)?;
        if du.est_zero() {
            continue;
        }
        // e dx = q(u) du
        let q = match simplify(&Expr::quotient(e.clone(), du)) {
            Ok(q) => q,
            Err(_) => continue,
        };
        let q = q.remplace(&u, &Expr::sym(VAR_SUBSTITUTION));
        if q.depend_de(var) {
            continue;
        }
        if let Some(g) = integre(&q, VAR_SUBSTITUTION, profondeur + 1)? {
            debug!(u = %u, "changement de variable");
            return Ok(Some(g.substitue(VAR_SUBSTITUTION, &u)));
        }
    }
    Ok(None)
}

fn candidats_substitution(e: &Expr, var: &str, out: &mut Vec<Expr>) {
    if out.len() >= MAX_CANDIDATS_SUBSTITUTION {
        return;
    }
    let propose = |c: &Expr, out: &mut Vec<Expr>| {
        if c.depend_de(var) && !c.est_sym(var) && !out.contains(c) {
            out.push(c.clone());
        }
    };
    match e {
        Expr::Add(v) | Expr::Mul(v) => {
            for t in v {
                candidats_substitution(t, var, out);
            }
        }
        Expr::Pow(b, x) => {
            propose(b, out);
            propose(x, out);
            candidats_substitution(b, var, out);
            candidats_substitution(x, var, out);
        }
        Expr::Func(_, u) => {
            propose(e, out);
            propose(u, out);
            candidats_substitution(u, var, out);
        }
        Expr::Nb(_) | Expr::Sym(_) | Expr::Derivee(_, _, _) => {}
    }
    out.truncate(MAX_CANDIDATS_SUBSTITUTION);
}

/* ------------------------ Par parties ------------------------ */

/// Rang de préférence pour le choix de u : log < algébrique < trig < exp.
fn rang_liate(f: &Expr, var: &str) -> u8 {
    match f {
        Expr::Func(Fonction::Log, _) => 0,
        Expr::Sym(_) | Expr::Add(_) => 1,
        Expr::Func(g, _) if g.est_trig() => 2,
        Expr::Func(_, _) => 3,
        Expr::Pow(b, _) if !b.depend_de(var) => 3,
        Expr::Pow(b, _) => match b.as_ref() {
            Expr::Func(_, _) => rang_liate(b, var),
            _ => 1,
        },
        _ => 4,
    }
}

/// ∫u dv = u·v - ∫v du
fn par_parties(e: &Expr, var: &str, profondeur: usize) -> Result<Option<Expr>> {
    let Expr::Mul(facteurs) = e else {
        return Ok(None);
    };

    let mut ordre: Vec<usize> = (0..facteurs.len()).collect();
    ordre.sort_by_key(|&i| rang_liate(&facteurs[i], var));

    for i in ordre {
        let u = &facteurs[i];
        let dv = Expr::produit(
            facteurs
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, f)| f.clone())
                .collect(),
        );
        let Some(v) = integre(&dv, var, profondeur + 1)? else {
            continue;
        };
        let du = differentiate(u, var, 1)?;
        let reste = Expr::produit(vec![v.clone(), du]);
        if let Some(w) = integre(&reste, var, profondeur + 1)? {
            debug!(u = %u, "intégration par parties");
            return Ok(Some(Expr::difference(
                Expr::produit(vec![u.clone(), v]),
                w,
            )));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::lecture::evalue_en;
    use crate::noyau::rpn::parse;

    fn s(txt: &str) -> Expr {
        simplify(&parse(txt).unwrap()).unwrap()
    }

    fn primitive(txt: &str) -> Expr {
        integrate_indefinite(&parse(txt).unwrap(), "x")
            .unwrap_or_else(|| panic!("pas de primitive pour {txt}"))
    }

    /// F' == f après simplification.
    fn verifie(txt: &str) {
        let f = primitive(txt);
        assert_eq!(differentiate(&f, "x", 1).unwrap(), s(txt), "{txt} -> {f}");
    }

    #[test]
    fn table_directe() {
        assert_eq!(primitive("x^3"), s("x^4/4"));
        assert_eq!(primitive("1/x"), s("log(x)"));
        assert_eq!(primitive("5"), s("5x"));
        assert_eq!(primitive("x"), s("x^2/2"));
        assert_eq!(primitive("cos(3x)"), s("sin(3x)/3"));
        assert_eq!(primitive("tan(x)"), s("-log(cos(x))"));
        assert_eq!(primitive("1/cos(x)^2"), Expr::tan(Expr::sym("x")));
    }

    #[test]
    fn derivee_de_la_primitive() {
        for txt in [
            "x^3",
            "exp(2x)",
            "sin(x)",
            "log(x)",
            "log(2x+1)",
            "2^x",
            "x^(1/2)",
            "(2x+1)^4",
            "3x^2 - 4x + 7",
        ] {
            verifie(txt);
        }
    }

    #[test]
    fn developpement() {
        assert_eq!(primitive("(x+1)(x-1)"), s("x^3/3 - x"));
    }

    #[test]
    fn changement_de_variable() {
        assert_eq!(primitive("2x cos(x^2)"), s("sin(x^2)"));
        assert_eq!(primitive("x exp(x^2)"), s("exp(x^2)/2"));
        verifie("sin(x) cos(x)");
    }

    #[test]
    fn par_parties() {
        verifie("x exp(x)");
        verifie("x^2 sin(x)");
        verifie("x log(x)");
    }

    #[test]
    fn sans_primitive() {
        assert_eq!(integrate_indefinite(&parse("exp(x^2)").unwrap(), "x"), None);
    }

    #[test]
    fn definie_exacte() {
        let r = integrate_definite(&parse("x^2").unwrap(), "x", &Expr::zero(), &Expr::un()).unwrap();
        assert_eq!(r.valeur, Expr::fraction(1, 3));
        assert!(!r.approximative);

        let r = integrate_definite(&parse("sin(x)^2").unwrap(), "x", &Expr::zero(), &Expr::pi())
            .unwrap();
        assert_eq!(r.valeur, s("pi/2"));
    }

    #[test]
    fn definie_borne_hors_domaine() {
        // F = x log(x) - x, prolongée en 0 par sa limite à droite
        let r = integrate_definite(&parse("log(x)").unwrap(), "x", &Expr::zero(), &Expr::un())
            .unwrap();
        assert_eq!(r.valeur, Expr::entier(-1));
        assert!(!r.approximative);
    }

    #[test]
    fn puissances_impaires_de_sin_et_cos() {
        // F' = f en quelques points
        for txt in ["sin(x)^3", "cos(x)^3", "sin(2x)^5", "cos(x)^7"] {
            let f = parse(txt).unwrap();
            let d = differentiate(&primitive(txt), "x", 1).unwrap();
            for x in [0.3, 1.1, 2.0] {
                let attendu = evalue_en(&f, "x", x).unwrap();
                let obtenu = evalue_en(&d, "x", x).unwrap();
                assert!((attendu - obtenu).abs() < 1e-9, "{txt} en {x}");
            }
        }

        let r = integrate_definite(&parse("sin(x)^3").unwrap(), "x", &Expr::zero(), &Expr::pi())
            .unwrap();
        assert_eq!(r.valeur, Expr::fraction(4, 3));
        assert!(!r.approximative);

        let r = integrate_definite(&parse("cos(x)^5").unwrap(), "x", &Expr::zero(), &s("pi/2"))
            .unwrap();
        assert_eq!(r.valeur, Expr::fraction(8, 15));
    }

    fn definie(txt: &str, a: Expr, b: Expr) -> Result<Integrale> {
        integrate_definite(&parse(txt).unwrap(), "x", &a, &b)
    }

    #[test]
    fn definie_a_travers_un_pole() {
        assert_eq!(definie("1/x^2", Expr::entier(-1), Expr::un()), Err(CalcError::Divergent));
        assert_eq!(definie("1/x^2", Expr::un(), Expr::entier(-1)), Err(CalcError::Divergent));
        assert_eq!(definie("tan(x)^2 + 1", Expr::zero(), Expr::pi()), Err(CalcError::Divergent));
        assert_eq!(definie("1/x", Expr::entier(-1), Expr::entier(2)), Err(CalcError::Divergent));

        // pôle hors de l’intervalle
        let r = definie("1/x^2", Expr::un(), Expr::entier(2)).unwrap();
        assert_eq!(r.valeur, Expr::fraction(1, 2));
    }

    #[test]
    fn definie_impropre() {
        let r = definie("exp(-x)", Expr::zero(), Expr::infini()).unwrap();
        assert_eq!(r.valeur, Expr::un());
        assert!(!r.approximative);

        let r = definie("1/x^2", Expr::un(), Expr::infini()).unwrap();
        assert_eq!(r.valeur, Expr::un());

        let r = definie("exp(x)", Expr::neg(Expr::infini()), Expr::zero()).unwrap();
        assert_eq!(r.valeur, Expr::un());

        assert_eq!(definie("1/x", Expr::un(), Expr::infini()), Err(CalcError::Divergent));
        assert!(matches!(
            definie("exp(x^2)", Expr::zero(), Expr::infini()),
            Err(CalcError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn definie_approchee() {
        let r = integrate_definite(&parse("exp(x^2)").unwrap(), "x", &Expr::zero(), &Expr::un())
            .unwrap();
        assert!(r.approximative);
        match r.valeur {
            Expr::Nb(n) => assert!((n.to_f64() - 1.462_651_745_907_181_6).abs() < 1e-9),
            autre => panic!("attendu un nombre, obtenu {autre}"),
        }
    }
}
