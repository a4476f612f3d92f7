// src/noyau/format.rs
//
// Rendu LaTeX (mode mathématique) d’un arbre.
// - parenthèses \left( \right) seulement quand la priorité l’exige
// - sommes : degré décroissant, constantes en dernier, « - » pour les termes négatifs
// - produits : \frac{}{} pour les puissances négatives et les coefficients fractionnaires,
//   « 2x » sans espace, \cdot devant un chiffre
// - √ pour l’exposant 1/2, exp(u) -> e^{u}, sin(u)^2 -> \sin^{2}{\left(u \right)}

use std::cmp::Ordering;

use num_traits::One;

use super::canon::oppose_si_negatif;
use super::expr::{Expr, Fonction, E, INFINI, PI};
use super::nombre::{format_flottant, Nombre};

pub fn render(e: &Expr) -> String {
    rend(e, 0)
}

/* ------------------------ Priorités ------------------------ */

/// 1 somme / négatif, 2 produit, 3 puissance, 4 atome.
fn priorite(e: &Expr) -> u8 {
    match e {
        Expr::Add(_) => 1,
        Expr::Nb(n) if n.is_negative() => 1,
        Expr::Mul(_) if oppose_si_negatif(e).is_some() => 1,
        Expr::Mul(_) | Expr::Derivee(_, _, _) => 2,
        Expr::Nb(Nombre::Rat(r)) if !r.is_integer() => 2,
        Expr::Pow(_, k) if k.as_nombre().is_some_and(|n| n.is_negative() || est_demi(n)) => 4,
        Expr::Pow(_, _) | Expr::Func(Fonction::Exp, _) => 3,
        _ => 4,
    }
}

fn rend(e: &Expr, min: u8) -> String {
    let s = rend_nu(e);
    if priorite(e) < min {
        format!("\\left({s}\\right)")
    } else {
        s
    }
}

fn rend_nu(e: &Expr) -> String {
    match e {
        Expr::Nb(n) => nombre(n),
        Expr::Sym(s) => symbole(s),
        Expr::Add(v) => somme(v),
        Expr::Mul(v) => produit(v),
        Expr::Pow(b, k) => puissance(b, k),
        Expr::Func(f, u) => fonction(*f, u),
        Expr::Derivee(c, v, n) => {
            if *n == 1 {
                format!("\\frac{{d}}{{d {v}}} {}", rend(c, 2))
            } else {
                format!("\\frac{{d^{{{n}}}}}{{d {v}^{{{n}}}}} {}", rend(c, 2))
            }
        }
    }
}

/* ------------------------ Feuilles ------------------------ */

fn nombre(n: &Nombre) -> String {
    match n {
        Nombre::Rat(r) if r.is_integer() => r.numer().to_string(),
        Nombre::Rat(r) => {
            let signe = if n.is_negative() { "-" } else { "" };
            let num = r.numer().magnitude().to_string();
            format!("{signe}\\frac{{{num}}}{{{}}}", r.denom())
        }
        Nombre::Flot(v) => format_flottant(*v),
    }
}

fn symbole(s: &str) -> String {
    match s {
        PI => "\\pi".to_string(),
        INFINI => "\\infty".to_string(),
        E => "e".to_string(),
        _ => match constante_indicee(s) {
            Some((lettre, indice)) => format!("{lettre}_{{{indice}}}"),
            None => s.to_string(),
        },
    }
}

/// « C1 » -> ('C', "1")
fn constante_indicee(s: &str) -> Option<(char, &str)> {
    let mut car = s.chars();
    let lettre = car.next().filter(char::is_ascii_uppercase)?;
    let indice = car.as_str();
    (!indice.is_empty() && indice.chars().all(|c| c.is_ascii_digit())).then_some((lettre, indice))
}

fn est_demi(n: &Nombre) -> bool {
    *n == Nombre::fraction(1, 2)
}

/* ------------------------ Somme ------------------------ */

fn somme(v: &[Expr]) -> String {
    let mut termes: Vec<&Expr> = v.iter().collect();
    termes.sort_by(|a, b| ordre_affichage(a, b));

    let mut s = String::new();
    for (i, t) in termes.iter().enumerate() {
        match oppose_si_negatif(t) {
            Some(pos) if i > 0 => {
                s.push_str(" - ");
                s.push_str(&rend(&pos, 2));
            }
            _ => {
                if i > 0 {
                    s.push_str(" + ");
                }
                s.push_str(&rend(t, 1));
            }
        }
    }
    s
}

/// Termes variables d’abord, par degré décroissant ; constantes en dernier.
fn ordre_affichage(a: &Expr, b: &Expr) -> Ordering {
    let va = est_variable(a);
    let vb = est_variable(b);
    vb.cmp(&va).then_with(|| degre(b).total_cmp(&degre(a)))
}

fn symbole_constant(s: &str) -> bool {
    s == PI || s == E || s == INFINI || constante_indicee(s).is_some()
}

fn est_variable(e: &Expr) -> bool {
    match e {
        Expr::Nb(_) => false,
        Expr::Sym(s) => !symbole_constant(s),
        Expr::Add(v) | Expr::Mul(v) => v.iter().any(est_variable),
        Expr::Pow(b, k) => est_variable(b) || est_variable(k),
        Expr::Func(_, u) => est_variable(u),
        Expr::Derivee(_, _, _) => true,
    }
}

fn degre(e: &Expr) -> f64 {
    match e {
        Expr::Sym(s) if !symbole_constant(s) => 1.0,
        Expr::Pow(b, k) => match k.as_nombre() {
            Some(n) => degre(b) * n.to_f64(),
            None => degre(b),
        },
        Expr::Mul(v) => v.iter().map(degre).sum(),
        Expr::Add(v) => v.iter().map(degre).fold(0.0, f64::max),
        // y'' avant y' avant y
        Expr::Derivee(_, _, n) => 1.0 + f64::from(*n),
        _ => 0.0,
    }
}

/* ------------------------ Produit ------------------------ */

fn produit(v: &[Expr]) -> String {
    let e = Expr::Mul(v.to_vec());
    if let Some(pos) = oppose_si_negatif(&e) {
        return format!("-{}", rend(&pos, 2));
    }

    let mut num: Vec<String> = Vec::new();
    let mut den: Vec<String> = Vec::new();
    for f in v {
        match f {
            Expr::Nb(Nombre::Rat(r)) => {
                if !r.numer().is_one() {
                    num.push(r.numer().to_string());
                }
                if !r.denom().is_one() {
                    den.push(r.denom().to_string());
                }
            }
            Expr::Pow(b, k) if k.as_nombre().is_some_and(Nombre::is_negative) => {
                let oppose = k.as_nombre().map(Nombre::neg).unwrap_or_else(Nombre::un);
                den.push(rend(&Expr::puissance(b.as_ref().clone(), Expr::Nb(oppose)), 2));
            }
            autre => num.push(rend(autre, 2)),
        }
    }

    let haut = if num.is_empty() {
        "1".to_string()
    } else {
        joint(&num)
    };
    if den.is_empty() {
        haut
    } else {
        format!("\\frac{{{haut}}}{{{}}}", joint(&den))
    }
}

/// Juxtaposition : « 2x », « x y », « 2 \cdot 3^{x} ».
fn joint(facteurs: &[String]) -> String {
    let mut s = String::new();
    for (i, f) in facteurs.iter().enumerate() {
        if i > 0 {
            let precedent = &facteurs[i - 1];
            if f.starts_with(|c: char| c.is_ascii_digit()) {
                s.push_str(" \\cdot ");
            } else if !(est_entier_ecrit(precedent) && f.starts_with(|c: char| c.is_ascii_alphabetic())) {
                s.push(' ');
            }
        }
        s.push_str(f);
    }
    s
}

fn est_entier_ecrit(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/* ------------------------ Puissance, fonctions ------------------------ */

fn puissance(b: &Expr, k: &Expr) -> String {
    if let Some(n) = k.as_nombre() {
        if n.is_negative() {
            let positive = Expr::puissance(b.clone(), Expr::Nb(n.neg()));
            return format!("\\frac{{1}}{{{}}}", rend(&positive, 0));
        }
        if est_demi(n) {
            return format!("\\sqrt{{{}}}", rend(b, 0));
        }
    }
    if let Expr::Func(f, u) = b {
        if f.est_trig() && k.as_entier().is_some() {
            return format!(
                "\\{}^{{{}}}{{\\left({} \\right)}}",
                f.nom(),
                rend(k, 0),
                rend(u, 0)
            );
        }
    }
    format!("{}^{{{}}}", rend(b, 4), rend(k, 0))
}

fn fonction(f: Fonction, u: &Expr) -> String {
    match f {
        Fonction::Exp => format!("e^{{{}}}", rend(u, 0)),
        _ => format!("\\{}{{\\left({} \\right)}}", f.nom(), rend(u, 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::rpn::parse;
    use crate::noyau::simplifie::simplify;

    fn r(txt: &str) -> String {
        render(&simplify(&parse(txt).unwrap()).unwrap())
    }

    #[test]
    fn lineaire_sans_espace() {
        assert_eq!(render(&parse("2x+3").unwrap()), "2x + 3");
        assert_eq!(r("2x+3"), "2x + 3");
    }

    #[test]
    fn polynome_ordonne() {
        assert_eq!(r("1 - 3x + x^2"), "x^{2} - 3x + 1");
        assert_eq!(r("x y"), "x y");
    }

    #[test]
    fn fractions_et_racines() {
        assert_eq!(r("sin(x)/x"), "\\frac{\\sin{\\left(x \\right)}}{x}");
        assert_eq!(r("sqrt(2)/2"), "\\frac{\\sqrt{2}}{2}");
        assert_eq!(r("x^2/2"), "\\frac{x^{2}}{2}");
        assert_eq!(r("1/x"), "\\frac{1}{x}");
        assert_eq!(render(&Expr::fraction(-1, 2)), "-\\frac{1}{2}");
    }

    #[test]
    fn fonctions_et_puissances() {
        assert_eq!(r("exp(2x)"), "e^{2x}");
        assert_eq!(r("sin(x)^2"), "\\sin^{2}{\\left(x \\right)}");
        assert_eq!(r("(x+1)^2"), "\\left(x + 1\\right)^{2}");
        assert_eq!(r("2*3^x"), "2 \\cdot 3^{x}");
        assert_eq!(r("log(x)"), "\\log{\\left(x \\right)}");
    }

    #[test]
    fn symboles_speciaux() {
        assert_eq!(render(&Expr::pi()), "\\pi");
        assert_eq!(render(&Expr::neg(Expr::infini())), "-\\infty");
        let c1 = Expr::produit(vec![
            Expr::sym("C1"),
            Expr::exp(Expr::Mul(vec![Expr::entier(-3), Expr::sym("x")])),
        ]);
        assert_eq!(render(&c1), "C_{1} e^{-3x}");
    }

    #[test]
    fn derivee_affichee() {
        let d = Expr::derivee(Expr::sym("y"), "x", 2);
        assert_eq!(render(&d), "\\frac{d^{2}}{d x^{2}} y");
        let d1 = Expr::derivee(Expr::sym("y"), "x", 1);
        assert_eq!(render(&d1), "\\frac{d}{d x} y");
    }
}
