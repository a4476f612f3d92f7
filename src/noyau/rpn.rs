// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> arbre
//
// Règles:
// - Ident(name):
//    - fonction (sin, cos, tan, exp, log, ln, sqrt) => opérateur unaire collé à sa parenthèse
//    - sinon => symbole (x, y, n, pi, e, oo)
// - Moins unaire : '-' quand on n’attend PAS d’opérateur devient Neg.
//   Neg lie plus fort que * et / mais moins que ^ : -x^2 = -(x^2), 2^-x = 2^(-x).
// - '+' unaire est ignoré.
//
// Toute erreur porte la position du jeton fautif.

use super::erreur::{CalcError, GenreAnalyse, Result};
use super::expr::{Expr, Fonction};
use super::jetons::{is_fonction_ident, tokenize, Jeton, Tok};

fn precedence(t: &Tok) -> i32 {
    match t {
        Tok::Plus | Tok::Minus => 1,
        Tok::Star | Tok::Slash => 2,
        Tok::Neg => 3,
        Tok::Caret => 4,
        _ => 0,
    }
}

fn is_right_associative(t: &Tok) -> bool {
    matches!(t, Tok::Caret | Tok::Neg)
}

fn est_fonction(t: &Tok) -> bool {
    matches!(t, Tok::Ident(name) if is_fonction_ident(name))
}

fn inattendu(position: usize) -> CalcError {
    CalcError::parse(GenreAnalyse::JetonInattendu, position)
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   jetons: sin ( pi / 2 )
///   rpn:    pi 2 / sin
pub fn to_rpn(jetons: &[Jeton]) -> Result<Vec<Jeton>> {
    let mut out: Vec<Jeton> = Vec::new();
    let mut ops: Vec<Jeton> = Vec::new();

    // “valeur” = un atome ou une expression fermée.
    let mut prev_was_value = false;

    for (k, j) in jetons.iter().enumerate() {
        match &j.tok {
            Tok::Ident(_) if est_fonction(&j.tok) => {
                // fonction : doit être suivie de '('
                if prev_was_value || !matches!(jetons.get(k + 1).map(|s| &s.tok), Some(Tok::LPar)) {
                    return Err(inattendu(j.position));
                }
                ops.push(j.clone());
                prev_was_value = false;
            }

            Tok::Num(_) | Tok::Ident(_) => {
                if prev_was_value {
                    return Err(inattendu(j.position));
                }
                out.push(j.clone());
                prev_was_value = true;
            }

            Tok::LPar => {
                if prev_was_value {
                    return Err(inattendu(j.position));
                }
                ops.push(j.clone());
                prev_was_value = false;
            }

            Tok::RPar => {
                if !prev_was_value {
                    // "()" ou "(2+)"
                    return Err(inattendu(j.position));
                }
                let mut ferme = false;
                while let Some(top) = ops.pop() {
                    if matches!(top.tok, Tok::LPar) {
                        ferme = true;
                        break;
                    }
                    out.push(top);
                }
                if !ferme {
                    return Err(CalcError::parse(
                        GenreAnalyse::ParenthesesDesequilibrees,
                        j.position,
                    ));
                }

                // si une fonction est au sommet, on la sort aussi
                if ops.last().is_some_and(|top| est_fonction(&top.tok)) {
                    if let Some(f) = ops.pop() {
                        out.push(f);
                    }
                }

                prev_was_value = true;
            }

            Tok::Plus if !prev_was_value => {
                // '+' unaire : neutre
            }

            Tok::Minus if !prev_was_value => {
                // Neg est unaire préfixe : rien à dépiler
                ops.push(Jeton {
                    tok: Tok::Neg,
                    position: j.position,
                });
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Caret => {
                if !prev_was_value {
                    return Err(inattendu(j.position));
                }
                depile_operateurs(&j.tok, &mut ops, &mut out);
                ops.push(j.clone());
                prev_was_value = false;
            }

            Tok::Neg => return Err(inattendu(j.position)),
        }
    }

    if !prev_was_value {
        // "2+" ou entrée réduite à des opérateurs
        let position = jetons.last().map_or(0, |j| j.position + 1);
        return Err(inattendu(position));
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        if matches!(op.tok, Tok::LPar) {
            return Err(CalcError::parse(
                GenreAnalyse::ParenthesesDesequilibrees,
                op.position,
            ));
        }
        out.push(op);
    }

    Ok(out)
}

/// Dépile tant que:
/// - on n'est pas bloqué par '('
/// - on ne traverse pas une fonction (elle reste collée à son argument)
/// - la précédence/associativité exige de sortir l'opérateur du haut
fn depile_operateurs(tok: &Tok, ops: &mut Vec<Jeton>, out: &mut Vec<Jeton>) {
    while let Some(top) = ops.last() {
        if matches!(top.tok, Tok::LPar) || est_fonction(&top.tok) {
            break;
        }

        let p_top = precedence(&top.tok);
        let p_tok = precedence(tok);

        let doit_pop = if is_right_associative(tok) {
            p_top > p_tok
        } else {
            p_top >= p_tok
        };

        if !doit_pop {
            break;
        }
        if let Some(op) = ops.pop() {
            out.push(op);
        }
    }
}

/// Construit un arbre à partir d’une RPN (constructeurs bruts, sans simplification).
pub fn from_rpn(rpn: &[Jeton]) -> Result<Expr> {
    let mut st: Vec<Expr> = Vec::new();

    for j in rpn {
        let manque = || inattendu(j.position);
        match &j.tok {
            Tok::Num(n) => st.push(Expr::Nb(n.clone())),

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Caret => {
                let b = st.pop().ok_or_else(manque)?;
                let a = st.pop().ok_or_else(manque)?;

                let e = match j.tok {
                    Tok::Plus => Expr::somme(vec![a, b]),
                    Tok::Minus => Expr::difference(a, b),
                    Tok::Star => Expr::produit(vec![a, b]),
                    Tok::Slash => Expr::quotient(a, b),
                    _ => Expr::puissance(a, b),
                };
                st.push(e);
            }

            Tok::Neg => {
                let a = st.pop().ok_or_else(manque)?;
                st.push(Expr::neg(a));
            }

            Tok::Ident(name) if is_fonction_ident(name) => {
                let x = st.pop().ok_or_else(manque)?;
                let e = match Fonction::depuis_nom(name) {
                    Some(f) => Expr::func(f, x),
                    None => Expr::racine(x),
                };
                st.push(e);
            }

            Tok::Ident(name) => st.push(Expr::sym(name)),

            Tok::LPar | Tok::RPar => return Err(inattendu(j.position)),
        }
    }

    let resultat = st.pop().ok_or_else(|| inattendu(0))?;
    if !st.is_empty() {
        return Err(inattendu(0));
    }
    Ok(resultat)
}

/// Texte -> arbre brut (jetons -> RPN -> arbre).
pub fn parse(texte: &str) -> Result<Expr> {
    if texte.trim().is_empty() {
        return Err(CalcError::parse(GenreAnalyse::EntreeVide, 0));
    }
    let jetons = tokenize(texte)?;
    let rpn = to_rpn(&jetons)?;
    from_rpn(&rpn)
}

/// Format utilitaire (démarche) : RPN en texte.
pub fn format_rpn(rpn: &[Jeton]) -> String {
    super::jetons::format_tokens(rpn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Result<Expr> {
        parse(s)
    }

    fn x() -> Expr {
        Expr::sym("x")
    }

    #[test]
    fn rpn_de_base() {
        let rpn = to_rpn(&tokenize("sin(pi/2)").unwrap()).unwrap();
        assert_eq!(format_rpn(&rpn), "π 2 / sin");
    }

    #[test]
    fn moins_unaire_sous_la_puissance() {
        // -x^2 = -(x^2)
        assert_eq!(
            lit("-x^2").unwrap(),
            Expr::neg(Expr::puissance(x(), Expr::entier(2)))
        );
        // 2^-x
        assert_eq!(
            lit("2^-x").unwrap(),
            Expr::puissance(Expr::entier(2), Expr::neg(x()))
        );
        // 2*-3
        assert_eq!(
            lit("2*-3").unwrap(),
            Expr::produit(vec![Expr::entier(2), Expr::entier(-3)])
        );
    }

    #[test]
    fn puissance_associative_a_droite() {
        assert_eq!(
            lit("2^3^2").unwrap(),
            Expr::puissance(
                Expr::entier(2),
                Expr::puissance(Expr::entier(3), Expr::entier(2))
            )
        );
    }

    #[test]
    fn alias_et_racine() {
        assert_eq!(lit("ln(x)").unwrap(), Expr::log(x()));
        assert_eq!(lit("sqrt(x)").unwrap(), Expr::racine(x()));
        assert_eq!(lit("√(x)").unwrap(), Expr::racine(x()));
    }

    #[test]
    fn parentheses_desequilibrees() {
        assert_eq!(
            lit("(x+1"),
            Err(CalcError::parse(GenreAnalyse::ParenthesesDesequilibrees, 0))
        );
        assert_eq!(
            lit("x+1)"),
            Err(CalcError::parse(GenreAnalyse::ParenthesesDesequilibrees, 3))
        );
    }

    #[test]
    fn entree_vide() {
        assert_eq!(
            lit("   "),
            Err(CalcError::parse(GenreAnalyse::EntreeVide, 0))
        );
    }

    #[test]
    fn produits_implicites() {
        let deux_x = Expr::produit(vec![Expr::entier(2), x()]);
        assert_eq!(lit("2x").unwrap(), deux_x);
        assert_eq!(
            lit("2(x+1)").unwrap(),
            Expr::produit(vec![Expr::entier(2), Expr::somme(vec![x(), Expr::un()])])
        );
    }

    #[test]
    fn jetons_inattendus() {
        assert!(matches!(
            lit("()"),
            Err(CalcError::Parse {
                genre: GenreAnalyse::JetonInattendu,
                ..
            })
        ));
        assert!(matches!(
            lit("2+"),
            Err(CalcError::Parse {
                genre: GenreAnalyse::JetonInattendu,
                position: 2
            })
        ));
        assert!(matches!(
            lit("2 3"),
            Err(CalcError::Parse {
                genre: GenreAnalyse::JetonInattendu,
                position: 2
            })
        ));
        // fonction sans parenthèse
        assert!(matches!(
            lit("sin x"),
            Err(CalcError::Parse {
                genre: GenreAnalyse::JetonInattendu,
                position: 0
            })
        ));
    }
}
