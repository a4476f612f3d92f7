//! Noyau d’analyse (calcul formel)
//!
//! Organisation interne :
//! - nombre.rs / expr.rs / canon.rs : rationnels exacts, arbre, ordre canonique
//! - jetons.rs / rpn.rs             : tokenisation, shunting-yard -> arbre
//! - simplifie.rs                   : forme canonique (trig.rs, identites_trig.rs)
//! - derive.rs / integre.rs         : dérivation, primitives et intégrales définies
//! - limite.rs / serie.rs           : limites (L’Hôpital), Taylor
//! - lecture.rs / simpson.rs        : évaluation f64, règle de Simpson
//! - edo.rs / somme.rs / volume.rs  : EDO linéaires, séries, solides de révolution
//! - format.rs                      : rendu LaTeX
//! - eval.rs                        : une requête -> une ligne LaTeX + démarche
//! - bornes.rs / erreur.rs          : garde-fous, erreurs

pub mod bornes;
pub mod canon;
pub mod derive;
pub mod edo;
pub mod erreur;
pub mod eval;
pub mod expr;
pub mod format;
pub mod identites_trig;
pub mod integre;
pub mod jetons;
pub mod lecture;
pub mod limite;
pub mod nombre;
pub mod rpn;
pub mod serie;
pub mod simplifie;
pub mod simpson;
pub mod somme;
pub mod trig;
pub mod volume;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique
pub use derive::differentiate;
pub use edo::{ode1, ode2, SolutionEdo};
pub use erreur::{CalcError, Result};
pub use eval::{analyse_requete, execute, DemarcheNoyau, Operation, Reponse, Requete};
pub use expr::Expr;
pub use format::render;
pub use integre::{integrate_definite, integrate_indefinite, Integrale};
pub use limite::{limit, Direction};
pub use rpn::parse;
pub use serie::taylor;
pub use simplifie::simplify;
pub use simpson::simpson;
pub use somme::summation;
pub use volume::{volume_of_revolution, Axe};
