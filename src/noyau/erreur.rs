// src/noyau/erreur.rs
//
// Taxonomie des erreurs du noyau.
// - Parse : entrée mal formée (avec position)
// - Domain / InvalidArgument : erreurs utilisateur (division par zéro, n impair…)
// - UnsupportedOde, SummationUnknown, Divergent, NotInvertible, LimitUndefined :
//   limites du moteur (“ne sait pas résoudre”), jamais un plantage
// - UnsupportedOperation : garde-fou (bornes de récursion épuisées)

use std::fmt;

use thiserror::Error;

/// Genre d’erreur de lecture (tokenisation / RPN).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenreAnalyse {
    EntreeVide,
    JetonInattendu,
    ParenthesesDesequilibrees,
    IdentifiantInconnu,
}

impl fmt::Display for GenreAnalyse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GenreAnalyse::EntreeVide => "entrée vide",
            GenreAnalyse::JetonInattendu => "jeton inattendu",
            GenreAnalyse::ParenthesesDesequilibrees => "parenthèses déséquilibrées",
            GenreAnalyse::IdentifiantInconnu => "identifiant inconnu",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum CalcError {
    #[error("{genre} (position {position})")]
    Parse { genre: GenreAnalyse, position: usize },

    #[error("domaine : {0}")]
    Domain(String),

    #[error("argument invalide : {0}")]
    InvalidArgument(String),

    #[error("équation différentielle non supportée : {0}")]
    UnsupportedOde(String),

    #[error("somme inconnue : aucune forme close dans la table")]
    SummationUnknown,

    #[error("série divergente")]
    Divergent,

    #[error("pas d’inverse en forme close")]
    NotInvertible,

    #[error("limite indéfinie")]
    LimitUndefined,

    #[error("opération non supportée : {0}")]
    UnsupportedOperation(String),
}

pub type Result<T> = std::result::Result<T, CalcError>;

impl CalcError {
    pub fn parse(genre: GenreAnalyse, position: usize) -> Self {
        CalcError::Parse { genre, position }
    }

    pub fn domaine(msg: impl Into<String>) -> Self {
        CalcError::Domain(msg.into())
    }

    pub fn argument(msg: impl Into<String>) -> Self {
        CalcError::InvalidArgument(msg.into())
    }

    pub fn non_supportee(msg: impl Into<String>) -> Self {
        CalcError::UnsupportedOperation(msg.into())
    }

    /// Limite du moteur (“ne sait pas résoudre”), par opposition à une entrée fautive.
    pub fn est_limitation(&self) -> bool {
        matches!(
            self,
            CalcError::UnsupportedOde(_)
                | CalcError::SummationUnknown
                | CalcError::Divergent
                | CalcError::NotInvertible
                | CalcError::LimitUndefined
                | CalcError::UnsupportedOperation(_)
        )
    }
}
