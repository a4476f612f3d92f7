//! src/app/etat.rs
//!
//! État UI (sans vue, sans calcul).
//!
//! Rôle : contenir la requête en cours (opération + champs), le résultat LaTeX,
//! l’erreur et la démarche, et offrir des opérations simples (C/CLR/AC).
//!
//! Contrats :
//! - Aucune évaluation ici (le noyau est appelé par la vue).
//! - Actions déterministes, sans effet de bord caché.

use crate::noyau::{Direction, Operation, Requete};

/// Ordre de Taylor proposé par défaut.
pub const N_DEFAUT: i64 = 5;

/// Bornes proposées pour les intégrales et volumes.
pub const BORNES_DEFAUT: (&str, &str) = ("0", "1");

#[derive(Clone, Default, Debug)]
pub struct Demarche {
    pub jetons: String,
    pub rpn: String,
    pub avant: String,
    pub apres: String,
    pub note: String,
}

#[derive(Clone, Debug)]
pub struct AppCalc {
    // --- entrée utilisateur ---
    pub requete: Requete,

    // --- sorties ---
    pub resultat: String,    // ligne LaTeX
    pub approximative: bool, // valeur issue de Simpson
    pub erreur: String,

    // --- démarche (panneau d’explication) ---
    pub demarche: Demarche,

    // --- UX ---
    pub focus_entree: bool,
}

impl Default for AppCalc {
    fn default() -> Self {
        let mut app = Self {
            requete: Requete::default(),
            resultat: String::new(),
            approximative: false,
            erreur: String::new(),
            demarche: Demarche::default(),
            focus_entree: true,
        };
        app.champs_par_defaut();
        app
    }
}

impl AppCalc {
    /* ------------------------ Actions “boutons” (état seulement) ------------------------ */

    /// AC : remise à zéro totale (opération et champs par défaut).
    pub fn reset_total(&mut self) {
        *self = Self::default();
    }

    /// C : effacer seulement l’expression.
    pub fn clear_entree(&mut self) {
        self.requete.expression.clear();
        self.focus_entree = true;
    }

    /// CLR : effacer résultat + erreur + démarche.
    pub fn clear_resultats(&mut self) {
        self.resultat.clear();
        self.approximative = false;
        self.erreur.clear();
        self.demarche = Demarche::default();
        self.focus_entree = true;
    }

    /// Changement d’opération : les anciens résultats ne s’appliquent plus.
    pub fn choisir_operation(&mut self, op: Operation) {
        if op == self.requete.operation {
            return;
        }
        self.requete.operation = op;
        self.champs_par_defaut();
        self.clear_resultats();
    }

    /// Remplit les champs vides utiles à l’opération.
    fn champs_par_defaut(&mut self) {
        let r = &mut self.requete;
        let op = r.operation;
        if op.utilise_bornes() {
            if r.a.is_empty() {
                r.a = BORNES_DEFAUT.0.to_string();
            }
            if r.b.is_empty() {
                r.b = BORNES_DEFAUT.1.to_string();
            }
        }
        if op.utilise_point() && r.point.is_empty() {
            r.point = "0".to_string();
        }
        if op == Operation::Limite && r.direction.is_none() {
            r.direction = Some(Direction::Droite);
        }
        if op == Operation::Taylor && r.n.is_empty() {
            r.n = N_DEFAUT.to_string();
        }
    }

    /// On CONSERVE le dernier résultat : une faute n’efface pas l’écran.
    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.demarche = Demarche::default();
        self.focus_entree = true;
    }

    pub fn set_resultats(&mut self, latex: impl Into<String>, approximative: bool, demarche: Demarche) {
        self.erreur.clear();
        self.resultat = latex.into();
        self.approximative = approximative;
        self.demarche = demarche;
        self.focus_entree = true;
    }
}
