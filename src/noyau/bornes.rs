// src/noyau/bornes.rs
//
// Garde-fous du noyau (anti-gel) : toutes les récursions et itérations sont bornées.
// Dépasser une borne donne CalcError::UnsupportedOperation (ou InvalidArgument pour
// un paramètre utilisateur), jamais une boucle infinie.

/// Profondeur maximale d’un arbre (et des descentes récursives).
pub const MAX_PROFONDEUR: usize = 256;

/// Garde-fou sur les parcours itératifs (nombre de noeuds visités).
pub const MAX_NOEUDS: usize = 200_000;

/// Passes de simplification avant de déclarer la non-convergence.
pub const MAX_PASSES_SIMPLIFY: usize = 32;

/// Ordre de dérivation accepté.
pub const MAX_ORDRE_DERIVATION: u32 = 64;

/// Ordre de Taylor accepté.
pub const MAX_ORDRE_TAYLOR: i64 = 40;

/// Exposant entier au-delà duquel on ne calcule plus la puissance exacte.
pub const MAX_EXPOSANT: i64 = 4096;

/// Profondeur de l’intégration (substitution + parties imbriquées).
pub const MAX_PROFONDEUR_INTEGRATION: usize = 4;

/// Nombre de candidats u essayés par la substitution.
pub const MAX_CANDIDATS_SUBSTITUTION: usize = 16;

/// Puissance entière maximale d’une somme développée.
pub const MAX_DEVELOPPEMENT: i64 = 8;

/// Nombre maximal de termes produits par un développement.
pub const MAX_TERMES_DEVELOPPES: usize = 128;

/// Singularités intérieures examinées par intégrale définie.
pub const MAX_SINGULARITES: usize = 64;

/// Applications de L’Hôpital par calcul de limite.
pub const MAX_LHOPITAL: usize = 8;

/// Sous-intervalles de Simpson quand l’intégrale définie n’a pas de primitive.
pub const SIMPSON_N_DEFAUT: i64 = 1000;

/// Sous-intervalles de Simpson acceptés au plus.
pub const MAX_SIMPSON_N: i64 = 1_000_000;

/// Écart relatif pour l’analyse de signe d’une approche unilatérale.
pub const EPSILON_APPROCHE: f64 = 1e-7;

/// Tolérance numérique (comparaisons de valeurs finies).
pub const TOLERANCE: f64 = 1e-12;
