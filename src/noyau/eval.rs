//! Noyau : répartition des opérations d’analyse
//!
//! Requête (champs texte) -> analyse (arbres, entiers) -> opération -> ligne LaTeX
//!
//! Une opération par formulaire : dérivée, primitive, intégrale définie, limite,
//! Taylor, EDO d’ordre 1 et 2, Simpson, volume de révolution, somme de série.
//! La démarche garde les jetons, la RPN et l’entrée avant/après simplification.

use tracing::debug;

use super::bornes::SIMPSON_N_DEFAUT;
use super::derive::differentiate;
use super::edo::{ode1, ode2, SolutionEdo};
use super::erreur::{CalcError, GenreAnalyse, Result};
use super::expr::Expr;
use super::format::render;
use super::integre::{integrate_definite, integrate_indefinite};
use super::jetons::{format_tokens, tokenize};
use super::lecture::evalue_constante;
use super::limite::{limit, Direction};
use super::nombre::format_flottant;
use super::rpn::{format_rpn, from_rpn, parse, to_rpn};
use super::serie::taylor;
use super::simplifie::simplify;
use super::simpson::simpson;
use super::somme::summation;
use super::volume::{inverse, volume_of_revolution, Axe, VAR_IMAGE};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Operation {
    #[default]
    Derivee,
    Integrale,
    IntegraleDefinie,
    Limite,
    Taylor,
    Edo1,
    Edo2,
    Simpson,
    Volume,
    Somme,
}

impl Operation {
    pub const TOUTES: [Operation; 10] = [
        Operation::Derivee,
        Operation::Integrale,
        Operation::IntegraleDefinie,
        Operation::Limite,
        Operation::Taylor,
        Operation::Edo1,
        Operation::Edo2,
        Operation::Simpson,
        Operation::Volume,
        Operation::Somme,
    ];

    pub fn libelle(self) -> &'static str {
        match self {
            Operation::Derivee => "Dérivée",
            Operation::Integrale => "Primitive",
            Operation::IntegraleDefinie => "Intégrale définie",
            Operation::Limite => "Limite",
            Operation::Taylor => "Développement de Taylor",
            Operation::Edo1 => "EDO d’ordre 1 : y' + p(x) y = 0",
            Operation::Edo2 => "EDO d’ordre 2 : y'' + p y' + q y = 0",
            Operation::Simpson => "Méthode de Simpson",
            Operation::Volume => "Volume de révolution",
            Operation::Somme => "Somme de série",
        }
    }

    /// Variable libre de l’expression saisie.
    pub fn variable(self) -> &'static str {
        match self {
            Operation::Somme => "n",
            _ => "x",
        }
    }

    pub fn utilise_bornes(self) -> bool {
        matches!(
            self,
            Operation::IntegraleDefinie | Operation::Simpson | Operation::Volume
        )
    }

    pub fn utilise_point(self) -> bool {
        matches!(self, Operation::Limite | Operation::Taylor)
    }

    pub fn utilise_n(self) -> bool {
        matches!(self, Operation::Taylor | Operation::Simpson)
    }

    pub fn utilise_q(self) -> bool {
        self == Operation::Edo2
    }
}

/// Champs bruts d’un appel (tels que saisis).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Requete {
    pub operation: Operation,
    pub expression: String,
    pub a: String,
    pub b: String,
    pub point: String,
    pub n: String,
    /// Second coefficient de l’EDO d’ordre 2 ; vide : q = p.
    pub q: String,
    /// Côté de la limite ; absent : à droite.
    pub direction: Option<Direction>,
    pub axe: Axe,
}

/// Requête lue : arbres et entiers, champs absents à None.
#[derive(Clone, Debug, PartialEq)]
pub struct RequeteAnalysee {
    pub operation: Operation,
    pub expression: Expr,
    pub a: Option<Expr>,
    pub b: Option<Expr>,
    pub point: Option<Expr>,
    pub n: Option<i64>,
    pub q: Option<Expr>,
    pub direction: Direction,
    pub axe: Axe,
}

#[derive(Default, Clone, Debug)]
pub struct DemarcheNoyau {
    pub jetons: String,
    pub rpn: String,
    pub avant: String,
    pub apres: String,
    pub note: String,
}

#[derive(Clone, Debug)]
pub struct Reponse {
    pub latex: String,
    pub approximative: bool,
    pub demarche: DemarcheNoyau,
}

/// Lit l’expression et les champs utiles à l’opération.
/// Champ requis vide ou illisible : InvalidArgument.
pub fn analyse_requete(r: &Requete) -> Result<RequeteAnalysee> {
    let op = r.operation;
    let expression = parse(&r.expression)?;

    let (a, b) = if op.utilise_bornes() {
        (Some(champ(&r.a, "a")?), Some(champ(&r.b, "b")?))
    } else {
        (None, None)
    };

    let point = match op {
        Operation::Limite => Some(champ(&r.point, "point")?),
        Operation::Taylor => Some(champ_ou(&r.point, "point", Expr::zero())?),
        _ => None,
    };

    let n = match op {
        Operation::Taylor => Some(entier(&r.n, "n")?),
        Operation::Simpson if r.n.trim().is_empty() => Some(SIMPSON_N_DEFAUT),
        Operation::Simpson => Some(entier(&r.n, "n")?),
        _ => None,
    };

    let q = if op.utilise_q() && !r.q.trim().is_empty() {
        Some(champ(&r.q, "q")?)
    } else {
        None
    };

    Ok(RequeteAnalysee {
        operation: op,
        expression,
        a,
        b,
        point,
        n,
        q,
        direction: r.direction.unwrap_or(Direction::Droite),
        axe: r.axe,
    })
}

fn champ(texte: &str, nom: &str) -> Result<Expr> {
    if texte.trim().is_empty() {
        return Err(CalcError::argument(format!("champ « {nom} » manquant")));
    }
    parse(texte).map_err(|e| CalcError::argument(format!("champ « {nom} » : {e}")))
}

fn champ_ou(texte: &str, nom: &str, defaut: Expr) -> Result<Expr> {
    if texte.trim().is_empty() {
        Ok(defaut)
    } else {
        champ(texte, nom)
    }
}

fn entier(texte: &str, nom: &str) -> Result<i64> {
    let t = texte.trim();
    if t.is_empty() {
        return Err(CalcError::argument(format!("champ « {nom} » manquant")));
    }
    t.parse::<i64>()
        .map_err(|_| CalcError::argument(format!("champ « {nom} » : entier attendu")))
}

/// API publique : exécute une requête et retourne la ligne LaTeX + démarche.
pub fn execute(requete: &Requete) -> Result<Reponse> {
    let texte = requete.expression.trim();
    if texte.is_empty() {
        return Err(CalcError::parse(GenreAnalyse::EntreeVide, 0));
    }

    // Démarche : jetons -> RPN -> arbre
    let jetons = tokenize(texte)?;
    let rpn = to_rpn(&jetons)?;
    let brut = from_rpn(&rpn)?;

    let analysee = analyse_requete(requete)?;
    let apres = simplify(&analysee.expression)?;
    debug!(operation = ?analysee.operation, expr = %apres, "requête");

    let (latex, approximative) = calcule(&analysee, &apres)?;

    let demarche = DemarcheNoyau {
        jetons: format_tokens(&jetons),
        rpn: format_rpn(&rpn),
        avant: render(&brut),
        apres: render(&apres),
        note: format!(
            "Pipeline : jetons → RPN → arbre → simplification → {}.",
            analysee.operation.libelle()
        ),
    };

    Ok(Reponse {
        latex,
        approximative,
        demarche,
    })
}

/// Ligne LaTeX de l’opération ; true si la valeur est approchée.
fn calcule(r: &RequeteAnalysee, f: &Expr) -> Result<(String, bool)> {
    let var = r.operation.variable();
    let tf = render(f);

    let ligne = match r.operation {
        Operation::Derivee => {
            let d = differentiate(f, var, 1)?;
            format!("\\frac{{d}}{{d{var}}}\\left({tf}\\right) = {}", render(&d))
        }

        Operation::Integrale => {
            let primitive = integrate_indefinite(f, var)
                .ok_or_else(|| CalcError::non_supportee(format!("pas de primitive connue pour {f}")))?;
            format!("\\int {} \\, d{var} = {} + C", groupe(f), render(&primitive))
        }

        Operation::IntegraleDefinie => {
            let (a, b) = bornes(r)?;
            let res = integrate_definite(f, var, a, b)?;
            let signe = relation(res.approximative);
            return Ok((
                format!(
                    "\\int_{{{}}}^{{{}}} {} \\, d{var} {signe} {}",
                    render(a),
                    render(b),
                    groupe(f),
                    render(&res.valeur)
                ),
                res.approximative,
            ));
        }

        Operation::Limite => {
            let p = requis(&r.point, "point")?;
            let l = limit(f, var, p, r.direction)?;
            let cote = match r.direction {
                Direction::Gauche => "^{-}",
                Direction::Droite => "^{+}",
                Direction::DeuxCotes => "",
            };
            format!(
                "\\lim_{{{var} \\to {}{cote}}} {} = {}",
                render(&simplify(p)?),
                groupe(f),
                render(&l)
            )
        }

        Operation::Taylor => {
            let c = requis(&r.point, "point")?;
            let n = requis(&r.n, "n")?;
            let t = taylor(f, var, c, *n)?;
            format!("T_{{{n}}}\\left({tf}, {}\\right) = {}", render(&simplify(c)?), render(&t))
        }

        Operation::Edo1 => ligne_edo(&ode1(f, var)?, var),

        Operation::Edo2 => {
            // coefficient unique : q = p
            let q = match &r.q {
                Some(q) => simplify(q)?,
                None => f.clone(),
            };
            ligne_edo(&ode2(f, &q, var)?, var)
        }

        Operation::Simpson => {
            let (a, b) = bornes(r)?;
            let n = requis(&r.n, "n")?;
            let fa = evalue_constante(a).map_err(|_| CalcError::argument("borne a non numérique"))?;
            let fb = evalue_constante(b).map_err(|_| CalcError::argument("borne b non numérique"))?;
            let v = simpson(f, var, fa, fb, *n)?;
            return Ok((
                format!(
                    "\\int_{{{}}}^{{{}}} {} \\, d{var} \\approx {}",
                    render(a),
                    render(b),
                    groupe(f),
                    format_flottant(v)
                ),
                true,
            ));
        }

        Operation::Volume => {
            let (a, b) = bornes(r)?;
            let res = volume_of_revolution(f, var, a, b, r.axe)?;
            let (rayon, dv) = match r.axe {
                Axe::X => (f.clone(), var),
                Axe::Y => (inverse(f, var, VAR_IMAGE)?, VAR_IMAGE),
            };
            let signe = relation(res.approximative);
            return Ok((
                format!(
                    "V = \\pi \\int_{{{}}}^{{{}}} \\left({}\\right)^{{2}} \\, d{dv} {signe} {}",
                    render(a),
                    render(b),
                    render(&rayon),
                    render(&res.valeur)
                ),
                res.approximative,
            ));
        }

        Operation::Somme => {
            let s = summation(f, var)?;
            format!("\\sum_{{{var}=1}}^{{\\infty}} {} = {}", groupe(f), render(&s))
        }
    };
    Ok((ligne, false))
}

fn ligne_edo(sol: &SolutionEdo, var: &str) -> String {
    format!(
        "{} = 0 \\Rightarrow y({var}) = {}",
        render(&sol.equation),
        render(&sol.forme_generale)
    )
}

fn requis<'a, T>(champ: &'a Option<T>, nom: &str) -> Result<&'a T> {
    champ
        .as_ref()
        .ok_or_else(|| CalcError::argument(format!("champ « {nom} » manquant")))
}

fn bornes(r: &RequeteAnalysee) -> Result<(&Expr, &Expr)> {
    Ok((requis(&r.a, "a")?, requis(&r.b, "b")?))
}

fn relation(approximative: bool) -> &'static str {
    if approximative {
        "\\approx"
    } else {
        "="
    }
}

/// Somme sous un signe ∫, lim ou Σ : entre parenthèses.
fn groupe(e: &Expr) -> String {
    match e {
        Expr::Add(_) => format!("\\left({}\\right)", render(e)),
        _ => render(e),
    }
}
