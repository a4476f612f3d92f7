// src/app/vue.rs
//
// Vue (UI egui) : natif + web
// ---------------------------
// Objectifs :
// - Même AppCalc (etat.rs) pour natif + wasm
// - Opération choisie dans une liste, champs affichés selon l’opération
// - Clavier : Enter calcule (quand un champ a le focus)
// - Résultat LaTeX, marqueur ≈ si la valeur vient de Simpson
//
// Note :
// - PAS de Key::NumEnter (n’existe pas dans egui 0.33.x)

use eframe::egui;
use tracing::debug;

use super::etat::{AppCalc, Demarche};
use crate::noyau::{execute, Axe, Direction, Operation};

impl AppCalc {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Calculatrice Q-pur (analyse)");
                ui.add_space(6.0);

                self.ui_operation(ui);
                ui.add_space(6.0);
                self.ui_entree(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_resultats(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_demarche(ui);
            });
    }

    fn ui_operation(&mut self, ui: &mut egui::Ui) {
        let mut choisie = self.requete.operation;
        egui::ComboBox::from_id_salt("operation")
            .selected_text(choisie.libelle())
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                for op in Operation::TOUTES {
                    ui.selectable_value(&mut choisie, op, op.libelle());
                }
            });
        self.choisir_operation(choisie);
    }

    fn ui_entree(&mut self, ui: &mut egui::Ui) {
        let op = self.requete.operation;
        let mut valider = false;

        let (titre, indice) = match op {
            Operation::Edo1 | Operation::Edo2 => ("p(x) :", "Ex: 3, 2x"),
            Operation::Somme => ("u(n) :", "Ex: 1/n^2, (1/2)^n, 1/(n(n+1))"),
            _ => ("f(x) :", "Ex: x^2 sin(x), exp(-x), log(2x+1)"),
        };
        ui.label(titre);
        let resp = ui.add(
            egui::TextEdit::singleline(&mut self.requete.expression)
                .desired_width(ui.available_width())
                .hint_text(indice)
                .id_salt("entree_edit")
                .code_editor(),
        );
        if self.focus_entree {
            resp.request_focus();
            self.focus_entree = false;
        }
        valider |= Self::enter(ui, &resp);

        if op.utilise_q() {
            valider |= Self::champ(ui, "q (vide : q = p) :", "q_edit", &mut self.requete.q);
        }
        if op.utilise_bornes() {
            ui.horizontal(|ui| {
                valider |= Self::champ(ui, "a :", "a_edit", &mut self.requete.a);
                valider |= Self::champ(ui, "b :", "b_edit", &mut self.requete.b);
            });
        }
        if op.utilise_point() {
            let titre = if op == Operation::Taylor { "centre :" } else { "x → " };
            valider |= Self::champ(ui, titre, "point_edit", &mut self.requete.point);
        }
        if op.utilise_n() {
            let titre = if op == Operation::Taylor {
                "ordre n :"
            } else {
                "n (pair, vide : 1000) :"
            };
            valider |= Self::champ(ui, titre, "n_edit", &mut self.requete.n);
        }

        if op == Operation::Limite {
            ui.horizontal(|ui| {
                let d = &mut self.requete.direction;
                ui.radio_value(d, Some(Direction::DeuxCotes), "des deux côtés");
                ui.radio_value(d, Some(Direction::Gauche), "à gauche (⁻)");
                ui.radio_value(d, Some(Direction::Droite), "à droite (⁺)");
            });
        }
        if op == Operation::Volume {
            ui.horizontal(|ui| {
                ui.label("axe :");
                ui.radio_value(&mut self.requete.axe, Axe::X, "x");
                ui.radio_value(&mut self.requete.axe, Axe::Y, "y");
            });
        }

        ui.add_space(6.0);

        ui.horizontal(|ui| {
            // Contrat: C = expression seulement ; CLR = résultats seulement ; AC = tout
            self.bouton_action(ui, "C", "Efface seulement l’expression", Action::ClearEntree);
            self.bouton_action(
                ui,
                "CLR",
                "Efface résultat + erreur + démarche",
                Action::ClearResultats,
            );
            self.bouton_action(ui, "AC", "Remise à zéro totale", Action::ResetTotal);

            ui.add_space(10.0);

            if ui.add_sized([96.0, 30.0], egui::Button::new("Calculer")).clicked() {
                valider = true;
            }
        });

        if valider {
            self.calcule_via_noyau();
        }

        if !self.erreur.is_empty() {
            ui.add_space(6.0);
            ui.colored_label(ui.visuals().error_fg_color, &self.erreur);
        }
    }

    /// Champ secondaire sur une ligne ; true si Enter y a été pressé.
    fn champ(ui: &mut egui::Ui, titre: &str, id: &str, texte: &mut String) -> bool {
        ui.horizontal(|ui| {
            ui.label(titre);
            let resp = ui.add(
                egui::TextEdit::singleline(texte)
                    .desired_width(120.0)
                    .id_salt(id)
                    .code_editor(),
            );
            Self::enter(ui, &resp)
        })
        .inner
    }

    /// Enter seulement pour le champ qui vient de l’avoir.
    fn enter(ui: &egui::Ui, resp: &egui::Response) -> bool {
        (resp.has_focus() || resp.lost_focus()) && ui.input(|i| i.key_pressed(egui::Key::Enter))
    }

    fn ui_resultats(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Résultat (LaTeX) :");
            if self.approximative {
                ui.label("≈ valeur approchée (Simpson)");
            }
        });
        Self::champ_monospace(ui, "resultat_out", &self.resultat, 2);
    }

    fn ui_demarche(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Démarche")
            .default_open(false)
            .show(ui, |ui| {
                Self::champ_demarche(ui, "Jetons", "demarche_jetons", &self.demarche.jetons);
                Self::champ_demarche(ui, "RPN", "demarche_rpn", &self.demarche.rpn);
                Self::champ_demarche(ui, "Avant", "demarche_avant", &self.demarche.avant);
                Self::champ_demarche(ui, "Après", "demarche_apres", &self.demarche.apres);
                Self::champ_demarche(ui, "Note", "demarche_note", &self.demarche.note);
            });
    }

    fn champ_demarche(ui: &mut egui::Ui, titre: &str, id: &str, contenu: &str) {
        ui.add_space(4.0);
        ui.label(format!("{titre} :"));
        Self::champ_monospace(ui, id, contenu, 2);
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
        // Affichage lecture seule, sans TextEdit interactif.
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.monospace(contenu);
                });
            });
    }

    fn bouton_action(&mut self, ui: &mut egui::Ui, label: &str, tip: &str, action: Action) {
        let resp = ui
            .add_sized([56.0, 30.0], egui::Button::new(label))
            .on_hover_text(tip);

        if resp.clicked() {
            match action {
                Action::ClearEntree => self.clear_entree(),
                Action::ClearResultats => self.clear_resultats(),
                Action::ResetTotal => self.reset_total(),
            }
            self.focus_entree = true;
        }
    }

    /// Exécute la requête via le noyau, puis dépose résultat/démarche dans l’état UI.
    fn calcule_via_noyau(&mut self) {
        debug!(operation = ?self.requete.operation, expression = %self.requete.expression, "calcul");
        match execute(&self.requete) {
            Ok(rep) => {
                let d = rep.demarche;
                let d_ui = Demarche {
                    jetons: d.jetons,
                    rpn: d.rpn,
                    avant: d.avant,
                    apres: d.apres,
                    note: d.note,
                };
                self.set_resultats(rep.latex, rep.approximative, d_ui);
            }
            Err(e) => self.set_erreur(e.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    ClearEntree,
    ClearResultats,
    ResetTotal,
}
