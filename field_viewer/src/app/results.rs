use crate::LocalizableStr;
use egui_extras::{Column, TableBuilder};
use field_data::Matrix;

const ROW_HEIGHT: f32 = 18.;

/// Finished steps of the current inference run; a click plots a step.
#[derive(serde::Deserialize, serde::Serialize, Default)]
pub struct ResultsTab {}
impl super::TabTrait for ResultsTab {
    fn title(&self, state: &super::AppState) -> &str {
        LocalizableStr { english: "Results" }.localize(state.language)
    }

    fn show(&mut self, state: &mut super::AppState, ui: &mut egui::Ui) {
        let language = state.language;
        let show = LocalizableStr { english: "Show" }.localize(language);
        let viewer = &mut *state.viewer;
        if viewer.results().filled_count() == 0 {
            ui.label(
                LocalizableStr {
                    english: "No results yet",
                }
                .localize(language),
            );
            return;
        }
        let mut to_show = None;
        TableBuilder::new(ui)
            .columns(Column::auto().resizable(true), 4)
            .striped(true)
            .header(ROW_HEIGHT, |mut header| {
                for title in [
                    crate::localization::TIME_STEP,
                    crate::localization::TEMPERATURE,
                    crate::localization::CONCENTRATION,
                    LocalizableStr { english: "" },
                ] {
                    header.col(|ui| {
                        ui.strong(title.localize(language));
                    });
                }
            })
            .body(|mut body| {
                for (step, pair) in viewer.results().iter_filled() {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui| {
                            ui.label(step.to_string());
                        });
                        row.col(|ui| {
                            ui.label(range_text(&pair.temperature));
                        });
                        row.col(|ui| {
                            ui.label(range_text(&pair.concentration));
                        });
                        row.col(|ui| {
                            if ui.small_button(show).clicked() {
                                to_show = Some(step);
                            }
                        });
                    });
                }
            });
        if let Some(step) = to_show {
            if viewer.show_result(step) {
                log::debug!("showing result of step {step}");
            }
        }
    }
}

fn range_text(matrix: &Matrix) -> String {
    match matrix.range() {
        Some((min, max)) => format!("{min:.3} .. {max:.3}"),
        None => "-".into(),
    }
}
