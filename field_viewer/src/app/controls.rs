use super::AppEvent;
use crate::dialog::Dialog;
use crate::localization::{CURRENT_DATA_FILE, SELECT_DATA_FILE, TIME_STEP};
use crate::{Language, LocalizableStr};
use field_data::viewer::{RunState, ViewerState};

/// Room kept below the plot for the slider and the progress bar.
const CONTROLS_HEIGHT: f32 = 80.;

/// Asks for a new data file and writes it into the configuration. A failed
/// write is reported as an error dialog.
pub(super) fn pick_data_file(viewer: &mut ViewerState, language: Language) -> Option<AppEvent> {
    let mut dialog = rfd::FileDialog::new()
        .set_title(SELECT_DATA_FILE.localize(language))
        .add_filter("Text Files", &["txt"])
        .add_filter("All Files", &["*"]);
    let current = viewer.resolved_data_path();
    if let Some(directory) = current.parent().filter(|p| p.is_dir()) {
        dialog = dialog.set_directory(directory);
    }
    let path = dialog.pick_file()?;
    match viewer.set_data_path(path) {
        Ok(()) => None,
        Err(err) => Some(AppEvent::Dialog(Dialog::error(
            LocalizableStr {
                english: "Configuration not saved",
            },
            err.to_string(),
            language,
        ))),
    }
}

#[derive(serde::Deserialize, serde::Serialize, Default)]
pub struct ContourTab {}
impl super::TabTrait for ContourTab {
    fn title(&self, state: &super::AppState) -> &str {
        LocalizableStr { english: "Contour" }.localize(state.language)
    }

    fn show(&mut self, state: &mut super::AppState, ui: &mut egui::Ui) {
        let language = state.language;
        // data file
        ui.horizontal(|ui| {
            ui.label(CURRENT_DATA_FILE.localize(language));
            ui.monospace(state.viewer.data_path().display().to_string());
            if ui.button(SELECT_DATA_FILE.localize(language)).clicked() {
                state
                    .app_events
                    .extend(pick_data_file(state.viewer, language));
            }
        });
        ui.separator();
        let plot_height = (ui.available_height() - CONTROLS_HEIGHT).max(120.);
        ui.allocate_ui(egui::vec2(ui.available_width(), plot_height), |ui| {
            state.plot.show(ui, state.viewer.canvas(), language)
        });
        // time step
        ui.horizontal(|ui| {
            let slider = state.viewer.slider();
            let mut value = state.viewer.slider_value();
            ui.label(TIME_STEP.localize(language));
            let response = ui.add(
                egui::Slider::new(&mut value, slider.min()..=slider.max()).integer(),
            );
            if response.changed() {
                state.viewer.on_slider_changed(value);
            }
        });
        // inference progress
        ui.horizontal(|ui| {
            let steps = state.viewer.num_points();
            let done = state.viewer.completed_steps();
            let fraction = if steps == 0 {
                1.
            } else {
                done as f32 / steps as f32
            };
            let state_text = match state.viewer.run_state() {
                RunState::Idle => "idle",
                RunState::Running => "running",
                RunState::Completed => "completed",
                RunState::Cancelled => "cancelled",
            };
            ui.add(
                egui::ProgressBar::new(fraction)
                    .desired_width(ui.available_width() * 0.6)
                    .text(format!("{done}/{steps}")),
            );
            ui.label(state_text);
        });
        if let Some(status) = state.viewer.last_status() {
            ui.label(status.text.as_str());
        }
    }
}
