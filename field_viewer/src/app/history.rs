use crate::LocalizableStr;
use field_data::viewer::StatusLevel;

#[derive(serde::Deserialize, serde::Serialize, Default)]
pub struct HistoryTab {}
impl super::TabTrait for HistoryTab {
    fn title(&self, state: &super::AppState) -> &str {
        LocalizableStr { english: "Log" }.localize(state.language)
    }

    fn show(&mut self, state: &mut super::AppState, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for message in state.viewer.status_history() {
                    let color = match message.level {
                        StatusLevel::Info => ui.visuals().text_color(),
                        StatusLevel::Warning => ui.visuals().warn_fg_color,
                        StatusLevel::Error => ui.visuals().error_fg_color,
                    };
                    ui.colored_label(color, message.text.as_str());
                }
            });
    }
}
