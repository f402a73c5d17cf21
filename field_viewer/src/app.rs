mod colormap;
mod controls;
mod history;
mod plot;
mod results;
use crate::dialog::Dialog;
use crate::{Language, LocalizableStr};
use egui_dock::{NodeIndex, Tree};
use field_data::config::Config;
use field_data::viewer::{StatusLevel, ViewerState};

/// What survives a restart of the app. The configuration file is not part of
/// it, that one is written on every change.
#[derive(serde::Deserialize, serde::Serialize, Default)]
pub(super) struct Preferences {
    language: Language,
    mode: DarkLightMode,
    tabs: Tabs,
}

pub(super) struct App {
    preferences: Preferences,
    viewer: ViewerState,
    plot: plot::ContourPlot,
}
impl App {
    pub(super) fn new(
        preferences: Preferences,
        config_path: std::path::PathBuf,
        config: Config,
    ) -> Self {
        let mut viewer = ViewerState::new(config_path, config);
        viewer.start_inference();
        Self {
            preferences,
            viewer,
            plot: Default::default(),
        }
    }
    pub(super) fn init(&self, cc: &eframe::CreationContext) {
        cc.egui_ctx.set_visuals(self.preferences.mode.visuals())
    }
    pub(super) fn preferences(&self) -> &Preferences {
        &self.preferences
    }
    pub(super) fn language(&self) -> Language {
        self.preferences.language
    }
    pub(super) fn is_running(&self) -> bool {
        self.viewer.is_running()
    }
    pub(super) fn shutdown(&mut self) {
        self.viewer.cancel_inference();
    }

    pub(super) fn show(&mut self, ui: &mut egui::Ui) -> Vec<AppEvent> {
        let mut events = Vec::new();
        let language = self.preferences.language;
        self.viewer.poll_inference();
        if self.viewer.is_running() {
            ui.ctx()
                .request_repaint_after(std::time::Duration::from_millis(100));
        }
        egui::menu::bar(ui, |ui| {
            ui.menu_button(LocalizableStr { english: "File" }.localize(language), |ui| {
                if ui
                    .button(crate::localization::SELECT_DATA_FILE.localize(language))
                    .clicked()
                {
                    ui.close_menu();
                    events.extend(controls::pick_data_file(&mut self.viewer, language));
                }
                if ui
                    .button(
                        LocalizableStr {
                            english: "Restart inference",
                        }
                        .localize(language),
                    )
                    .clicked()
                {
                    ui.close_menu();
                    self.viewer.start_inference();
                }
                if ui
                    .button(
                        LocalizableStr {
                            english: "Copy plotted values",
                        }
                        .localize(language),
                    )
                    .clicked()
                {
                    ui.close_menu();
                    copy_values(&mut self.viewer);
                }
                ui.separator();
                // dark/light mode switch
                {
                    /// Show small toggle-button for light and dark mode.
                    #[must_use]
                    fn light_dark_small_toggle_button(
                        is_dark_mode: bool,
                        ui: &mut egui::Ui,
                    ) -> Option<DarkLightMode> {
                        let (icon, hover, mode) = if is_dark_mode {
                            ("☀", "Switch to light mode", DarkLightMode::Light)
                        } else {
                            ("🌙", "Switch to dark mode", DarkLightMode::Dark)
                        };
                        if ui
                            .add(egui::Button::new(icon).frame(false))
                            .on_hover_text(hover)
                            .clicked()
                        {
                            ui.close_menu();
                            Some(mode)
                        } else {
                            None
                        }
                    }
                    let is_dark_mode = ui.ctx().style().visuals.dark_mode;
                    if let Some(mode) = light_dark_small_toggle_button(is_dark_mode, ui) {
                        self.preferences.mode = mode;
                        ui.ctx().set_visuals(mode.visuals());
                    }
                }
                // quit button
                {
                    if ui
                        .button(LocalizableStr { english: "Quit" }.localize(language))
                        .clicked()
                    {
                        events.push(AppEvent::CloseRequested);
                        ui.close_menu();
                    }
                }
            });
        });
        egui_dock::DockArea::new(&mut self.preferences.tabs.tabs).show_inside(
            ui,
            &mut AppState {
                language,
                viewer: &mut self.viewer,
                plot: &mut self.plot,
                app_events: &mut events,
            },
        );
        events
    }
}

fn copy_values(viewer: &mut ViewerState) {
    let text = viewer.canvas().to_tsv();
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
        Ok(()) => viewer.report(StatusLevel::Info, "Plotted values copied to the clipboard"),
        Err(err) => viewer.report(
            StatusLevel::Warning,
            format!("Clipboard is not available: {err}"),
        ),
    }
}

#[derive(serde::Deserialize, serde::Serialize)]
enum Tab {
    Contour(controls::ContourTab),
    Results(results::ResultsTab),
    History(history::HistoryTab),
}
trait TabTrait {
    fn title(&self, state: &AppState) -> &str;
    fn show(&mut self, state: &mut AppState, ui: &mut egui::Ui);
}
impl Tab {
    fn title(&self, viewer: &AppState) -> &str {
        match self {
            Tab::Contour(d) => d.title(viewer),
            Tab::Results(d) => d.title(viewer),
            Tab::History(d) => d.title(viewer),
        }
    }
    fn show(&mut self, viewer: &mut AppState, ui: &mut egui::Ui) {
        match self {
            Tab::Contour(d) => d.show(viewer, ui),
            Tab::Results(d) => d.show(viewer, ui),
            Tab::History(d) => d.show(viewer, ui),
        }
    }
}
struct AppState<'a> {
    language: Language,
    viewer: &'a mut ViewerState,
    plot: &'a mut plot::ContourPlot,
    app_events: &'a mut Vec<AppEvent>,
}

impl<'a> egui_dock::TabViewer for AppState<'a> {
    type Tab = Tab;

    fn ui(&mut self, ui: &mut egui_dock::egui::Ui, tab: &mut Self::Tab) {
        tab.show(self, ui)
    }

    fn title(&mut self, tab: &mut Self::Tab) -> egui_dock::egui::WidgetText {
        tab.title(self).into()
    }
}
pub(super) enum AppEvent {
    CloseRequested,
    Dialog(Dialog),
}
#[derive(PartialEq, Default, serde::Deserialize, serde::Serialize, Clone, Copy)]
enum DarkLightMode {
    Dark,
    #[default]
    Light,
}
impl DarkLightMode {
    fn visuals(&self) -> egui::Visuals {
        match self {
            DarkLightMode::Dark => egui::Visuals::dark(),
            DarkLightMode::Light => egui::Visuals::light(),
        }
    }
}
#[derive(serde::Deserialize, serde::Serialize)]
struct Tabs {
    tabs: Tree<Tab>,
}
impl Default for Tabs {
    fn default() -> Self {
        let mut tabs: Tree<Tab> = Tree::new(vec![Tab::Contour(Default::default())]);
        let [_contour, _side] = tabs.split_right(
            NodeIndex::root(),
            0.75,
            vec![
                Tab::Results(Default::default()),
                Tab::History(Default::default()),
            ],
        );
        Self { tabs }
    }
}
