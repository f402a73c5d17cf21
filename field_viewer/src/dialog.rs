use crate::localization::OK;
use crate::{Language, LocalizableStr};
use eframe::egui;

/// Modal window with a row of buttons. A button action returning `true`
/// closes the dialog.
pub(super) struct Dialog {
    title: String,
    content: Box<dyn FnMut(&mut egui::Ui) -> bool>,
    buttons: Vec<Button>,
    /// Button triggered by the window's close cross, if there is one.
    exit_button: Option<usize>,
    is_open: bool,
    requested_focus: bool,
}

pub struct Button {
    pub label: String,
    pub action: Box<dyn Fn() -> bool>,
}
impl Button {
    #[must_use]
    fn show(&self, ui: &mut egui::Ui, requested_focus: &mut bool) -> bool {
        let button = ui.button(&self.label);
        if !*requested_focus {
            button.request_focus();
            *requested_focus = true;
        }
        if button.clicked() {
            (self.action)()
        } else {
            false
        }
    }
}

impl Dialog {
    pub(super) fn new(
        title: String,
        content: Box<dyn FnMut(&mut egui::Ui) -> bool>,
        buttons: Vec<Button>,
        exit_button: Option<usize>,
    ) -> Self {
        debug_assert!(!buttons.is_empty(), "Dialog without buttons is not allowed");
        debug_assert!(exit_button.map_or(true, |i| i < buttons.len()));
        Self {
            title,
            content,
            buttons,
            exit_button,
            is_open: true,
            requested_focus: false,
        }
    }

    /// Shows an error text with a single "Ok" button.
    pub(super) fn error(title: LocalizableStr, message: String, language: Language) -> Self {
        Self::new(
            title.localize(language).to_string(),
            Box::new(move |ui| {
                ui.colored_label(ui.visuals().error_fg_color, message.as_str());
                false
            }),
            vec![Button {
                label: OK.localize(language).to_string(),
                action: Box::new(|| true),
            }],
            Some(0),
        )
    }

    #[must_use]
    fn show_buttons(&mut self, ui: &mut egui::Ui) -> bool {
        let Self {
            buttons,
            requested_focus,
            ..
        } = self;
        ui.horizontal(|ui| {
            for button in buttons.iter() {
                if button.show(ui, requested_focus) {
                    return true;
                }
            }
            false
        })
        .inner
    }

    fn close(&self) -> bool {
        match self.exit_button.and_then(|i| self.buttons.get(i)) {
            Some(Button { label: _, action }) => action(),
            None => true,
        }
    }
}

#[derive(Default)]
pub(super) struct DialogWidget {
    dialogs: std::collections::VecDeque<Dialog>,
    current_dialog: Option<Dialog>,
}

impl DialogWidget {
    pub(super) fn push(&mut self, dialog: Dialog) {
        self.dialogs.push_back(dialog)
    }

    /// Shows the current dialog; returns `true` once no dialog is pending.
    pub(super) fn progress(&mut self, ctx: &egui::Context) -> bool {
        if self.current_dialog.is_none() && !self.dialogs.is_empty() {
            self.current_dialog = self.dialogs.pop_front();
        }
        let dialogs_are_done = if let Some(dialog) = self.current_dialog.as_mut() {
            let mut is_open = dialog.is_open;
            let window = egui::Window::new(dialog.title.as_str())
                .collapsible(false)
                .auto_sized()
                .resizable(false)
                .pivot(egui::Align2::CENTER_CENTER)
                .default_pos(ctx.input(|x| x.screen_rect()).center());
            let window = if dialog.exit_button.is_some() {
                window.open(&mut is_open)
            } else {
                window
            };
            let shown = window.show(ctx, |ui| {
                let content_is_done = (dialog.content)(ui);
                content_is_done || dialog.show_buttons(ui)
            });
            dialog.is_open = is_open;
            match shown.and_then(|response| response.inner) {
                Some(dialog_is_completed) => dialog_is_completed,
                // the close cross was clicked
                None => dialog.close(),
            }
        } else {
            true
        };
        if dialogs_are_done {
            self.current_dialog = None;
        }
        dialogs_are_done
    }
}
