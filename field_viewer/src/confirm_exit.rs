use crate::localization::{CANCEL, OK};
use crate::{Language, LocalizableStr};

/// Asks before closing the window while the inference is still running.
pub(super) struct ConfirmExit {
    close_is_allowed: bool,
    open_dialog: Option<std::sync::mpsc::Receiver<bool>>,
    title: String,
    question: String,
    label_ok: String,
    label_cancel: String,
}
impl ConfirmExit {
    pub(super) fn new(language: Language) -> Self {
        Self {
            close_is_allowed: false,
            open_dialog: None,
            title: LocalizableStr { english: "Close?" }
                .localize(language)
                .into(),
            question: LocalizableStr {
                english: "The inference is still running. Close the viewer anyway?",
            }
            .localize(language)
            .into(),
            label_ok: OK.localize(language).into(),
            label_cancel: CANCEL.localize(language).into(),
        }
    }

    /// Nothing to confirm if no inference is running.
    pub(super) fn close_event(&mut self, inference_running: bool) -> Option<super::dialog::Dialog> {
        use crate::dialog::*;
        if self.close_is_allowed || self.open_dialog.is_some() {
            None
        } else if !inference_running {
            self.close_is_allowed = true;
            None
        } else {
            let (sender1, receiver) = std::sync::mpsc::channel();
            let question = self.question.clone();
            let sender2 = sender1.clone();
            let dialog = Dialog::new(
                self.title.clone(),
                Box::new(move |ui| {
                    ui.label(&question);
                    false
                }),
                vec![
                    Button {
                        label: self.label_cancel.clone(),
                        action: Box::new(move || {
                            let _ = sender1.send(false);
                            true
                        }),
                    },
                    Button {
                        label: self.label_ok.clone(),
                        action: Box::new(move || {
                            let _ = sender2.send(true);
                            true
                        }),
                    },
                ],
                Some(0),
            );
            self.open_dialog = Some(receiver);
            Some(dialog)
        }
    }

    pub(super) fn shall_be_closed(&mut self) -> bool {
        use std::sync::mpsc::*;
        if let Some(dialog) = self.open_dialog.take() {
            match dialog.try_recv() {
                Ok(close_is_allowed) => {
                    self.close_is_allowed |= close_is_allowed;
                }
                Err(TryRecvError::Disconnected) => {}
                Err(TryRecvError::Empty) => {
                    self.open_dialog = Some(dialog);
                }
            }
        }
        self.close_is_allowed
    }
}
