#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
// hide console window on Windows in release
mod app;
mod confirm_exit;
mod dialog;
mod localization;
pub use localization::{Language, LocalizableStr};

use clap::Parser;
use eframe::egui;
use field_data::config::Config;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about = "Contour viewer for temperature and concentration fields", long_about = None)]
struct Cli {
    /// YAML configuration; the chosen data file is written back into it
    #[arg(short, long, default_value = "config/cfg_demo.yml")]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = Config::load(&cli.config).map_err(|err| {
        log::error!("cannot start without configuration: {err}");
        err
    })?;

    let [x, y, width, height] = config.window.size;
    let options = eframe::NativeOptions {
        initial_window_pos: Some(egui::pos2(x as f32, y as f32)),
        initial_window_size: Some(egui::vec2(width as f32, height as f32)),
        icon_data: config.window.icon.as_deref().and_then(load_icon),
        ..Default::default()
    };
    let title = config.window.name.clone();
    let config_path = cli.config;
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Box::new(Visualizer::new(cc, config_path, config))),
    )?;
    Ok(())
}

fn load_icon(path: &Path) -> Option<eframe::IconData> {
    match image::open(path) {
        Ok(icon) => {
            let icon = icon.into_rgba8();
            let (width, height) = icon.dimensions();
            Some(eframe::IconData {
                rgba: icon.into_raw(),
                width,
                height,
            })
        }
        Err(err) => {
            log::warn!("window icon {path:?} not loaded: {err}");
            None
        }
    }
}

struct Visualizer {
    dialogs: dialog::DialogWidget,
    confirm_exit: confirm_exit::ConfirmExit,
    body: app::App,
}

impl Visualizer {
    fn new(cc: &eframe::CreationContext, config_path: PathBuf, config: Config) -> Self {
        let preferences: app::Preferences = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        let body = app::App::new(preferences, config_path, config);
        body.init(cc);
        Self {
            dialogs: Default::default(),
            confirm_exit: confirm_exit::ConfirmExit::new(body.language()),
            body,
        }
    }
}

impl eframe::App for Visualizer {
    fn on_close_event(&mut self) -> bool {
        if let Some(dialog) = self.confirm_exit.close_event(self.body.is_running()) {
            self.dialogs.push(dialog);
        }
        let close = self.confirm_exit.shall_be_closed();
        if close {
            self.body.shutdown();
        }
        close
    }

    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        if self.confirm_exit.shall_be_closed() {
            frame.close()
        }
        let dialogs_are_done = self.dialogs.progress(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.set_enabled(dialogs_are_done);
            let events = self.body.show(ui);
            for event in events {
                match event {
                    app::AppEvent::CloseRequested => {
                        if let Some(dialog) = self.confirm_exit.close_event(self.body.is_running())
                        {
                            self.dialogs.push(dialog);
                        }
                    }
                    app::AppEvent::Dialog(dialog) => self.dialogs.push(dialog),
                }
            }
        });
    }

    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self.body.preferences());
    }
}
