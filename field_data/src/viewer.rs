//! State behind the main window.
//!
//! The GUI only draws what is in here and forwards user input; everything the
//! window reacts to (worker events, slider moves, a new data file) is handled
//! by [`ViewerState`].
use crate::config::Config;
use crate::contour::ContourCanvas;
use crate::inference::{
    DemoFileStep, InferenceEvent, InferenceSettings, InferenceWorker, StepFunction,
};
use crate::results::{ResultsBuffer, SliderRange};
use crate::sample::MeasurementPair;
use crate::Result;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

pub struct ViewerState {
    config_path: PathBuf,
    config: Config,
    results: ResultsBuffer,
    slider: SliderRange,
    slider_value: usize,
    progress: u8,
    run_state: RunState,
    worker: Option<InferenceWorker>,
    canvas: ContourCanvas,
    status: Vec<StatusMessage>,
}

impl ViewerState {
    /// Starts with an all-zero plot; nothing is read yet.
    pub fn new(config_path: PathBuf, config: Config) -> Self {
        let mut canvas = ContourCanvas::default();
        canvas.plot(&MeasurementPair::zeros());
        let slider = config.slider_range();
        Self {
            results: ResultsBuffer::new(config.time_steps),
            slider_value: slider.min(),
            slider,
            config_path,
            config,
            progress: 0,
            run_state: RunState::Idle,
            worker: None,
            canvas,
            status: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
    pub fn data_path(&self) -> &Path {
        self.config.data_path()
    }
    /// The data file to read; a relative path is taken from the directory of
    /// the configuration file.
    pub fn resolved_data_path(&self) -> PathBuf {
        let path = self.config.data_path();
        match self.config_path.parent() {
            Some(directory) if path.is_relative() => directory.join(path),
            _ => path.to_path_buf(),
        }
    }
    pub fn canvas(&self) -> &ContourCanvas {
        &self.canvas
    }
    pub fn results(&self) -> &ResultsBuffer {
        &self.results
    }
    pub fn slider(&self) -> SliderRange {
        self.slider
    }
    pub fn slider_value(&self) -> usize {
        self.slider_value
    }
    pub fn run_state(&self) -> RunState {
        self.run_state
    }
    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }
    pub fn num_points(&self) -> usize {
        self.config.time_steps
    }
    pub fn progress_percent(&self) -> u8 {
        self.progress
    }
    /// Progress mapped onto `[0, num_points]`.
    pub fn completed_steps(&self) -> usize {
        (self.progress as f64 * self.num_points() as f64 / 100.).round() as usize
    }
    pub fn status_history(&self) -> &[StatusMessage] {
        &self.status
    }
    pub fn last_status(&self) -> Option<&StatusMessage> {
        self.status.last()
    }

    pub fn report(&mut self, level: StatusLevel, text: impl Into<String>) {
        let text = text.into();
        match level {
            StatusLevel::Info => log::info!("{text}"),
            StatusLevel::Warning => log::warn!("{text}"),
            StatusLevel::Error => log::error!("{text}"),
        }
        self.status.push(StatusMessage { level, text });
    }

    pub fn inference_settings(&self) -> InferenceSettings {
        InferenceSettings {
            num_points: self.config.time_steps,
            delay: self.config.step_delay(),
        }
    }

    /// (Re)starts the simulated inference on the configured data file.
    pub fn start_inference(&mut self) {
        let step = DemoFileStep::new(self.resolved_data_path());
        self.start_inference_with(step);
    }

    /// Cancels a running sequence, clears the old results and starts anew.
    pub fn start_inference_with<S: StepFunction>(&mut self, step_function: S) {
        self.cancel_inference();
        self.results = ResultsBuffer::new(self.config.time_steps);
        self.slider = self.config.slider_range();
        self.slider_value = self.slider.clamp(self.slider_value);
        self.progress = 0;
        self.run_state = RunState::Running;
        self.worker = Some(InferenceWorker::spawn(
            self.inference_settings(),
            step_function,
        ));
    }

    pub fn cancel_inference(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.cancel();
            if self.run_state == RunState::Running {
                self.run_state = RunState::Cancelled;
            }
        }
    }

    /// Handles whatever the worker sent since the last call.
    /// Returns whether anything arrived.
    pub fn poll_inference(&mut self) -> bool {
        let (events, finished): (Vec<InferenceEvent>, bool) = match &self.worker {
            // checked first, a finished thread has nothing left to send
            Some(worker) => {
                let finished = worker.is_finished();
                (worker.try_events().collect(), finished)
            }
            None => return false,
        };
        let any = !events.is_empty();
        for event in events {
            self.on_inference_event(event);
        }
        if finished && self.run_state == RunState::Running {
            self.run_state = RunState::Cancelled;
            self.report(StatusLevel::Error, "Inference stopped unexpectedly");
        }
        if matches!(self.run_state, RunState::Completed | RunState::Cancelled) {
            self.worker = None;
        }
        any
    }

    pub fn on_inference_event(&mut self, event: InferenceEvent) {
        match event {
            InferenceEvent::Result { pair, step } => {
                self.canvas.plot(&pair);
                self.results.store(step, pair);
                if self.slider.extend_to(step) {
                    log::debug!("slider maximum raised to {step}");
                }
            }
            InferenceEvent::Progress(percent) => self.progress = percent.min(100),
            InferenceEvent::StepFailed { step, message } => self.report(
                StatusLevel::Warning,
                format!("Time step {step} has no valid data: {message}"),
            ),
            InferenceEvent::Completed => {
                self.run_state = RunState::Completed;
                self.report(StatusLevel::Info, "Inference completed");
            }
            InferenceEvent::Cancelled => self.run_state = RunState::Cancelled,
        }
    }

    /// The slider value is recorded, but the plot is refreshed from the
    /// configured data file, not from the cached step results.
    pub fn on_slider_changed(&mut self, value: usize) {
        self.slider_value = self.slider.clamp(value);
        if let Err(err) = self.reload() {
            self.report(
                StatusLevel::Warning,
                format!("Failed to read {:?}: {err}", self.resolved_data_path()),
            );
        }
    }

    /// Reads the configured data file and plots it.
    pub fn reload(&mut self) -> Result<()> {
        let pair = MeasurementPair::read(self.resolved_data_path())?;
        self.canvas.plot(&pair);
        Ok(())
    }

    /// Plots a cached step result. Returns `false` if there is none.
    pub fn show_result(&mut self, step: usize) -> bool {
        match self.results.get(step) {
            Some(pair) => {
                self.canvas.plot(pair);
                true
            }
            None => false,
        }
    }

    /// Points the configuration at a new data file and writes it to disk
    /// right away. On a write failure the new path is kept in memory and the
    /// file on disk stays as it was.
    pub fn set_data_path(&mut self, path: PathBuf) -> Result<()> {
        self.config.set_data_path(path);
        match self.config.save(&self.config_path) {
            Ok(()) => {
                self.report(
                    StatusLevel::Info,
                    format!("Configuration updated: {:?}", self.config.data_path()),
                );
                Ok(())
            }
            Err(err) => {
                self.report(StatusLevel::Error, err.to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::DEMO;
    use crate::sample::Matrix;
    use crate::Error;
    use std::time::Duration;

    fn state_in(dir: &Path) -> ViewerState {
        let config_path = dir.join("cfg_demo.yml");
        std::fs::write(&config_path, DEMO).unwrap();
        let mut config = Config::load(&config_path).unwrap();
        config.set_data_path(dir.join("demo_output.txt"));
        config.inference = Some(crate::config::InferenceSection { delay_ms: 0 });
        ViewerState::new(config_path, config)
    }

    fn pair_with(value: f64) -> MeasurementPair {
        let mut pair = MeasurementPair::zeros();
        pair.temperature = Matrix::from_values(15, 15, vec![value; 225]).unwrap();
        pair
    }

    fn run_to_end(state: &mut ViewerState) {
        for _ in 0..1000 {
            state.poll_inference();
            if !state.is_running() {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("inference did not finish");
    }

    #[test]
    fn starts_with_zero_plot() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());
        assert_eq!(state.canvas().color_bar_count(), 2);
        assert_eq!(state.run_state(), RunState::Idle);
        assert_eq!(state.results().len(), 10);
        assert_eq!(state.completed_steps(), 0);
    }

    #[test]
    fn results_fill_buffer_and_progress() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        state.start_inference_with(|step: usize| -> Result<MeasurementPair> {
            Ok(pair_with(step as f64))
        });
        run_to_end(&mut state);
        assert_eq!(state.run_state(), RunState::Completed);
        assert_eq!(state.results().filled_count(), 10);
        assert_eq!(state.progress_percent(), 100);
        assert_eq!(state.completed_steps(), 10);
        let bar = state.canvas().panels()[0].color_bar().unwrap();
        // last result had the value 9 everywhere
        assert_eq!(bar.levels.first(), Some(&8.5));
        assert_eq!(state.slider().max(), 10);
    }

    #[test]
    fn late_step_extends_slider() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        state.on_inference_event(InferenceEvent::Result {
            pair: pair_with(1.),
            step: 14,
        });
        assert_eq!(state.slider().max(), 14);
        assert!(state.results().get(14).is_some());
        assert!(state.show_result(14));
        assert!(!state.show_result(3));
    }

    #[test]
    fn failed_steps_are_reported_not_plotted() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        let generation = state.canvas().generation();
        state.start_inference_with(|step: usize| -> Result<MeasurementPair> {
            Err(Error::Shape {
                expected: 450,
                found: step,
            })
        });
        run_to_end(&mut state);
        assert_eq!(state.canvas().generation(), generation);
        assert_eq!(state.results().filled_count(), 0);
        let warnings = state
            .status_history()
            .iter()
            .filter(|m| m.level == StatusLevel::Warning)
            .count();
        assert_eq!(warnings, 10);
        assert_eq!(state.progress_percent(), 100);
    }

    #[test]
    fn slider_rereads_the_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        let text = vec!["7"; 450].join(" ");
        std::fs::write(state.data_path(), text).unwrap();
        state.on_slider_changed(3);
        assert_eq!(state.slider_value(), 3);
        let bar = state.canvas().panels()[1].color_bar().unwrap();
        assert_eq!(bar.levels.last(), Some(&7.5));
    }

    #[test]
    fn slider_read_error_becomes_status() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        let generation = state.canvas().generation();
        std::fs::write(state.data_path(), "1 2 three").unwrap();
        state.on_slider_changed(50);
        assert_eq!(state.slider_value(), 10);
        assert_eq!(state.canvas().generation(), generation);
        assert_eq!(
            state.last_status().map(|m| m.level),
            Some(StatusLevel::Warning)
        );
    }

    #[test]
    fn new_data_path_is_saved_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        let new_path = dir.path().join("other.txt");
        state.set_data_path(new_path.clone()).unwrap();
        assert_eq!(state.data_path(), new_path);
        let on_disk = Config::load(state.config_path()).unwrap();
        assert_eq!(on_disk.data_path(), new_path);
    }

    #[test]
    fn failed_save_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        state.config_path = dir.path().join("missing").join("cfg.yml");
        let result = state.set_data_path("/x.txt".into());
        assert!(matches!(result, Err(Error::ConfigWrite { .. })));
        assert_eq!(state.data_path(), Path::new("/x.txt"));
        assert_eq!(
            state.last_status().map(|m| m.level),
            Some(StatusLevel::Error)
        );
    }

    #[test]
    fn restart_cancels_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        state.config.inference = Some(crate::config::InferenceSection { delay_ms: 50 });
        state.start_inference_with(|_: usize| -> Result<MeasurementPair> {
            Ok(MeasurementPair::zeros())
        });
        state.cancel_inference();
        assert_eq!(state.run_state(), RunState::Cancelled);
        assert!(!state.poll_inference());
        state.start_inference_with(|step: usize| -> Result<MeasurementPair> {
            Ok(pair_with(step as f64))
        });
        assert!(state.is_running());
        assert_eq!(state.results().filled_count(), 0);
    }

    #[test]
    fn restart_resets_a_raised_slider() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        state.on_inference_event(InferenceEvent::Result {
            pair: pair_with(1.),
            step: 14,
        });
        state.on_slider_changed(14);
        assert_eq!(state.slider().max(), 14);
        state.start_inference_with(|_: usize| -> Result<MeasurementPair> {
            Ok(MeasurementPair::zeros())
        });
        assert_eq!(state.slider(), SliderRange::new(0, 10));
        assert_eq!(state.slider_value(), 10);
        assert_eq!(state.results().len(), 10);
    }

    #[test]
    fn crashed_step_function_ends_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        state.start_inference_with(|step: usize| -> Result<MeasurementPair> {
            if step == 2 {
                panic!("model crashed");
            }
            Ok(pair_with(step as f64))
        });
        run_to_end(&mut state);
        assert_eq!(state.run_state(), RunState::Cancelled);
        assert_eq!(state.results().filled_count(), 2);
        assert_eq!(
            state.last_status().map(|m| m.level),
            Some(StatusLevel::Error)
        );
        assert!(!state.poll_inference());
    }

    #[test]
    fn relative_data_path_follows_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());
        state.config.set_data_path("fields/step.txt".into());
        assert_eq!(
            state.resolved_data_path(),
            dir.path().join("fields").join("step.txt")
        );
        std::fs::create_dir(dir.path().join("fields")).unwrap();
        std::fs::write(dir.path().join("fields/step.txt"), vec!["4"; 450].join(" ")).unwrap();
        state.on_slider_changed(1);
        let bar = state.canvas().panels()[0].color_bar().unwrap();
        assert_eq!(bar.levels.last(), Some(&4.5));
        assert_eq!(state.data_path(), Path::new("fields/step.txt"));

        state.config.set_data_path("/abs/step.txt".into());
        assert_eq!(state.resolved_data_path(), PathBuf::from("/abs/step.txt"));
    }
}
