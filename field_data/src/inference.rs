//! Background "model inference".
//!
//! There is no model yet: [`DemoFileStep`] re-reads the configured data file
//! for every time step. A real computation only has to implement
//! [`StepFunction`]; the event contract stays the same.
use crate::sample::MeasurementPair;
use crate::Result;
use crossbeam_channel::{Receiver, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Computes the result of one time step.
pub trait StepFunction: Send + 'static {
    fn compute(&mut self, step: usize) -> Result<MeasurementPair>;
}
impl<F> StepFunction for F
where
    F: FnMut(usize) -> Result<MeasurementPair> + Send + 'static,
{
    fn compute(&mut self, step: usize) -> Result<MeasurementPair> {
        self(step)
    }
}

/// Reads the same file for every step.
pub struct DemoFileStep {
    path: PathBuf,
}
impl DemoFileStep {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}
impl StepFunction for DemoFileStep {
    fn compute(&mut self, _step: usize) -> Result<MeasurementPair> {
        MeasurementPair::read(&self.path)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InferenceSettings {
    pub num_points: usize,
    pub delay: Duration,
}

/// Message from the worker thread to the UI.
#[derive(Debug)]
pub enum InferenceEvent {
    Result { pair: MeasurementPair, step: usize },
    Progress(u8),
    StepFailed { step: usize, message: String },
    Completed,
    Cancelled,
}

/// Percent completion after `step` (0-based) of `num_points` steps.
pub fn progress_percent(step: usize, num_points: usize) -> u8 {
    if num_points == 0 {
        return 100;
    }
    ((step + 1) as f64 / num_points as f64 * 100.)
        .round()
        .clamp(0., 100.) as u8
}

/// Handle of one running inference sequence.
///
/// Dropping the handle requests cancellation; the thread finishes its
/// current step and exits on its own.
pub struct InferenceWorker {
    events: Receiver<InferenceEvent>,
    stop: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl InferenceWorker {
    pub fn spawn<S: StepFunction>(settings: InferenceSettings, step_function: S) -> Self {
        let (sender, events) = crossbeam_channel::unbounded();
        let stop = Arc::new(AtomicBool::new(false));
        let thread = {
            let stop = stop.clone();
            std::thread::spawn(move || run(settings, step_function, sender, stop))
        };
        Self {
            events,
            stop,
            thread: Some(thread),
        }
    }

    /// Drains the events which are already there, never blocks.
    pub fn try_events(&self) -> impl Iterator<Item = InferenceEvent> + '_ {
        self.events.try_iter()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<InferenceEvent> {
        self.events.recv_timeout(timeout).ok()
    }

    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Waits for the thread and returns everything it sent.
    pub fn join(mut self) -> Vec<InferenceEvent> {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("inference thread panicked");
            }
        }
        self.events.try_iter().collect()
    }
}

impl Drop for InferenceWorker {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn run<S: StepFunction>(
    settings: InferenceSettings,
    mut step_function: S,
    sender: Sender<InferenceEvent>,
    stop: Arc<AtomicBool>,
) {
    let InferenceSettings { num_points, delay } = settings;
    log::info!("inference started: {num_points} steps, {delay:?} per step");
    let cancelled = || stop.load(Ordering::Relaxed);
    for step in 0..num_points {
        if cancelled() {
            log::info!("inference cancelled before step {step}");
            let _ = sender.send(InferenceEvent::Cancelled);
            return;
        }
        let outcome = step_function.compute(step);
        if cancelled() {
            log::info!("inference cancelled during step {step}");
            let _ = sender.send(InferenceEvent::Cancelled);
            return;
        }
        std::thread::sleep(delay);
        let event = match outcome {
            Ok(pair) => {
                log::debug!("inference step {step} done");
                InferenceEvent::Result { pair, step }
            }
            Err(err) => {
                log::warn!("inference step {step} failed: {err}");
                InferenceEvent::StepFailed {
                    step,
                    message: err.to_string(),
                }
            }
        };
        let progress = InferenceEvent::Progress(progress_percent(step, num_points));
        if sender.send(event).is_err() || sender.send(progress).is_err() {
            log::debug!("inference receiver gone, stopping");
            return;
        }
    }
    log::info!("inference completed");
    let _ = sender.send(InferenceEvent::Completed);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Error;

    fn zeros(_step: usize) -> crate::Result<MeasurementPair> {
        Ok(MeasurementPair::zeros())
    }

    fn settings(num_points: usize) -> InferenceSettings {
        InferenceSettings {
            num_points,
            delay: Duration::ZERO,
        }
    }

    #[test]
    fn progress_formula() {
        assert_eq!(progress_percent(0, 3), 33);
        assert_eq!(progress_percent(1, 3), 67);
        assert_eq!(progress_percent(2, 3), 100);
        assert_eq!(progress_percent(0, 8), 13);
        for n in 1..50 {
            assert_eq!(progress_percent(n - 1, n), 100);
            for i in 0..n {
                let expected = ((i + 1) as f64 / n as f64 * 100.).round() as u8;
                assert_eq!(progress_percent(i, n), expected);
            }
        }
    }

    #[test]
    fn results_and_progress_alternate_in_step_order() {
        let worker = InferenceWorker::spawn(settings(4), zeros);
        let events = worker.join();
        assert_eq!(events.len(), 9);
        for (step, chunk) in events[..8].chunks(2).enumerate() {
            match &chunk[0] {
                InferenceEvent::Result { step: s, .. } => assert_eq!(*s, step),
                other => panic!("expected result, got {other:?}"),
            }
            match &chunk[1] {
                InferenceEvent::Progress(p) => assert_eq!(*p, progress_percent(step, 4)),
                other => panic!("expected progress, got {other:?}"),
            }
        }
        assert!(matches!(events[8], InferenceEvent::Completed));
    }

    #[test]
    fn failed_step_does_not_stop_the_sequence() {
        let worker = InferenceWorker::spawn(settings(3), |step: usize| {
            if step == 1 {
                Err(Error::Shape {
                    expected: 450,
                    found: 3,
                })
            } else {
                zeros(step)
            }
        });
        let events = worker.join();
        assert!(matches!(events[0], InferenceEvent::Result { step: 0, .. }));
        assert!(matches!(events[2], InferenceEvent::StepFailed { step: 1, .. }));
        assert!(matches!(events[3], InferenceEvent::Progress(67)));
        assert!(matches!(events[4], InferenceEvent::Result { step: 2, .. }));
        assert!(matches!(events[5], InferenceEvent::Progress(100)));
        assert!(matches!(events[6], InferenceEvent::Completed));
    }

    #[test]
    fn demo_step_reads_the_file_every_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo_output.txt");
        let text = (0..450).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        std::fs::write(&path, text).unwrap();
        let mut step = DemoFileStep::new(&path);
        let first = step.compute(0).unwrap();
        assert_eq!(step.compute(1).unwrap(), first);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(step.compute(2), Err(Error::FileNotFound(_))));
    }

    #[test]
    fn cancel_stops_between_steps() {
        let worker = InferenceWorker::spawn(
            InferenceSettings {
                num_points: 1000,
                delay: Duration::from_millis(20),
            },
            zeros,
        );
        let first = worker.recv_timeout(Duration::from_secs(10));
        assert!(matches!(first, Some(InferenceEvent::Result { step: 0, .. })));
        worker.cancel();
        let mut results = 1;
        let last = loop {
            match worker.recv_timeout(Duration::from_secs(10)) {
                Some(InferenceEvent::Result { .. }) => results += 1,
                Some(InferenceEvent::Progress(_)) => {}
                other => break other,
            }
        };
        assert!(matches!(last, Some(InferenceEvent::Cancelled)));
        assert!(results < 1000);
        let remaining = worker.join();
        assert!(remaining.is_empty());
    }

    #[test]
    fn zero_steps_complete_at_once() {
        let events = InferenceWorker::spawn(settings(0), zeros).join();
        assert!(matches!(events.as_slice(), [InferenceEvent::Completed]));
    }
}
