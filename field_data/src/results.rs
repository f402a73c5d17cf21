use crate::sample::MeasurementPair;

/// Results of the inference steps, indexed by step.
#[derive(Clone, Debug, Default)]
pub struct ResultsBuffer {
    slots: Vec<Option<MeasurementPair>>,
}
impl ResultsBuffer {
    pub fn new(num_points: usize) -> Self {
        Self {
            slots: vec![None; num_points],
        }
    }

    /// Stores `pair` at `step`, growing the buffer if the step lies beyond.
    pub fn store(&mut self, step: usize, pair: MeasurementPair) {
        if step >= self.slots.len() {
            self.slots.resize(step + 1, None);
        }
        self.slots[step] = Some(pair);
    }

    pub fn get(&self, step: usize) -> Option<&MeasurementPair> {
        self.slots.get(step).and_then(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn iter_filled(&self) -> impl Iterator<Item = (usize, &MeasurementPair)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(step, s)| s.as_ref().map(|p| (step, p)))
    }
}

/// Inclusive bounds of the time step slider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SliderRange {
    min: usize,
    max: usize,
}
impl SliderRange {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }
    pub fn min(&self) -> usize {
        self.min
    }
    pub fn max(&self) -> usize {
        self.max
    }
    pub fn clamp(&self, value: usize) -> usize {
        value.clamp(self.min, self.max)
    }
    /// Raises the upper bound to `step` if needed. Returns whether it moved.
    #[must_use]
    pub fn extend_to(&mut self, step: usize) -> bool {
        if step > self.max {
            self.max = step;
            true
        } else {
            false
        }
    }
}

#[test]
fn buffer_keeps_step_positions() {
    let mut buffer = ResultsBuffer::new(4);
    assert_eq!(buffer.len(), 4);
    assert_eq!(buffer.filled_count(), 0);
    buffer.store(2, MeasurementPair::zeros());
    buffer.store(0, MeasurementPair::zeros());
    assert!(buffer.get(1).is_none());
    assert!(buffer.get(2).is_some());
    assert_eq!(
        buffer.iter_filled().map(|(s, _)| s).collect::<Vec<_>>(),
        vec![0, 2]
    );
}

#[test]
fn buffer_grows_for_late_steps() {
    let mut buffer = ResultsBuffer::new(2);
    buffer.store(5, MeasurementPair::zeros());
    assert_eq!(buffer.len(), 6);
    assert_eq!(buffer.filled_count(), 1);
    assert!(buffer.get(9).is_none());
}

#[test]
fn slider_range_only_grows() {
    let mut range = SliderRange::new(10, 0);
    assert_eq!((range.min(), range.max()), (0, 10));
    assert!(!range.extend_to(10));
    assert!(!range.extend_to(3));
    assert!(range.extend_to(11));
    assert_eq!(range.max(), 11);
    assert_eq!(range.clamp(40), 11);
}
