//! Ring-buffer smoothing of raw per-frame visual features.
//!
//! Raw features jitter frame to frame; committing them directly would make
//! tempo and timbre flap audibly. Each parameter keeps a fixed window of the
//! most recent raw samples and only commits the window mean when it moves
//! past a distinction threshold. The threshold tightens periodically so a
//! parameter cannot stay stuck after one large isolated jump.

use serde::Serialize;

/// Raw per-frame feature vector, every component normalized to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawFeatures {
    pub energy: f64,
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

/// Last-committed control parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlParameters {
    pub energy: f64,
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

/// Which parameters changed in a commit. `None` means unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Commit {
    pub energy: Option<f64>,
    pub hue: Option<f64>,
    pub saturation: Option<f64>,
    pub value: Option<f64>,
}

impl Commit {
    pub fn any(&self) -> bool {
        self.energy.is_some()
            || self.hue.is_some()
            || self.saturation.is_some()
            || self.value.is_some()
    }
}

/// Window size for every parameter's ring buffer.
pub const SMOOTHING_WINDOW: usize = 10;

/// Threshold for the first commit and for forced tightenings.
const TIGHT_THRESHOLD: f64 = 0.05;

/// Steady-state distinction threshold.
const STEADY_THRESHOLD: f64 = 0.10;

/// Seconds between forced threshold tightenings.
const FORCE_WINDOW_SECS: u64 = 4;

struct RingBuffer {
    values: [f64; SMOOTHING_WINDOW],
    head: usize,
    len: usize,
}

impl RingBuffer {
    fn new() -> Self {
        Self {
            values: [0.0; SMOOTHING_WINDOW],
            head: 0,
            len: 0,
        }
    }

    fn push(&mut self, value: f64) {
        self.values[self.head] = value;
        self.head = (self.head + 1) % SMOOTHING_WINDOW;
        if self.len < SMOOTHING_WINDOW {
            self.len += 1;
        }
    }

    fn is_full(&self) -> bool {
        self.len == SMOOTHING_WINDOW
    }

    fn mean(&self) -> f64 {
        self.values[..self.len].iter().sum::<f64>() / self.len as f64
    }
}

struct Parameter {
    buffer: RingBuffer,
    committed: Option<f64>,
}

impl Parameter {
    fn new() -> Self {
        Self {
            buffer: RingBuffer::new(),
            committed: None,
        }
    }

    /// Commit the window mean when it is distinct from the committed value.
    fn maybe_commit(&mut self, threshold: f64) -> Option<f64> {
        let mean = self.buffer.mean();
        let distinct = match self.committed {
            Some(last) => (mean - last).abs() > threshold,
            None => true,
        };
        if distinct {
            self.committed = Some(mean);
            Some(mean)
        } else {
            None
        }
    }
}

/// Smoother over the four control parameters (energy, hue, saturation,
/// value).
pub struct ParameterSmoother {
    params: [Parameter; 4],
    sample_rate: u32,
    committed_once: bool,
    /// Sample-clock position of the last forced tightening.
    last_force_sample: u64,
}

impl ParameterSmoother {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            params: [
                Parameter::new(),
                Parameter::new(),
                Parameter::new(),
                Parameter::new(),
            ],
            sample_rate,
            committed_once: false,
            last_force_sample: 0,
        }
    }

    /// Append one raw feature sample into every parameter's window.
    pub fn push(&mut self, raw: RawFeatures) {
        let components = [raw.energy, raw.hue, raw.saturation, raw.value];
        for (param, component) in self.params.iter_mut().zip(components) {
            param.buffer.push(component);
        }
    }

    /// Commit parameters whose window mean moved past the distinction
    /// threshold. Returns `None` until every window is full.
    ///
    /// `samples_done` is the renderer's sample clock; more than
    /// [`FORCE_WINDOW_SECS`] since the last tightening (or the very first
    /// commit) uses the tight threshold.
    pub fn maybe_commit(&mut self, samples_done: u64) -> Option<Commit> {
        if !self.params.iter().all(|p| p.buffer.is_full()) {
            return None;
        }

        let force = !self.committed_once
            || samples_done - self.last_force_sample > FORCE_WINDOW_SECS * self.sample_rate as u64;
        let threshold = if force {
            self.last_force_sample = samples_done;
            TIGHT_THRESHOLD
        } else {
            STEADY_THRESHOLD
        };
        self.committed_once = true;

        Some(Commit {
            energy: self.params[0].maybe_commit(threshold),
            hue: self.params[1].maybe_commit(threshold),
            saturation: self.params[2].maybe_commit(threshold),
            value: self.params[3].maybe_commit(threshold),
        })
    }

    /// Current committed parameters; `None` before the first commit.
    pub fn current(&self) -> Option<ControlParameters> {
        Some(ControlParameters {
            energy: self.params[0].committed?,
            hue: self.params[1].committed?,
            saturation: self.params[2].committed?,
            value: self.params[3].committed?,
        })
    }
}
