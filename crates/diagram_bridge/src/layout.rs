// SPDX-License-Identifier: MIT OR Apache-2.0
//! Waiting for the host container to settle before mounting.

use std::time::Duration;

/// How often the host should sample the container size
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Size of the host container, in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerSize {
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl ContainerSize {
    /// Create a size
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A size with no area
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Outcome of one size sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeStatus {
    /// Keep sampling
    Waiting,
    /// Two equal, non-empty samples in a row
    Stable(ContainerSize),
    /// The probe was cancelled
    Cancelled,
}

/// Tracks size samples until the container is stable
#[derive(Debug, Clone, Default)]
pub struct LayoutProbe {
    last: Option<ContainerSize>,
    samples: usize,
    cancelled: bool,
}

impl LayoutProbe {
    /// Create a probe with no samples
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample
    pub fn sample(&mut self, size: ContainerSize) -> ProbeStatus {
        if self.cancelled {
            return ProbeStatus::Cancelled;
        }
        self.samples += 1;
        let previous = self.last.replace(size);
        match previous {
            Some(previous) if previous == size && !size.is_empty() => ProbeStatus::Stable(size),
            _ => ProbeStatus::Waiting,
        }
    }

    /// Stop the probe; later samples report `Cancelled`
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Number of samples taken
    pub fn samples(&self) -> usize {
        self.samples
    }
}
