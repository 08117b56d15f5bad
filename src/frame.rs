use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use log::{debug, info};

/// Shared flag that stops a [`FrameLoop`] at its next tick.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Whether the host should schedule another frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Reschedule,
    Stop,
}

/// Cooperative frame loop. The host calls [`FrameLoop::tick`] from its
/// display callback and schedules the next callback while it returns
/// [`Tick::Reschedule`].
#[derive(Debug, Default)]
pub struct FrameLoop {
    cancel: CancelHandle,
    frames: u64,
    stopped: bool,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs one frame unless cancelled. A frame error is returned to the
    /// caller and does not stop the loop.
    pub fn tick<F>(&mut self, frame: F) -> Result<Tick>
    where
        F: FnOnce(u64) -> Result<()>,
    {
        if self.stopped {
            return Ok(Tick::Stop);
        }
        if self.cancel.is_cancelled() {
            self.stopped = true;
            info!("frame loop cancelled after {} frames", self.frames);
            return Ok(Tick::Stop);
        }
        let index = self.frames;
        self.frames += 1;
        if index == 0 {
            debug!("first frame");
        }
        frame(index)?;
        Ok(Tick::Reschedule)
    }
}
