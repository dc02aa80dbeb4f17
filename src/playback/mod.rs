//! Playback controller
//!
//! Cursor over a finished `StepTrace`. Presentation-agnostic: the caller
//! owns the clock and drives the timer by passing `Instant`s to `play` and
//! `poll`, typically sleeping until `next_deadline()` in between.
//!
//! Each controller owns its cursor and timer; independent playbacks of the
//! same or different traces share nothing but the (immutable) steps.

mod config;
mod timer;

pub use config::{PlaybackConfig, DEFAULT_SPEED_MS};

use std::time::Instant;

use thiserror::Error;
use tracing::debug;

use crate::trace::{Step, StepTrace};
use crate::tree::Key;
use timer::Ticker;

/// Errors raised by the playback controller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// A controller needs at least one step to point at
    #[error("cannot attach playback to an empty trace")]
    EmptyTrace,

    /// Tick interval must be positive
    #[error("invalid playback speed {0} ms (must be > 0)")]
    InvalidSpeed(u64),
}

/// Play/pause/step/reset over a recorded trace
#[derive(Debug)]
pub struct PlaybackController<V: Key> {
    trace: StepTrace<V>,
    cursor: usize,
    is_playing: bool,
    config: PlaybackConfig,
    ticker: Ticker,
}

impl<V: Key> PlaybackController<V> {
    /// Attach to `trace` with the default configuration
    pub fn attach(trace: StepTrace<V>) -> Result<Self, PlaybackError> {
        Self::with_config(trace, PlaybackConfig::default())
    }

    /// Attach to `trace` with an explicit configuration
    pub fn with_config(trace: StepTrace<V>, config: PlaybackConfig) -> Result<Self, PlaybackError> {
        config.validate()?;
        if trace.is_empty() {
            return Err(PlaybackError::EmptyTrace);
        }
        Ok(Self {
            trace,
            cursor: 0,
            is_playing: false,
            config,
            ticker: Ticker::default(),
        })
    }

    /// Trace being played
    pub fn trace(&self) -> &StepTrace<V> {
        &self.trace
    }

    /// Current position, `0 <= cursor < len`
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the timer is running
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Current tick interval in milliseconds
    pub fn speed_ms(&self) -> u64 {
        self.config.speed_ms
    }

    /// Step under the cursor
    pub fn current_step(&self) -> &Step<V> {
        &self.trace[self.cursor]
    }

    /// Whether the cursor sits on the last step
    pub fn is_at_end(&self) -> bool {
        self.cursor == self.last_index()
    }

    /// When the armed tick is due, if playing
    pub fn next_deadline(&self) -> Option<Instant> {
        self.ticker.deadline()
    }

    fn last_index(&self) -> usize {
        self.trace.len() - 1
    }

    /// Start advancing one step per interval, starting from `now`.
    ///
    /// Any previously armed tick is cancelled first.
    pub fn play(&mut self, now: Instant) {
        self.ticker.cancel();
        if self.is_at_end() && self.config.auto_rewind {
            self.cursor = 0;
        }
        if self.is_at_end() {
            self.is_playing = false;
            return;
        }

        self.is_playing = true;
        self.ticker.arm(now, self.config.interval());
        debug!(cursor = self.cursor, speed_ms = self.config.speed_ms, "playback started");
    }

    /// Stop the timer, keeping the cursor
    pub fn pause(&mut self) {
        self.ticker.cancel();
        if self.is_playing {
            debug!(cursor = self.cursor, "playback paused");
        }
        self.is_playing = false;
    }

    /// Stop and rewind to the first step
    pub fn reset(&mut self) {
        self.ticker.cancel();
        self.is_playing = false;
        self.cursor = 0;
        debug!("playback reset");
    }

    /// Advance one step, clamped at the end. Returns whether the cursor moved.
    pub fn step_forward(&mut self) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Go back one step, clamped at the start. Returns whether the cursor moved.
    pub fn step_backward(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Jump to `index`, clamped to the trace
    pub fn seek(&mut self, index: usize) {
        self.cursor = index.min(self.last_index());
    }

    /// Change the interval; the already armed tick keeps its deadline
    pub fn set_speed(&mut self, speed_ms: u64) -> Result<(), PlaybackError> {
        let config = self.config.clone().with_speed_ms(speed_ms);
        config.validate()?;
        self.config = config;
        debug!(speed_ms, "playback speed changed");
        Ok(())
    }

    /// Apply every tick due at `now`. Returns the number of steps advanced.
    ///
    /// Playback stops on its own once the last step is reached.
    pub fn poll(&mut self, now: Instant) -> usize {
        let mut advanced = 0;
        while self.is_playing && self.ticker.fire(now, self.config.interval()) {
            if self.step_forward() {
                advanced += 1;
            }
            if self.is_at_end() {
                self.ticker.cancel();
                self.is_playing = false;
                debug!(cursor = self.cursor, "playback reached the end");
            }
        }
        advanced
    }
}
