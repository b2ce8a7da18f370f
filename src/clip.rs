//! Per-sequence animation state machine.
//!
//! An [`AnimationClip`] describes one named frame range cut from the owning
//! sprite's frame grid, its playback speed, and its current step. It knows
//! nothing about rendering; the sprite asks it to [`advance`] when enough
//! time has passed and draws whatever step comes back.
//!
//! Lifecycle transitions are broadcast through the owning sprite's
//! [`AnimationSignals`] channels. The clip reaches them through a shared
//! handle set at registration; it never holds the sprite itself.
//!
//! [`advance`]: AnimationClip::advance

use std::rc::Rc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::signal::AnimationSignals;

/// Default minimum milliseconds between frame advances.
pub const DEFAULT_DELAY_MS: f64 = 100.0;

/// One named, bounded frame sequence with its own timing and playback state.
///
/// Build with [`AnimationClip::new`] and the `with_*` methods, then register
/// on a sprite with
/// [`add_animation`](crate::sprite::AnimatedSprite::add_animation), which
/// binds the clip's name and defaults an unset `frame_end` to the sprite's
/// maximum frame index.
#[derive(Debug)]
pub struct AnimationClip {
    /// Registry name; empty until the clip is registered on a sprite.
    pub name: String,
    /// First frame index of the sequence (inclusive).
    pub frame_start: u32,
    /// Last frame index (inclusive). `None` until registration defaults it.
    pub frame_end: Option<u32>,
    /// Minimum milliseconds between successive frame advances.
    pub delay: f64,
    /// Current step, always within `[frame_start, frame_end]` once bound.
    pub current_step: u32,
    /// Start automatically when the clip becomes the sprite's active clip.
    pub auto_start: bool,
    /// Set by the first `start` and only cleared by `stop`.
    pub has_started: bool,
    /// Whether `advance` currently moves the step.
    pub is_running: bool,
    signals: Option<Rc<AnimationSignals>>,
}

impl AnimationClip {
    /// A clip covering the whole sheet: `frame_start = 0`, `frame_end`
    /// defaulted at registration, 100 ms delay, auto-start on.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            frame_start: 0,
            frame_end: None,
            delay: DEFAULT_DELAY_MS,
            current_step: 0,
            auto_start: true,
            has_started: false,
            is_running: false,
            signals: None,
        }
    }

    pub fn with_frame_start(mut self, frame_start: u32) -> Self {
        self.frame_start = frame_start;
        self.current_step = frame_start;
        self
    }

    pub fn with_frame_end(mut self, frame_end: u32) -> Self {
        self.frame_end = Some(frame_end);
        self
    }

    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay = delay_ms;
        self
    }

    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Called by the sprite at registration. Binds the registry name, the
    /// route to the sprite's signal channels, and the default frame range
    /// end for clips that did not set one.
    pub(crate) fn bind(
        &mut self,
        name: impl Into<String>,
        signals: Rc<AnimationSignals>,
        default_frame_end: u32,
    ) {
        self.name = name.into();
        self.signals = Some(signals);
        if self.frame_end.is_none() {
            self.frame_end = Some(default_frame_end);
        }
    }

    /// Begin playback and emit `on_start`.
    ///
    /// No-op if the clip has already started. Note the asymmetry with
    /// [`pause`](Self::pause): a paused clip still `has_started`, so `start`
    /// will not resume it. The only built-in resume path is
    /// [`stop`](Self::stop) followed by `start`, which also resets the step.
    pub fn start(&mut self) {
        if !self.has_started {
            self.has_started = true;
            self.is_running = true;
            debug!("clip `{}` started", self.name);
            if let Some(signals) = &self.signals {
                signals.on_start.emit(&self.name);
            }
        }
    }

    /// Freeze playback without resetting the step. Emits nothing.
    pub fn pause(&mut self) {
        if self.is_running && self.has_started {
            self.is_running = false;
            debug!("clip `{}` paused at step {}", self.name, self.current_step);
        }
    }

    /// Reset to the first frame, clear both playback flags, and emit
    /// `on_stop`. No-op if the clip never started.
    pub fn stop(&mut self) {
        if self.has_started {
            self.has_started = false;
            self.is_running = false;
            self.current_step = self.frame_start;
            debug!("clip `{}` stopped", self.name);
            if let Some(signals) = &self.signals {
                signals.on_stop.emit(&self.name);
            }
        }
    }

    /// Step forward if running, wrapping past `frame_end` back to
    /// `frame_start` and emitting `on_end` at the wrap.
    ///
    /// Returns the current step whether or not the clip is running, so a
    /// returned value does not imply motion occurred.
    pub fn advance(&mut self) -> u32 {
        if self.is_running {
            self.current_step += 1;
            if let Some(end) = self.frame_end
                && self.current_step > end
            {
                self.current_step = self.frame_start;
                trace!("clip `{}` completed a cycle", self.name);
                if let Some(signals) = &self.signals {
                    signals.on_end.emit(&self.name);
                }
            }
        }
        self.current_step
    }
}

impl Default for AnimationClip {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain data describing a clip, for data-driven setups.
///
/// Deserializes from the same shape [`AnimationClip::new`] builds: every
/// field optional, same defaults. Convert with `From`/`Into` and register
/// the result, or feed a whole document to
/// [`add_clips_from_json`](crate::sprite::AnimatedSprite::add_clips_from_json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipDef {
    #[serde(default)]
    pub frame_start: u32,
    #[serde(default)]
    pub frame_end: Option<u32>,
    #[serde(default = "default_delay")]
    pub delay: f64,
    #[serde(default = "default_auto_start")]
    pub auto_start: bool,
}

fn default_delay() -> f64 {
    DEFAULT_DELAY_MS
}

fn default_auto_start() -> bool {
    true
}

impl From<ClipDef> for AnimationClip {
    fn from(def: ClipDef) -> Self {
        let mut clip = AnimationClip::new()
            .with_frame_start(def.frame_start)
            .with_delay(def.delay)
            .with_auto_start(def.auto_start);
        clip.frame_end = def.frame_end;
        clip
    }
}
