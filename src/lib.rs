//! Flipbook sprite-sheet animation.
//!
//! This crate plays, pauses, stops, and switches named frame sequences cut
//! from a single spritesheet, and renders the currently selected frame with
//! optional flip/rotation. It owns no windowing, no asset loading, and no
//! render loop: the host supplies the spritesheet handle ([`SheetImage`]),
//! the drawing surface ([`DrawSurface`]), and the call cadence.
//!
//! # Overview
//!
//! - [`AnimationClip`] — the per-sequence state machine: frame range,
//!   timing, start/stop/pause, end-of-cycle signaling.
//! - [`AnimatedSprite`] — owns a registry of named clips, selects one as
//!   active, advances it lazily from the clock on each draw request, and
//!   issues the surface calls.
//! - [`AnimationSignals`] — the sprite's synchronous `start`/`stop`/`end`
//!   broadcast channels, payload = clip name.
//!
//! # Example
//!
//! ```ignore
//! let mut player = AnimatedSprite::new(sheet, 4, 2);
//! player.add_animation(
//!     "walk",
//!     AnimationClip::new().with_frame_end(3).with_delay(100.0),
//! )?;
//! player.add_animation(
//!     "idle",
//!     AnimationClip::new().with_frame_start(4).with_auto_start(false),
//! )?;
//! player.signals().on_end.connect(|name| log::info!("`{name}` looped"));
//!
//! // once per render tick:
//! player.draw(&mut canvas, 120.0, 64.0)?;
//! ```

pub mod clip;
pub mod clock;
pub mod error;
pub mod signal;
pub mod sprite;
pub mod surface;

pub use clip::{AnimationClip, ClipDef};
pub use clock::{Clock, SystemClock};
pub use error::SpriteError;
pub use signal::{AnimationSignals, Signal};
pub use sprite::AnimatedSprite;
pub use surface::{DrawSurface, SheetImage};
