//! Error types for sprite and clip registry operations.

use thiserror::Error;

/// Errors surfaced by [`AnimatedSprite`](crate::sprite::AnimatedSprite)
/// registry and draw operations.
///
/// These are programmer-contract violations, not I/O failures: they are
/// returned immediately and there is no retry or recovery path.
#[derive(Debug, Error)]
pub enum SpriteError {
    /// A clip with this name is already registered on the sprite.
    #[error("animation `{0}` already exists")]
    DuplicateName(String),

    /// No clip with this name is registered on the sprite.
    #[error("animation `{0}` does not exist")]
    UnknownName(String),

    /// `draw` was called before any clip was registered.
    #[error("can't draw sprite: no animation has been set")]
    NoActiveAnimation,

    /// A clip definition document could not be parsed.
    #[error("invalid clip definition: {0}")]
    ClipParse(#[from] serde_json::Error),
}
