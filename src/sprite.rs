//! Sprite composite: clip registry, time-gated frame selection, and
//! transformed drawing.
//!
//! An [`AnimatedSprite`] is constructed once with immutable grid geometry
//! (sheet, columns, rows, frame size); named [`AnimationClip`]s are then
//! registered and removed dynamically. At most one clip is active; the
//! first registered clip becomes active automatically.
//!
//! Frame advancement is lazy and coupled to the cadence of [`draw`] calls:
//! each draw samples the clock and steps the active clip only when the
//! clip's delay has elapsed since the last step. A sprite that is never
//! drawn never advances.
//!
//! [`draw`]: AnimatedSprite::draw

use std::rc::Rc;

use log::debug;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::clip::{AnimationClip, ClipDef};
use crate::clock::{Clock, SystemClock};
use crate::error::SpriteError;
use crate::signal::AnimationSignals;
use crate::surface::{DrawSurface, SheetImage};

/// A spritesheet cut into a `columns x rows` frame grid, indexed row-major,
/// with a registry of named clips selecting ranges of that grid.
///
/// Generic over the opaque sheet image `I` and the time source `C`
/// (defaulting to [`SystemClock`]; swap it with
/// [`with_clock`](Self::with_clock) to drive timing by hand).
#[derive(Debug)]
pub struct AnimatedSprite<I: SheetImage, C: Clock = SystemClock> {
    sheet: I,
    columns: u32,
    rows: u32,
    frame_width: f32,
    frame_height: f32,
    /// Destination draw width.
    pub width: f32,
    /// Destination draw height.
    pub height: f32,
    max_frames: u32,
    animations: FxHashMap<String, AnimationClip>,
    current_animation: Option<String>,
    current_frame: Option<u32>,
    last_advance: Option<f64>,
    signals: Rc<AnimationSignals>,
    clock: C,
    /// Mirror horizontally around the pivot when drawing.
    pub flip_x: bool,
    /// Mirror vertically around the pivot when drawing.
    pub flip_y: bool,
    /// Rotation in degrees, applied only when greater than zero.
    pub rotation: f32,
}

/// One entry of a clip-definition document: a registry name plus the clip
/// fields, all optional.
#[derive(Debug, Deserialize)]
struct NamedClipDef {
    name: String,
    #[serde(flatten)]
    def: ClipDef,
}

impl<I: SheetImage> AnimatedSprite<I> {
    /// Build a sprite over `sheet` divided into `columns x rows` frames.
    ///
    /// Frame size defaults to the sheet dimensions divided by the grid
    /// counts, and the destination draw size defaults to the frame size;
    /// override with [`with_frame_size`](Self::with_frame_size) and
    /// [`with_draw_size`](Self::with_draw_size).
    pub fn new(sheet: I, columns: u32, rows: u32) -> Self {
        let frame_width = sheet.width() as f32 / columns as f32;
        let frame_height = sheet.height() as f32 / rows as f32;
        Self {
            sheet,
            columns,
            rows,
            frame_width,
            frame_height,
            width: frame_width,
            height: frame_height,
            max_frames: columns * rows - 1,
            animations: FxHashMap::default(),
            current_animation: None,
            current_frame: None,
            last_advance: None,
            signals: Rc::new(AnimationSignals::new()),
            clock: SystemClock::new(),
            flip_x: false,
            flip_y: false,
            rotation: 0.0,
        }
    }
}

impl<I: SheetImage, C: Clock> AnimatedSprite<I, C> {
    /// Override the frame cell size. Also resets the draw size to match,
    /// so call [`with_draw_size`](Self::with_draw_size) after this one.
    pub fn with_frame_size(mut self, frame_width: f32, frame_height: f32) -> Self {
        self.frame_width = frame_width;
        self.frame_height = frame_height;
        self.width = frame_width;
        self.height = frame_height;
        self
    }

    /// Override the destination draw size.
    pub fn with_draw_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Replace the time source. Existing advance timestamps are cleared
    /// since they were sampled from the old clock.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> AnimatedSprite<I, C2> {
        AnimatedSprite {
            sheet: self.sheet,
            columns: self.columns,
            rows: self.rows,
            frame_width: self.frame_width,
            frame_height: self.frame_height,
            width: self.width,
            height: self.height,
            max_frames: self.max_frames,
            animations: self.animations,
            current_animation: self.current_animation,
            current_frame: self.current_frame,
            last_advance: None,
            signals: self.signals,
            clock,
            flip_x: self.flip_x,
            flip_y: self.flip_y,
            rotation: self.rotation,
        }
    }

    /// The sprite's lifecycle signal channels. Every registered clip emits
    /// its `start`/`stop`/`end` notifications here, payload = clip name.
    pub fn signals(&self) -> &AnimationSignals {
        &self.signals
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn frame_width(&self) -> f32 {
        self.frame_width
    }

    pub fn frame_height(&self) -> f32 {
        self.frame_height
    }

    /// Highest frame index of the grid, `columns * rows - 1`.
    pub fn max_frames(&self) -> u32 {
        self.max_frames
    }

    pub fn sheet(&self) -> &I {
        &self.sheet
    }

    /// Frame index selected by the most recent draw, if any.
    pub fn current_frame(&self) -> Option<u32> {
        self.current_frame
    }

    /// Look up a registered clip by name.
    pub fn animation(&self, name: &str) -> Option<&AnimationClip> {
        self.animations.get(name)
    }

    pub fn animation_mut(&mut self, name: &str) -> Option<&mut AnimationClip> {
        self.animations.get_mut(name)
    }

    /// The active clip, or `None` before the first registration.
    pub fn current_animation(&self) -> Option<&AnimationClip> {
        self.current_animation
            .as_deref()
            .and_then(|name| self.animations.get(name))
    }

    /// Mutable access to the active clip, e.g. to `pause` it.
    pub fn current_animation_mut(&mut self) -> Option<&mut AnimationClip> {
        match &self.current_animation {
            Some(name) => self.animations.get_mut(name),
            None => None,
        }
    }

    /// Register `clip` under `name`.
    ///
    /// Binds the clip's name and signal route, and defaults its `frame_end`
    /// to [`max_frames`](Self::max_frames) when unset. If no clip is active
    /// yet this one becomes active, honoring its `auto_start` flag.
    ///
    /// Fails with [`SpriteError::DuplicateName`] if `name` is taken; the
    /// registry is left unchanged.
    pub fn add_animation(
        &mut self,
        name: impl Into<String>,
        mut clip: AnimationClip,
    ) -> Result<(), SpriteError> {
        let name = name.into();
        if self.animations.contains_key(&name) {
            return Err(SpriteError::DuplicateName(name));
        }
        clip.bind(name.clone(), Rc::clone(&self.signals), self.max_frames);
        debug!(
            "registered clip `{}` (frames {}..={})",
            name,
            clip.frame_start,
            clip.frame_end.unwrap_or(self.max_frames),
        );
        self.animations.insert(name.clone(), clip);
        if self.current_animation.is_none() {
            self.set_animation(&name)?;
        }
        Ok(())
    }

    /// Make the named clip active.
    ///
    /// Re-selecting the already active clip is a no-op: no restart, no
    /// events. Otherwise the old clip is stopped (resetting its step), the
    /// new one is started if its `auto_start` flag is set, and the advance
    /// timestamp is cleared so the next draw recomputes timing from
    /// scratch.
    ///
    /// Fails with [`SpriteError::UnknownName`] if `name` is not registered.
    pub fn set_animation(&mut self, name: &str) -> Result<(), SpriteError> {
        if !self.animations.contains_key(name) {
            return Err(SpriteError::UnknownName(name.to_owned()));
        }
        if self.current_animation.as_deref() == Some(name) {
            return Ok(());
        }
        self.stop_animation();
        debug!("active clip -> `{name}`");
        self.current_animation = Some(name.to_owned());
        if let Some(clip) = self.animations.get_mut(name)
            && clip.auto_start
        {
            clip.start();
        }
        self.last_advance = None;
        Ok(())
    }

    /// Start the active clip. No-op when no clip is active.
    pub fn start_animation(&mut self) {
        if let Some(clip) = self.current_animation_mut() {
            clip.start();
        }
    }

    /// Stop the active clip. No-op when no clip is active.
    pub fn stop_animation(&mut self) {
        if let Some(clip) = self.current_animation_mut() {
            clip.stop();
        }
    }

    /// Unregister the named clip and return it.
    ///
    /// Removing the active clip stops it first and leaves the sprite with
    /// no active clip; drawing then fails until another clip is selected.
    ///
    /// Fails with [`SpriteError::UnknownName`] if `name` is not registered.
    pub fn remove_animation(&mut self, name: &str) -> Result<AnimationClip, SpriteError> {
        if self.current_animation.as_deref() == Some(name) {
            self.stop_animation();
            self.current_animation = None;
            self.current_frame = None;
            self.last_advance = None;
        }
        self.animations
            .remove(name)
            .ok_or_else(|| SpriteError::UnknownName(name.to_owned()))
    }

    /// Register clips from a JSON document: an array of objects, each a
    /// clip name plus any of `frame_start`, `frame_end`, `delay`,
    /// `auto_start`. Entries register in document order, so on a fresh
    /// sprite the first entry becomes the active clip.
    ///
    /// ```json
    /// [
    ///     { "name": "walk", "frame_start": 0, "frame_end": 3, "delay": 100.0 },
    ///     { "name": "idle", "frame_start": 4, "auto_start": false }
    /// ]
    /// ```
    pub fn add_clips_from_json(&mut self, json: &str) -> Result<(), SpriteError> {
        let defs: Vec<NamedClipDef> = serde_json::from_str(json)?;
        for entry in defs {
            self.add_animation(entry.name, AnimationClip::from(entry.def))?;
        }
        Ok(())
    }

    /// Render the active clip's current frame at `(x, y)`.
    ///
    /// Samples the clock; if the active clip's delay has elapsed since the
    /// last frame-step decision (or no decision has been made yet), the
    /// clip advances and the timestamp is updated, otherwise the previous
    /// frame is reused. The frame's grid cell is then blitted to
    /// `(x, y, width, height)` inside a `save`/`restore` pair, with a
    /// translate/rotate/scale transform applied when any of `flip_x`,
    /// `flip_y` or `rotation > 0` is set.
    ///
    /// The transform pivot is `(x + width / 2, y + width / 2)` — the
    /// vertical offset also uses `width`. For non-square draw sizes this is
    /// almost certainly a defect rather than a feature, but callers may
    /// have compensated for it, so it is kept as-is.
    ///
    /// Fails with [`SpriteError::NoActiveAnimation`] if no clip has been
    /// registered; nothing is issued to the surface in that case.
    pub fn draw<S>(&mut self, surface: &mut S, x: f32, y: f32) -> Result<(), SpriteError>
    where
        S: DrawSurface<Image = I>,
    {
        let Some(name) = self.current_animation.clone() else {
            return Err(SpriteError::NoActiveAnimation);
        };
        let now = self.clock.now_ms();

        let frame = match self.animations.get_mut(&name) {
            Some(clip) => {
                let due = match self.last_advance {
                    None => true,
                    Some(then) => now - then >= clip.delay,
                };
                if due {
                    let frame = clip.advance();
                    self.current_frame = Some(frame);
                    self.last_advance = Some(now);
                    frame
                } else {
                    self.current_frame.unwrap_or(clip.current_step)
                }
            }
            None => return Err(SpriteError::NoActiveAnimation),
        };

        let col = frame % self.columns;
        let row = frame / self.columns;

        surface.save();
        if self.flip_x || self.flip_y || self.rotation > 0.0 {
            let pivot_x = x + self.width / 2.0;
            let pivot_y = y + self.width / 2.0;
            surface.translate(pivot_x, pivot_y);
            surface.rotate(self.rotation.to_radians());
            surface.scale(
                if self.flip_x { -1.0 } else { 1.0 },
                if self.flip_y { -1.0 } else { 1.0 },
            );
            surface.translate(-pivot_x, -pivot_y);
        }
        surface.draw_image(
            &self.sheet,
            col as f32 * self.frame_width,
            row as f32 * self.frame_height,
            self.frame_width,
            self.frame_height,
            x,
            y,
            self.width,
            self.height,
        );
        surface.restore();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestSheet {
        width: u32,
        height: u32,
    }

    impl SheetImage for TestSheet {
        fn width(&self) -> u32 {
            self.width
        }
        fn height(&self) -> u32 {
            self.height
        }
    }

    struct CountingSurface {
        calls: usize,
    }

    impl DrawSurface for CountingSurface {
        type Image = TestSheet;

        fn save(&mut self) {
            self.calls += 1;
        }
        fn restore(&mut self) {
            self.calls += 1;
        }
        fn translate(&mut self, _dx: f32, _dy: f32) {
            self.calls += 1;
        }
        fn rotate(&mut self, _radians: f32) {
            self.calls += 1;
        }
        fn scale(&mut self, _sx: f32, _sy: f32) {
            self.calls += 1;
        }
        fn draw_image(
            &mut self,
            _image: &TestSheet,
            _src_x: f32,
            _src_y: f32,
            _src_w: f32,
            _src_h: f32,
            _dst_x: f32,
            _dst_y: f32,
            _dst_w: f32,
            _dst_h: f32,
        ) {
            self.calls += 1;
        }
    }

    fn sprite_4x2() -> AnimatedSprite<TestSheet> {
        AnimatedSprite::new(
            TestSheet {
                width: 64,
                height: 32,
            },
            4,
            2,
        )
    }

    #[test]
    fn test_geometry_defaults_from_sheet() {
        let sprite = sprite_4x2();
        assert_eq!(sprite.frame_width(), 16.0);
        assert_eq!(sprite.frame_height(), 16.0);
        assert_eq!(sprite.width, 16.0);
        assert_eq!(sprite.height, 16.0);
        assert_eq!(sprite.max_frames(), 7);
    }

    #[test]
    fn test_frame_size_override_resets_draw_size() {
        let sprite = sprite_4x2().with_frame_size(8.0, 4.0).with_draw_size(32.0, 16.0);
        assert_eq!(sprite.frame_width(), 8.0);
        assert_eq!(sprite.frame_height(), 4.0);
        assert_eq!(sprite.width, 32.0);
        assert_eq!(sprite.height, 16.0);
    }

    #[test]
    fn test_first_added_clip_becomes_active_and_autostarts() {
        let mut sprite = sprite_4x2();
        sprite
            .add_animation("walk", AnimationClip::new().with_frame_end(3))
            .unwrap();

        let clip = sprite.current_animation().unwrap();
        assert_eq!(clip.name, "walk");
        assert!(clip.has_started);
        assert!(clip.is_running);
    }

    #[test]
    fn test_first_added_clip_without_auto_start_stays_stopped() {
        let mut sprite = sprite_4x2();
        sprite
            .add_animation("idle", AnimationClip::new().with_auto_start(false))
            .unwrap();

        let clip = sprite.current_animation().unwrap();
        assert_eq!(clip.name, "idle");
        assert!(!clip.has_started);
    }

    #[test]
    fn test_frame_end_defaults_to_max_frames() {
        let mut sprite = sprite_4x2();
        sprite.add_animation("all", AnimationClip::new()).unwrap();
        assert_eq!(sprite.animation("all").unwrap().frame_end, Some(7));
    }

    #[test]
    fn test_duplicate_name_fails_and_registry_unchanged() {
        let mut sprite = sprite_4x2();
        sprite
            .add_animation("walk", AnimationClip::new().with_frame_end(3))
            .unwrap();

        let err = sprite
            .add_animation("walk", AnimationClip::new().with_frame_end(5))
            .unwrap_err();
        assert!(matches!(err, SpriteError::DuplicateName(name) if name == "walk"));
        assert_eq!(sprite.animation("walk").unwrap().frame_end, Some(3));
    }

    #[test]
    fn test_set_animation_unknown_name_fails() {
        let mut sprite = sprite_4x2();
        let err = sprite.set_animation("missing").unwrap_err();
        assert!(matches!(err, SpriteError::UnknownName(name) if name == "missing"));
    }

    #[test]
    fn test_second_clip_does_not_steal_active() {
        let mut sprite = sprite_4x2();
        sprite.add_animation("walk", AnimationClip::new()).unwrap();
        sprite.add_animation("idle", AnimationClip::new()).unwrap();

        assert_eq!(sprite.current_animation().unwrap().name, "walk");
        assert!(!sprite.animation("idle").unwrap().has_started);
    }

    #[test]
    fn test_switch_stops_old_and_starts_new() {
        let mut sprite = sprite_4x2();
        sprite
            .add_animation("walk", AnimationClip::new().with_frame_end(3))
            .unwrap();
        sprite.add_animation("idle", AnimationClip::new()).unwrap();

        sprite.current_animation_mut().unwrap().advance();
        assert_eq!(sprite.animation("walk").unwrap().current_step, 1);

        sprite.set_animation("idle").unwrap();
        let walk = sprite.animation("walk").unwrap();
        assert!(!walk.has_started);
        assert_eq!(walk.current_step, 0);
        let idle = sprite.current_animation().unwrap();
        assert_eq!(idle.name, "idle");
        assert!(idle.is_running);
    }

    #[test]
    fn test_reselecting_active_clip_is_idempotent() {
        let mut sprite = sprite_4x2();
        sprite
            .add_animation("walk", AnimationClip::new().with_frame_end(3))
            .unwrap();
        sprite.current_animation_mut().unwrap().advance();

        sprite.set_animation("walk").unwrap();
        let clip = sprite.current_animation().unwrap();
        assert_eq!(clip.current_step, 1);
        assert!(clip.is_running);
    }

    #[test]
    fn test_start_stop_forwarding_without_active_clip_is_noop() {
        let mut sprite = sprite_4x2();
        sprite.start_animation();
        sprite.stop_animation();
        assert!(sprite.current_animation().is_none());
    }

    #[test]
    fn test_draw_without_clip_fails_and_touches_no_surface() {
        let mut sprite = sprite_4x2();
        let mut surface = CountingSurface { calls: 0 };

        let err = sprite.draw(&mut surface, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, SpriteError::NoActiveAnimation));
        assert_eq!(surface.calls, 0);
    }

    #[test]
    fn test_remove_active_clip_clears_selection() {
        let mut sprite = sprite_4x2();
        sprite.add_animation("walk", AnimationClip::new()).unwrap();

        let removed = sprite.remove_animation("walk").unwrap();
        assert!(!removed.has_started);
        assert!(sprite.current_animation().is_none());
        assert!(sprite.current_frame().is_none());

        let mut surface = CountingSurface { calls: 0 };
        assert!(matches!(
            sprite.draw(&mut surface, 0.0, 0.0),
            Err(SpriteError::NoActiveAnimation)
        ));
    }

    #[test]
    fn test_remove_inactive_clip_keeps_selection() {
        let mut sprite = sprite_4x2();
        sprite.add_animation("walk", AnimationClip::new()).unwrap();
        sprite.add_animation("idle", AnimationClip::new()).unwrap();

        sprite.remove_animation("idle").unwrap();
        assert_eq!(sprite.current_animation().unwrap().name, "walk");
        assert!(matches!(
            sprite.remove_animation("idle"),
            Err(SpriteError::UnknownName(_))
        ));
    }

    #[test]
    fn test_add_clips_from_json_in_document_order() {
        let mut sprite = sprite_4x2();
        sprite
            .add_clips_from_json(
                r#"[
                    { "name": "walk", "frame_start": 0, "frame_end": 3, "delay": 50.0 },
                    { "name": "idle", "frame_start": 4, "auto_start": false }
                ]"#,
            )
            .unwrap();

        assert_eq!(sprite.current_animation().unwrap().name, "walk");
        let idle = sprite.animation("idle").unwrap();
        assert_eq!(idle.frame_start, 4);
        assert_eq!(idle.frame_end, Some(7));
        assert!(!idle.auto_start);
    }

    #[test]
    fn test_add_clips_from_json_rejects_garbage() {
        let mut sprite = sprite_4x2();
        assert!(matches!(
            sprite.add_clips_from_json("not json"),
            Err(SpriteError::ClipParse(_))
        ));
    }
}
