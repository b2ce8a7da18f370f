//! Capabilities the host must provide: the spritesheet image handle and the
//! 2D drawing surface.
//!
//! Both are opaque to this crate. The image is consulted once, at sprite
//! construction, to derive default frame geometry; the surface receives
//! append-only drawing calls and is never owned or structurally mutated.

/// Opaque spritesheet handle exposing its pixel dimensions.
pub trait SheetImage {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// Immediate-mode 2D raster surface.
///
/// The sprite issues `save`/`restore` as a scoped pair around every draw and
/// only applies `translate`/`rotate`/`scale` in between when a transform is
/// active. Implementations map these onto their backend's matrix stack; a
/// canvas-style context maps one-to-one.
pub trait DrawSurface {
    /// The image type this surface can blit from.
    type Image: SheetImage;

    /// Push the current transform state.
    fn save(&mut self);
    /// Pop back to the most recently saved transform state.
    fn restore(&mut self);
    /// Translate the origin by `(dx, dy)`.
    fn translate(&mut self, dx: f32, dy: f32);
    /// Rotate about the current origin. Radians.
    fn rotate(&mut self, radians: f32);
    /// Scale about the current origin; negative factors mirror.
    fn scale(&mut self, sx: f32, sy: f32);
    /// Blit the `(src_x, src_y, src_w, src_h)` sub-rectangle of `image`
    /// into the destination rectangle `(dst_x, dst_y, dst_w, dst_h)`.
    #[allow(clippy::too_many_arguments)]
    fn draw_image(
        &mut self,
        image: &Self::Image,
        src_x: f32,
        src_y: f32,
        src_w: f32,
        src_h: f32,
        dst_x: f32,
        dst_y: f32,
        dst_w: f32,
        dst_h: f32,
    );
}
