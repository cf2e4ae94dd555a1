//! # Pixel Surface
//!
//! The raster bitmap the whiteboard draws into, plus the handful of primitives everything else is
//! built from: flat fills, region copies, round-capped line segments, text stamps, and PNG
//! encoding.
//!
//! Like a 2D canvas context, the surface carries an ambient [`DrawStyle`] with a save/restore
//! stack. Reallocating a surface (see [`crate::resize`]) yields the *default* style, so whoever
//! reallocates must re-apply the stroke parameters.

pub mod font;

use crate::{color::Color, tools::StrokeParams};
use image::{imageops, RgbaImage};

pub const DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}
impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}
impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum LineCap {
    /// Ends exactly at the endpoints. Zero-length segments draw nothing.
    #[default]
    Butt,
    Round,
    /// Extends past the endpoints by half the width.
    Square,
}

/// Ambient drawing attributes, mirroring those of a 2D canvas context.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct DrawStyle {
    pub stroke: Color,
    pub fill: Color,
    pub line_width: u32,
    pub line_cap: LineCap,
}
impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            stroke: Color::BLACK,
            fill: Color::BLACK,
            line_width: 1,
            line_cap: LineCap::Butt,
        }
    }
}

/// An immutable copy of a rectangular area of a surface.
#[derive(Clone, PartialEq, Eq)]
pub struct RegionData {
    pixels: RgbaImage,
}
impl RegionData {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixels.get_pixel_checked(x, y).copied().map(Into::into)
    }
}
impl std::fmt::Debug for RegionData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't dump megabytes of pixels into the log.
        f.debug_struct("RegionData")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SurfaceError {
    #[error("surface has zero area")]
    Uninitialized,
    #[error("not a base64 image data url")]
    NotADataUrl,
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub struct PixelSurface {
    pixels: RgbaImage,
    style: DrawStyle,
    saved_styles: Vec<DrawStyle>,
}
impl Default for PixelSurface {
    /// An uninitialized, zero-area surface.
    fn default() -> Self {
        Self::new(0, 0)
    }
}
impl PixelSurface {
    /// Allocate a transparent surface with the default draw style.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            style: DrawStyle::default(),
            saved_styles: Vec::new(),
        }
    }
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
    /// A surface with zero width or height has not been laid out yet.
    /// Every entry point of the whiteboard treats this as "do nothing".
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.width() != 0 && self.height() != 0
    }
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixels.get_pixel_checked(x, y).copied().map(Into::into)
    }
    #[must_use]
    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }
    #[must_use]
    pub fn style(&self) -> DrawStyle {
        self.style
    }
    /// Push the current draw style, to be restored by [`Self::restore`].
    pub fn save(&mut self) {
        self.saved_styles.push(self.style);
    }
    /// Pop the last saved draw style. Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if let Some(style) = self.saved_styles.pop() {
            self.style = style;
        }
    }
    /// Set the ambient stroke attributes for freehand drawing: color, width, round caps.
    pub fn set_stroke_style(&mut self, params: StrokeParams) {
        self.style.stroke = params.color;
        self.style.line_width = params.width;
        self.style.line_cap = LineCap::Round;
    }
    /// Whether every pixel is exactly `background`.
    #[must_use]
    pub fn is_blank(&self, background: Color) -> bool {
        self.colors().iter().all(|&px| px == background)
    }
    pub fn fill_background(&mut self, color: Color) {
        bytemuck::cast_slice_mut::<u8, Color>(&mut self.pixels).fill(color);
    }
    /// The pixel buffer viewed as packed colors, row-major.
    #[must_use]
    pub fn colors(&self) -> &[Color] {
        bytemuck::cast_slice::<u8, Color>(self.pixels.as_raw())
    }
    /// Copy out a rectangle, clipped to the surface. `None` if the clipped area is empty.
    #[must_use]
    pub fn read_region(&self, x: u32, y: u32, width: u32, height: u32) -> Option<RegionData> {
        if width == 0 || height == 0 || x >= self.width() || y >= self.height() {
            return None;
        }
        let pixels = imageops::crop_imm(&self.pixels, x, y, width, height).to_image();
        Some(RegionData { pixels })
    }
    /// Copy the whole surface.
    #[must_use]
    pub fn read_all(&self) -> Option<RegionData> {
        self.read_region(0, 0, self.width(), self.height())
    }
    /// Replace pixels with previously read data, clipped to the surface. No blending occurs.
    pub fn write_region(&mut self, data: &RegionData, x: u32, y: u32) {
        imageops::replace(&mut self.pixels, &data.pixels, i64::from(x), i64::from(y));
    }
    /// Draw a line segment in `color`, `width` pixels wide, using the ambient line cap.
    ///
    /// Coverage is aliased: a pixel is painted when its center lies within `width / 2` of the
    /// segment, so the same stroke always paints the same pixels. Opaque colors replace what's
    /// beneath; translucent ones composite source-over.
    pub fn stroke_segment(&mut self, from: Point, to: Point, color: Color, width: u32) {
        self.style.stroke = color;
        self.style.line_width = width;
        if !self.is_initialized() {
            return;
        }
        // Thin lines still cover the pixel the segment passes through.
        let radius = (width as f32 / 2.0).max(0.5);
        let cap = self.style.line_cap;

        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let len_sq = dx * dx + dy * dy;
        let len = len_sq.sqrt();
        // How far past each endpoint the shape extends, along the segment direction.
        let extension = match cap {
            LineCap::Butt => 0.0,
            LineCap::Round | LineCap::Square => radius,
        };
        if len_sq == 0.0 && cap == LineCap::Butt {
            return;
        }

        let min_x = (from.x.min(to.x) - radius - 1.0).floor().max(0.0);
        let min_y = (from.y.min(to.y) - radius - 1.0).floor().max(0.0);
        let max_x = (from.x.max(to.x) + radius + 1.0).ceil().min(self.width() as f32);
        let max_y = (from.y.max(to.y) + radius + 1.0).ceil().min(self.height() as f32);
        if min_x >= max_x || min_y >= max_y {
            return;
        }

        let radius_sq = radius * radius;
        for py in min_y as u32..max_y as u32 {
            for px in min_x as u32..max_x as u32 {
                let center = Point::new(px as f32 + 0.5, py as f32 + 0.5);
                let (cx, cy) = (center.x - from.x, center.y - from.y);
                let inside = if len_sq == 0.0 {
                    match cap {
                        LineCap::Round => cx * cx + cy * cy <= radius_sq,
                        LineCap::Square => cx.abs() <= radius && cy.abs() <= radius,
                        LineCap::Butt => false,
                    }
                } else {
                    // Distance along the segment, and perpendicular to it.
                    let along = (cx * dx + cy * dy) / len;
                    let across = (cx * dy - cy * dx).abs() / len;
                    match cap {
                        LineCap::Round => {
                            let t = along.clamp(0.0, len);
                            let (nx, ny) = (cx - dx * t / len, cy - dy * t / len);
                            nx * nx + ny * ny <= radius_sq
                        }
                        LineCap::Butt | LineCap::Square => {
                            across <= radius && along >= -extension && along <= len + extension
                        }
                    }
                };
                if inside {
                    self.blend_pixel(px, py, color);
                }
            }
        }
    }
    /// Stamp one line of text, top-left anchored at `(x, y)`, using the fixed pixel font.
    /// The ambient draw style is left as it was found.
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, color: Color) {
        if !self.is_initialized() || text.is_empty() {
            return;
        }
        self.save();
        self.style.fill = color;

        let origin_x = x.round() as i64;
        let origin_y = y.round() as i64;
        let scale = i64::from(font::SCALE);
        let mut pen_x = origin_x;
        for c in text.chars() {
            for (row, bits) in font::glyph(c).into_iter().enumerate() {
                for col in 0..font::GLYPH_WIDTH {
                    if bits & (1 << (font::GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let cell_x = pen_x + i64::from(col) * scale;
                    let cell_y = origin_y + row as i64 * scale;
                    self.fill_block(cell_x, cell_y, scale, self.style.fill);
                }
            }
            pen_x += i64::from(font::advance());
        }

        self.restore();
    }
    /// Draw `image` stretched to cover the whole surface, compositing source-over.
    pub fn draw_image_scaled(&mut self, image: &RgbaImage) {
        if !self.is_initialized() || image.width() == 0 || image.height() == 0 {
            return;
        }
        let scaled;
        let source = if image.dimensions() == self.dimensions() {
            image
        } else {
            scaled = imageops::resize(
                image,
                self.width(),
                self.height(),
                imageops::FilterType::Nearest,
            );
            &scaled
        };
        for (dst, src) in self.pixels.pixels_mut().zip(source.pixels()) {
            *dst = Color::from(*src).over(Color::from(*dst)).into();
        }
    }
    /// Encode the current content as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, SurfaceError> {
        use image::ImageEncoder;
        if !self.is_initialized() {
            return Err(SurfaceError::Uninitialized);
        }
        let mut bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut bytes).write_image(
            self.pixels.as_raw(),
            self.width(),
            self.height(),
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(bytes)
    }
    /// Encode the current content as a `data:image/png;base64,` URL.
    pub fn serialize_to_image(&self) -> Result<String, SurfaceError> {
        use base64::Engine;
        let png = self.encode_png()?;
        let mut url = String::from(DATA_URL_PREFIX);
        base64::engine::general_purpose::STANDARD.encode_string(png, &mut url);
        Ok(url)
    }
    fn blend_pixel(&mut self, x: u32, y: u32, color: Color) {
        if let Some(px) = self.pixels.get_pixel_mut_checked(x, y) {
            *px = color.over(Color::from(*px)).into();
        }
    }
    /// Fill a `size`x`size` block, clipping anything off-surface.
    fn fill_block(&mut self, x: i64, y: i64, size: i64, color: Color) {
        for by in y..y + size {
            for bx in x..x + size {
                let (Ok(bx), Ok(by)) = (u32::try_from(bx), u32::try_from(by)) else {
                    continue;
                };
                self.blend_pixel(bx, by, color);
            }
        }
    }
}

/// Decode a `data:image/<any>;base64,` URL into pixels.
pub fn decode_data_url(url: &str) -> Result<RgbaImage, SurfaceError> {
    use base64::Engine;
    let payload = url
        .strip_prefix("data:image/")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or(SurfaceError::NotADataUrl)?;
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload)?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}
