//! Software rasterizer for gauge scenes.
//!
//! Paints a [`Scene`] into an RGBA8 frame (the layout `pixels` expects) with
//! simple anti-aliasing. Used by the live viewer and for PNG export.

use std::io::Write;

use rusttype::{point, Font, PositionedGlyph, Scale};
use thiserror::Error;

use crate::config::Color;
use crate::layout::{PixelTransform, Point, Primitive, Scene, Stroke};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("font data could not be parsed")]
    InvalidFont,
    #[error("failed to read font file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode png: {0}")]
    Png(#[from] png::EncodingError),
}

// ============================================================================
// CANVAS
// ============================================================================

pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        // Never index past the buffer, even if it lags behind a resize.
        let height = height.min(frame.len() / (width * 4).max(1));
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    /// Blend `color` over the pixel at (`x`, `y`) with extra `coverage`.
    fn blend(&mut self, x: i64, y: i64, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let a = (color.a * coverage).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let src = [color.r, color.g, color.b];
        for (dst, src) in self.frame[idx..idx + 3].iter_mut().zip(src) {
            *dst = (f32::from(src) * a + f32::from(*dst) * (1.0 - a)).round() as u8;
        }
        self.frame[idx + 3] = 0xff;
    }

    /// Clip an inclusive pixel box to the canvas. The result may be empty.
    fn clip(&self, min_x: i64, max_x: i64, min_y: i64, max_y: i64) -> (i64, i64, i64, i64) {
        (
            min_x.max(0),
            max_x.min(self.width as i64 - 1),
            min_y.max(0),
            max_y.min(self.height as i64 - 1),
        )
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let idx = (y * self.width + x) * 4;
        [
            self.frame[idx],
            self.frame[idx + 1],
            self.frame[idx + 2],
            self.frame[idx + 3],
        ]
    }
}

// ============================================================================
// RENDERER
// ============================================================================

pub struct Renderer {
    font: Option<Font<'static>>,
    background: Color,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            font: None,
            background: Color::WHITE,
        }
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font_bytes(mut self, data: Vec<u8>) -> Result<Self, RenderError> {
        self.font = Some(Font::try_from_vec(data).ok_or(RenderError::InvalidFont)?);
        Ok(self)
    }

    pub fn with_font_file(self, path: &std::path::Path) -> Result<Self, RenderError> {
        self.with_font_bytes(std::fs::read(path)?)
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn render(&self, scene: &Scene, canvas: &mut Canvas) {
        let transform = scene.viewport.pixel_transform(canvas.width, canvas.height);
        canvas.clear(self.background);

        let mut skipped_text = 0;
        for primitive in scene.iter() {
            match primitive {
                Primitive::Face {
                    points,
                    fill,
                    stroke,
                }
                | Primitive::NeedlePolygon {
                    points,
                    fill,
                    stroke,
                } => {
                    let pts = to_pixels(&transform, points);
                    fill_polygon(canvas, &pts, *fill);
                    draw_polyline(canvas, &pts, *stroke);
                }
                Primitive::Arc { points, stroke, .. } => {
                    draw_polyline(canvas, &to_pixels(&transform, points), *stroke);
                }
                Primitive::TickSegment {
                    inner,
                    outer,
                    stroke,
                    ..
                } => {
                    draw_polyline(canvas, &to_pixels(&transform, &[*inner, *outer]), *stroke);
                }
                Primitive::CenterMarker {
                    center,
                    diameter,
                    fill,
                    outline,
                } => {
                    let (cx, cy) = transform.apply(*center);
                    let radius = diameter / 2.0;
                    draw_circle(canvas, cx, cy, radius, *fill);
                    draw_ring(canvas, cx, cy, radius, *outline);
                }
                Primitive::TextLabel {
                    position,
                    text,
                    font,
                    ..
                } => match &self.font {
                    Some(face) => {
                        let (x, y) = transform.apply(*position);
                        draw_text(canvas, x, y, text, face, Scale::uniform(font.size), font.color);
                    }
                    None => skipped_text += 1,
                },
            }
        }
        if skipped_text > 0 {
            log::debug!("no font loaded, skipped {skipped_text} text labels");
        }
    }

    /// Render into a fresh RGBA8 buffer.
    pub fn render_to_rgba(&self, scene: &Scene, width: usize, height: usize) -> Vec<u8> {
        let mut frame = vec![0u8; width * height * 4];
        let mut canvas = Canvas::new(&mut frame, width, height);
        self.render(scene, &mut canvas);
        frame
    }

    pub fn write_png<W: Write>(
        &self,
        w: W,
        scene: &Scene,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let frame = self.render_to_rgba(scene, width as usize, height as usize);
        write_png(w, width, height, &frame)?;
        Ok(())
    }
}

fn write_png<W: Write>(w: W, width: u32, height: u32, rgba: &[u8]) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgba)
}

fn to_pixels(transform: &PixelTransform, points: &[Point]) -> Vec<(f64, f64)> {
    points.iter().map(|p| transform.apply(*p)).collect()
}

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

fn draw_thick_line_aa(canvas: &mut Canvas, (x0, y0): (f64, f64), (x1, y1): (f64, f64), stroke: Stroke) {
    let half = stroke.width / 2.0;
    let pad = half.ceil() + 1.0;
    let (min_x, max_x, min_y, max_y) = canvas.clip(
        (x0.min(x1) - pad).floor() as i64,
        (x0.max(x1) + pad).ceil() as i64,
        (y0.min(y1) - pad).floor() as i64,
        (y0.max(y1) + pad).ceil() as i64,
    );
    let dx = x1 - x0;
    let dy = y1 - y0;
    let len_sq = dx * dx + dy * dy;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = x as f64 - x0;
            let py = y as f64 - y0;
            let t = if len_sq > 0.0 {
                ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let dist = (px - t * dx).hypot(py - t * dy);
            let aa = (1.0 - (dist - half).clamp(0.0, 1.0)).clamp(0.0, 1.0);
            if aa > 0.01 {
                canvas.blend(x, y, stroke.color, aa as f32);
            }
        }
    }
}

fn draw_polyline(canvas: &mut Canvas, points: &[(f64, f64)], stroke: Stroke) {
    if stroke.width <= 0.0 {
        return;
    }
    for segment in points.windows(2) {
        draw_thick_line_aa(canvas, segment[0], segment[1], stroke);
    }
}

/// Even-odd scanline fill, sampling at pixel centers.
fn fill_polygon(canvas: &mut Canvas, points: &[(f64, f64)], color: Color) {
    if points.len() < 3 {
        return;
    }
    let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min).floor() as i64;
    let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max).ceil() as i64;
    let mut crossings: Vec<f64> = Vec::new();
    let (_, _, min_y, max_y) = canvas.clip(0, 0, min_y, max_y);
    for y in min_y..=max_y {
        let sy = y as f64;
        crossings.clear();
        for i in 0..points.len() {
            let (ax, ay) = points[i];
            let (bx, by) = points[(i + 1) % points.len()];
            if (ay <= sy && by > sy) || (by <= sy && ay > sy) {
                crossings.push(ax + (sy - ay) / (by - ay) * (bx - ax));
            }
        }
        crossings.sort_by(f64::total_cmp);
        for span in crossings.chunks_exact(2) {
            let start = (span[0].ceil() as i64).max(0);
            let end = (span[1].floor() as i64).min(canvas.width as i64 - 1);
            for x in start..=end {
                canvas.blend(x, y, color, 1.0);
            }
        }
    }
}

fn draw_circle(canvas: &mut Canvas, cx: f64, cy: f64, radius: f64, color: Color) {
    let reach = radius.ceil() as i64 + 1;
    let (icx, icy) = (cx.round() as i64, cy.round() as i64);
    let (min_x, max_x, min_y, max_y) =
        canvas.clip(icx - reach, icx + reach, icy - reach, icy + reach);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dist = (x as f64 - cx).hypot(y as f64 - cy);
            let aa = if dist > radius {
                1.0 - (dist - radius).min(1.0)
            } else {
                1.0
            };
            if aa > 0.0 {
                canvas.blend(x, y, color, aa as f32);
            }
        }
    }
}

fn draw_ring(canvas: &mut Canvas, cx: f64, cy: f64, radius: f64, stroke: Stroke) {
    let half = stroke.width / 2.0;
    let reach = (radius + half).ceil() as i64 + 1;
    let (icx, icy) = (cx.round() as i64, cy.round() as i64);
    let (min_x, max_x, min_y, max_y) =
        canvas.clip(icx - reach, icx + reach, icy - reach, icy + reach);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dist = (x as f64 - cx).hypot(y as f64 - cy);
            let aa = 1.0 - ((dist - radius).abs() - half).clamp(0.0, 1.0);
            if aa > 0.01 {
                canvas.blend(x, y, stroke.color, aa as f32);
            }
        }
    }
}

/// Draw `text` centered on (`x`, `y`).
fn draw_text(canvas: &mut Canvas, x: f64, y: f64, text: &str, font: &Font, scale: Scale, color: Color) {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .collect();
    let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |(min_x, max_x, min_y, max_y), bb| {
            (
                min_x.min(bb.min.x),
                max_x.max(bb.max.x),
                min_y.min(bb.min.y),
                max_y.max(bb.max.y),
            )
        },
    );
    if min_x >= max_x || min_y >= max_y {
        return;
    }
    let offset_x = x.round() as i64 - i64::from(max_x - min_x) / 2;
    let offset_y = y.round() as i64 - i64::from(max_y - min_y) / 2;
    for glyph in &glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = offset_x + i64::from(gx) + i64::from(bb.min.x - min_x);
                let py = offset_y + i64::from(gy) + i64::from(bb.min.y - min_y);
                canvas.blend(px, py, color, v);
            });
        }
    }
}
