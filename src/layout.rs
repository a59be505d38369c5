//! The layout engine: turns a configuration and a clamped value into a flat,
//! ordered list of drawable primitives in normalized gauge coordinates.
//!
//! The gauge is centered on the origin with the arc on the unit circle. All
//! geometry fits inside the square viewport `[-1.3, 1.3]²`, y pointing up.
//! Stroke widths, marker diameters and font sizes are screen pixels.

use serde::Serialize;

use crate::config::{band_for_value, Color, ColorBand, GaugeConfig, LabelColor};
use crate::error::{GaugeError, Result};
use crate::format::ValueFormat;
use crate::mapping::{linspace, AngularMapping, GaugeValue};

// ============================================================================
// DESIGN CONSTANTS
// ============================================================================

pub const VIEWPORT_EXTENT: f64 = 1.3;

pub const ARC_RADIUS: f64 = 1.0;
pub const ARC_SAMPLES: usize = 1000;
pub const ARC_SMOOTHING: f64 = 1.3;
pub const ARC_WIDTH_SCALE: f64 = 30.0;

pub const FACE_RADIUS: f64 = 0.85;
pub const FACE_SAMPLES: usize = 500;
const FACE_FILL: Color = Color::rgba(200, 200, 200, 0.1);
const FACE_STROKE: Color = Color::rgba(200, 200, 200, 0.2);

pub const MAJOR_TICK_COUNT: usize = 6;
pub const MINOR_TICKS_PER_INTERVAL: usize = 5;
pub const TICK_OUTER_RADIUS: f64 = 1.0;
pub const MAJOR_TICK_INNER_RADIUS: f64 = 0.9;
pub const MINOR_TICK_INNER_RADIUS: f64 = 0.95;
const MAJOR_TICK_STROKE: Stroke = Stroke::new(Color::rgba(0, 0, 0, 0.7), 2.0);
const MINOR_TICK_STROKE: Stroke = Stroke::new(Color::rgba(0, 0, 0, 0.3), 1.0);

pub const NEEDLE_LENGTH: f64 = 0.85;
pub const NEEDLE_BASE_SCALE: f64 = 0.02;
pub const CENTER_MARKER_SCALE: f64 = 5.0;
const CENTER_MARKER_OUTLINE: Stroke = Stroke::new(Color::rgba(255, 255, 255, 0.8), 1.0);

pub const VALUE_LABEL_Y: f64 = -0.6;

// ============================================================================
// PRIMITIVES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` along `angle` (radians).
    pub fn polar(radius: f64, angle: f64) -> Self {
        Self::new(radius * angle.cos(), radius * angle.sin())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

impl Stroke {
    pub const fn new(color: Color, width: f64) -> Self {
        Self { color, width }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub family: String,
    pub size: f32,
    pub color: Color,
    pub weight: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelRole {
    Tick,
    Value,
}

/// One drawable element. Text labels are anchored at their center.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    /// Filled background disc behind the arc.
    Face {
        points: Vec<Point>,
        fill: Color,
        stroke: Stroke,
    },
    /// A color band, sampled densely enough to render as a smooth curve.
    /// `start_deg` and `end_deg` are in degrees; `points` already carries the
    /// sampled geometry.
    Arc {
        radius: f64,
        start_deg: f64,
        end_deg: f64,
        points: Vec<Point>,
        stroke: Stroke,
        smoothing: f64,
    },
    TickSegment {
        inner: Point,
        outer: Point,
        major: bool,
        stroke: Stroke,
    },
    /// Closed triangle; the first and last points coincide.
    NeedlePolygon {
        points: Vec<Point>,
        fill: Color,
        stroke: Stroke,
    },
    CenterMarker {
        center: Point,
        diameter: f64,
        fill: Color,
        outline: Stroke,
    },
    TextLabel {
        position: Point,
        text: String,
        font: Font,
        role: LabelRole,
    },
}

/// The square region all primitives are laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub extent: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            extent: VIEWPORT_EXTENT,
        }
    }
}

impl Viewport {
    /// Uniform scale and offset that fit the viewport into a `width` x
    /// `height` pixel surface, centered, with y flipped to point down.
    pub fn pixel_transform(&self, width: usize, height: usize) -> PixelTransform {
        let side = width.min(height) as f64;
        PixelTransform {
            scale: side / (2.0 * self.extent),
            cx: width as f64 / 2.0,
            cy: height as f64 / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelTransform {
    pub scale: f64,
    pub cx: f64,
    pub cy: f64,
}

impl PixelTransform {
    pub fn apply(&self, p: Point) -> (f64, f64) {
        (self.cx + p.x * self.scale, self.cy - p.y * self.scale)
    }
}

/// A complete drawing, rebuilt from scratch for every value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub viewport: Viewport,
    pub primitives: Vec<Primitive>,
}

impl Scene {
    fn new() -> Self {
        Self {
            viewport: Viewport::default(),
            primitives: Vec::new(),
        }
    }

    fn add(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter()
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// Lay out a full gauge. Fails only when the value label asks for the
/// "auto" color and `value` lies outside every color band.
pub fn layout(
    config: &GaugeConfig,
    mapping: &AngularMapping,
    format: &ValueFormat,
    value: GaugeValue,
) -> Result<Scene> {
    let mut scene = Scene::new();
    let bands = config.effective_bands();

    add_face(&mut scene);
    for band in bands.iter() {
        add_band_arc(&mut scene, mapping, band, config.gauge_thickness);
    }
    add_ticks(&mut scene, mapping, config);
    add_needle(&mut scene, mapping, value.get(), config);
    if config.show_value {
        let color = resolve_label_color(config.value_font_color, &bands, value.get())?;
        add_value_label(&mut scene, config, format, value.get(), color);
    }

    log::debug!(
        "laid out {} primitives for value {} at {:.2}°",
        scene.len(),
        value.get(),
        mapping.angle_deg(value.get())
    );
    Ok(scene)
}

/// Resolve the value-label color without touching the configuration.
pub fn resolve_label_color(label: LabelColor, bands: &[ColorBand], value: f64) -> Result<Color> {
    match label {
        LabelColor::Fixed(color) => Ok(color),
        LabelColor::Auto => band_for_value(bands, value)
            .map(|band| band.color)
            .ok_or(GaugeError::NoBandForValue { value }),
    }
}

fn sample_arc(radius: f64, start: f64, end: f64, samples: usize) -> Vec<Point> {
    linspace(start, end, samples)
        .into_iter()
        .map(|theta| Point::polar(radius, theta))
        .collect()
}

fn add_face(scene: &mut Scene) {
    scene.add(Primitive::Face {
        points: sample_arc(FACE_RADIUS, 0.0, std::f64::consts::TAU, FACE_SAMPLES),
        fill: FACE_FILL,
        stroke: Stroke::new(FACE_STROKE, 1.0),
    });
}

fn add_band_arc(scene: &mut Scene, mapping: &AngularMapping, band: &ColorBand, thickness: f64) {
    let start = mapping.angle_deg(band.min);
    let end = mapping.angle_deg(band.max);
    scene.add(Primitive::Arc {
        radius: ARC_RADIUS,
        start_deg: start,
        end_deg: end,
        points: sample_arc(ARC_RADIUS, start.to_radians(), end.to_radians(), ARC_SAMPLES),
        stroke: Stroke::new(band.color, thickness * ARC_WIDTH_SCALE),
        smoothing: ARC_SMOOTHING,
    });
}

/// Domain values of the major ticks.
pub fn major_tick_values(mapping: &AngularMapping) -> Vec<f64> {
    linspace(mapping.domain.min(), mapping.domain.max(), MAJOR_TICK_COUNT)
}

fn tick_segment(angle: f64, inner_radius: f64, major: bool, stroke: Stroke) -> Primitive {
    Primitive::TickSegment {
        inner: Point::polar(inner_radius, angle),
        outer: Point::polar(TICK_OUTER_RADIUS, angle),
        major,
        stroke,
    }
}

fn add_ticks(scene: &mut Scene, mapping: &AngularMapping, config: &GaugeConfig) {
    let majors = major_tick_values(mapping);

    for pair in majors.windows(2) {
        let minors = linspace(pair[0], pair[1], MINOR_TICKS_PER_INTERVAL + 2);
        for &value in &minors[1..=MINOR_TICKS_PER_INTERVAL] {
            scene.add(tick_segment(
                mapping.angle_rad(value),
                MINOR_TICK_INNER_RADIUS,
                false,
                MINOR_TICK_STROKE,
            ));
        }
    }

    let font = Font {
        family: config.tick_family().to_string(),
        size: config.tick_font_size,
        color: config.tick_font_color,
        weight: None,
    };
    for &value in &majors {
        let angle = mapping.angle_rad(value);
        scene.add(tick_segment(angle, MAJOR_TICK_INNER_RADIUS, true, MAJOR_TICK_STROKE));
        scene.add(Primitive::TextLabel {
            position: Point::polar(config.tick_label_radius, angle),
            text: format!("{:.0}", value),
            font: font.clone(),
            role: LabelRole::Tick,
        });
    }
}

/// Tip and the two base corners of the needle for `value`.
pub fn needle_points(mapping: &AngularMapping, value: f64, needle_thickness: f64) -> [Point; 3] {
    let angle = mapping.angle_rad(value);
    let half_base = needle_thickness * NEEDLE_BASE_SCALE;
    let perpendicular = angle + std::f64::consts::FRAC_PI_2;
    [
        Point::polar(NEEDLE_LENGTH, angle),
        Point::polar(half_base, perpendicular),
        Point::polar(-half_base, perpendicular),
    ]
}

fn add_needle(scene: &mut Scene, mapping: &AngularMapping, value: f64, config: &GaugeConfig) {
    let [tip, base1, base2] = needle_points(mapping, value, config.needle_thickness);
    scene.add(Primitive::NeedlePolygon {
        points: vec![base1, tip, base2, base1],
        fill: config.needle_color,
        stroke: Stroke::new(config.needle_color, 1.0),
    });
    scene.add(Primitive::CenterMarker {
        center: Point::ORIGIN,
        diameter: config.needle_thickness * CENTER_MARKER_SCALE,
        fill: config.needle_color,
        outline: CENTER_MARKER_OUTLINE,
    });
}

fn add_value_label(
    scene: &mut Scene,
    config: &GaugeConfig,
    format: &ValueFormat,
    value: f64,
    color: Color,
) {
    scene.add(Primitive::TextLabel {
        position: Point::new(0.0, VALUE_LABEL_Y),
        text: format.render(value),
        font: Font {
            family: config.value_font_family.clone(),
            size: config.value_font_size,
            color,
            weight: Some(config.value_font_weight.clone()),
        },
        role: LabelRole::Value,
    });
}
