//! Turns the retained patches of an [`Axes`] into an RGBA frame.

use crate::canvas::Axes;
use crate::color::{contrasting_text_color, parse_color};
use ab_glyph::{Font, FontVec, PxScale};
use anyhow::{Context, Result};
use driving_common::{FigureConfig, Patch, Rgba, Shape, Vec2};
use image::{ImageBuffer, Rgba as Pixel, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_hollow_polygon_mut, draw_line_segment_mut,
    draw_polygon_mut, draw_text_mut,
};
use imageproc::point::Point;
use std::path::Path;

/// Pixel size and background of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Figure {
    pub width_px: u32,
    pub height_px: u32,
    pub background: Rgba,
}

impl Figure {
    pub fn new(width_px: u32, height_px: u32, background: Rgba) -> Self {
        Figure { width_px, height_px, background }
    }

    pub fn from_config(config: &FigureConfig) -> Self {
        let (width_px, height_px) = config.pixel_size();
        Figure::new(width_px, height_px, parse_color(&config.background))
    }
}

impl Default for Figure {
    /// 8x6 inches at 100 dpi on white.
    fn default() -> Self {
        Figure::new(800, 600, [255, 255, 255, 255])
    }
}

/// Maps world coordinates onto pixels, origin bottom-left.
#[derive(Debug, Clone, Copy)]
struct Transform {
    x0: f32,
    y0: f32,
    sx: f32,
    sy: f32,
    height: f32,
}

impl Transform {
    fn new(axes: &Axes, figure: &Figure) -> Self {
        let (x0, x1) = axes.xlim();
        let (y0, y1) = axes.ylim();
        let span_x = if (x1 - x0).abs() > f32::EPSILON { x1 - x0 } else { 1.0 };
        let span_y = if (y1 - y0).abs() > f32::EPSILON { y1 - y0 } else { 1.0 };
        Transform {
            x0,
            y0,
            sx: figure.width_px as f32 / span_x,
            sy: figure.height_px as f32 / span_y,
            height: figure.height_px as f32,
        }
    }

    fn to_px(&self, p: Vec2) -> (f32, f32) {
        ((p.x - self.x0) * self.sx, self.height - (p.y - self.y0) * self.sy)
    }

    fn to_point(&self, p: Vec2) -> Point<i32> {
        let (x, y) = self.to_px(p);
        Point::new(x.round() as i32, y.round() as i32)
    }

    /// Pixels per world unit for lengths that must stay isotropic.
    fn radius_px(&self, r: f32) -> i32 {
        (r * self.sx.abs().min(self.sy.abs())).round() as i32
    }
}

/// Rasterizes `axes` into a fresh frame of the figure's size.
pub fn render(axes: &Axes, figure: &Figure) -> RgbaImage {
    let mut image = ImageBuffer::from_pixel(figure.width_px, figure.height_px, Pixel(figure.background));
    let transform = Transform::new(axes, figure);

    for patch in axes.draw_order() {
        draw_patch(&mut image, &transform, patch);
    }

    image
}

/// Reads a TrueType/OpenType font for frame labels.
pub fn load_font<P: AsRef<Path>>(path: P) -> Result<FontVec> {
    let path = path.as_ref();
    let data = std::fs::read(path).with_context(|| format!("Failed to read font file {}", path.display()))?;
    FontVec::try_from_vec(data).map_err(|e| anyhow::anyhow!("Failed to parse font {}: {}", path.display(), e))
}

/// Draws `text` in the top-left corner in a color that contrasts with the background.
pub fn draw_label<F: Font>(image: &mut RgbaImage, font: &F, background: Rgba, text: &str) {
    let color = contrasting_text_color(background);
    draw_text_mut(image, Pixel(color), 10, 10, PxScale::from(20.0), font, text);
}

fn draw_patch(image: &mut RgbaImage, transform: &Transform, patch: &Patch) {
    let style = patch.style;
    match &patch.shape {
        Shape::Circle { center, radius } => {
            let (x, y) = transform.to_px(*center);
            let center_px = (x.round() as i32, y.round() as i32);
            let radius_px = transform.radius_px(*radius).max(1);
            if let Some(fill) = style.fill {
                draw_filled_circle_mut(image, center_px, radius_px, Pixel(fill));
            }
            if let Some(edge) = style.edge {
                draw_hollow_circle_mut(image, center_px, radius_px, Pixel(edge));
            }
        }
        Shape::Line { from, to } => {
            let color = style.edge.or(style.fill);
            if let Some(color) = color {
                draw_line_segment_mut(image, transform.to_px(*from), transform.to_px(*to), Pixel(color));
            }
        }
        Shape::Rect { .. } | Shape::Polygon { .. } => {
            let Some(outline) = patch.shape.outline() else {
                return;
            };
            let points = pixel_polygon(transform, &outline);
            match points.len() {
                0 => {}
                1 => {
                    let p = points[0];
                    if let (Some(color), true) = (style.fill.or(style.edge), in_bounds(image, p)) {
                        image.put_pixel(p.x as u32, p.y as u32, Pixel(color));
                    }
                }
                2 => {
                    // Collapsed to a segment at this resolution
                    if let Some(color) = style.fill.or(style.edge) {
                        let a = (points[0].x as f32, points[0].y as f32);
                        let b = (points[1].x as f32, points[1].y as f32);
                        draw_line_segment_mut(image, a, b, Pixel(color));
                    }
                }
                _ => {
                    if let Some(fill) = style.fill {
                        draw_polygon_mut(image, &points, Pixel(fill));
                    }
                    if let Some(edge) = style.edge {
                        let hollow: Vec<Point<f32>> =
                            points.iter().map(|p| Point::new(p.x as f32, p.y as f32)).collect();
                        draw_hollow_polygon_mut(image, &hollow, Pixel(edge));
                    }
                }
            }
        }
    }
}

/// Converts to pixels and drops repeated vertices, including a closing vertex equal
/// to the first one (imageproc rejects those).
fn pixel_polygon(transform: &Transform, outline: &[Vec2]) -> Vec<Point<i32>> {
    let mut points: Vec<Point<i32>> = Vec::with_capacity(outline.len());
    for p in outline {
        let px = transform.to_point(*p);
        if points.last() != Some(&px) {
            points.push(px);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

fn in_bounds(image: &RgbaImage, p: Point<i32>) -> bool {
    p.x >= 0 && p.y >= 0 && (p.x as u32) < image.width() && (p.y as u32) < image.height()
}
