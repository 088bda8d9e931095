use crate::vecmath::Vec2;
use serde::{Deserialize, Serialize};

/// RGBA color, one byte per channel.
pub type Rgba = [u8; 4];

/// Per-axis multiplier applied to entity extents when producing patches.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub x: f32,
    pub y: f32,
}

impl Scale {
    pub fn new(x: f32, y: f32) -> Self {
        Scale { x, y }
    }

    pub fn identity() -> Self {
        Scale { x: 1.0, y: 1.0 }
    }

    /// Scales an extent lying along the x axis.
    pub fn sx(&self, v: f32) -> f32 {
        v * self.x
    }

    /// Scales an extent lying along the y axis.
    pub fn sy(&self, v: f32) -> f32 {
        v * self.y
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::identity()
    }
}

/// Geometry of a patch, in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Rectangle centered on `center`, rotated counter-clockwise by `angle` radians.
    Rect { center: Vec2, width: f32, height: f32, angle: f32 },
    Circle { center: Vec2, radius: f32 },
    Polygon { points: Vec<Vec2> },
    Line { from: Vec2, to: Vec2 },
}

impl Shape {
    /// Corner points of a rect or the vertices of a polygon, counter-clockwise.
    /// Circles and lines have no outline polygon.
    pub fn outline(&self) -> Option<Vec<Vec2>> {
        match self {
            Shape::Rect { center, width, height, angle } => {
                let hw = width / 2.0;
                let hh = height / 2.0;
                let corners = [
                    Vec2::new(-hw, -hh),
                    Vec2::new(hw, -hh),
                    Vec2::new(hw, hh),
                    Vec2::new(-hw, hh),
                ];
                Some(corners.iter().map(|c| *center + c.rotate(*angle)).collect())
            }
            Shape::Polygon { points } => Some(points.clone()),
            Shape::Circle { .. } | Shape::Line { .. } => None,
        }
    }
}

/// Fill and edge colors of a patch; `None` leaves that part undrawn.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Style {
    pub fill: Option<Rgba>,
    pub edge: Option<Rgba>,
}

impl Style {
    pub fn filled(fill: Rgba) -> Self {
        Style { fill: Some(fill), edge: None }
    }

    pub fn outlined(edge: Rgba) -> Self {
        Style { fill: None, edge: Some(edge) }
    }

    pub fn with_edge(mut self, edge: Rgba) -> Self {
        self.edge = Some(edge);
        self
    }
}

/// A styled shape ready to be placed on a drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub shape: Shape,
    pub style: Style,
    /// Stacking order; the surface overwrites it with the layer of the entity collection.
    pub zorder: i32,
}

impl Patch {
    pub fn new(shape: Shape, style: Style) -> Self {
        Patch { shape, style, zorder: 0 }
    }
}

/// Anything that can describe itself as patches at a given timestep.
pub trait Renderable {
    fn patches(&self, scale: Scale, time: u32) -> Vec<Patch>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn rect_outline_is_rotated_around_center() {
        let rect = Shape::Rect {
            center: Vec2::new(10.0, 10.0),
            width: 4.0,
            height: 2.0,
            angle: FRAC_PI_2,
        };
        let corners = rect.outline().unwrap();
        assert_eq!(corners.len(), 4);
        // A quarter turn swaps the extents: the first corner lands at (+1, -2) from center.
        assert!((corners[0].x - 11.0).abs() < 1e-5);
        assert!((corners[0].y - 8.0).abs() < 1e-5);
    }

    #[test]
    fn circles_have_no_outline_polygon() {
        let c = Shape::Circle { center: Vec2::zero(), radius: 1.0 };
        assert!(c.outline().is_none());
    }

    #[test]
    fn default_scale_is_identity() {
        let s = Scale::default();
        assert_eq!(s.sx(3.0), 3.0);
        assert_eq!(s.sy(3.0), 3.0);
    }
}
