//! Drivable surfaces: roads and parking lots.

use crate::patch::{Patch, Renderable, Rgba, Scale, Shape, Style};
use crate::vecmath::{angle_to_vec, Vec2};

pub const ASPHALT_COLOR: Rgba = [70, 70, 75, 255];
pub const LANE_MARKING_COLOR: Rgba = [245, 245, 245, 255];
pub const EDGE_MARKING_COLOR: Rgba = [240, 200, 40, 255];
pub const LOT_COLOR: Rgba = [150, 150, 155, 255];
pub const STALL_MARKING_COLOR: Rgba = [250, 250, 250, 255];

const DASH_LENGTH: f32 = 3.0;
const DASH_GAP: f32 = 3.0;

/// A straight road segment starting at `start` (on its center line) and running
/// `length` units along `angle`.
#[derive(Debug, Clone)]
pub struct Road {
    pub id: u32,
    pub start: Vec2,
    pub length: f32,
    pub width: f32,
    /// Radians, counter-clockwise from +x.
    pub angle: f32,
    pub lanes: u32,
}

impl Road {
    pub fn new(id: u32, start: Vec2, length: f32, width: f32, angle: f32, lanes: u32) -> Self {
        Road { id, start, length, width, angle, lanes: lanes.max(1) }
    }

    pub fn end(&self) -> Vec2 {
        self.start + angle_to_vec(self.angle) * self.length
    }
}

impl Renderable for Road {
    fn patches(&self, scale: Scale, _time: u32) -> Vec<Patch> {
        let length = scale.sx(self.length);
        let width = scale.sy(self.width);
        let along = angle_to_vec(self.angle);
        let across = along.rotate(std::f32::consts::FRAC_PI_2);
        let center = self.start + along * (length / 2.0);

        let mut patches = vec![Patch::new(
            Shape::Rect { center, width: length, height: width, angle: self.angle },
            Style::filled(ASPHALT_COLOR),
        )];

        // Solid edge lines
        for side in [-0.5f32, 0.5] {
            let offset = across * (width * side);
            patches.push(Patch::new(
                Shape::Line { from: self.start + offset, to: self.start + offset + along * length },
                Style::outlined(EDGE_MARKING_COLOR),
            ));
        }

        // Dashed lane dividers
        let lane_width = width / self.lanes as f32;
        for divider in 1..self.lanes {
            let offset = across * (lane_width * divider as f32 - width / 2.0);
            let mut s = 0.0;
            while s < length {
                let e = (s + DASH_LENGTH).min(length);
                patches.push(Patch::new(
                    Shape::Line {
                        from: self.start + offset + along * s,
                        to: self.start + offset + along * e,
                    },
                    Style::outlined(LANE_MARKING_COLOR),
                ));
                s += DASH_LENGTH + DASH_GAP;
            }
        }

        patches
    }
}

/// A rectangular parking lot with `origin` at its lower-left corner, rotated by
/// `angle` around that corner. Stalls line the bottom edge.
#[derive(Debug, Clone)]
pub struct Lot {
    pub id: u32,
    pub origin: Vec2,
    pub width: f32,
    pub height: f32,
    pub angle: f32,
    pub stalls: u32,
}

impl Lot {
    pub fn new(id: u32, origin: Vec2, width: f32, height: f32, angle: f32, stalls: u32) -> Self {
        Lot { id, origin, width, height, angle, stalls }
    }

    fn local_to_world(&self, local: Vec2) -> Vec2 {
        self.origin + local.rotate(self.angle)
    }
}

impl Renderable for Lot {
    fn patches(&self, scale: Scale, _time: u32) -> Vec<Patch> {
        let w = scale.sx(self.width);
        let h = scale.sy(self.height);

        let mut patches = vec![Patch::new(
            Shape::Rect {
                center: self.local_to_world(Vec2::new(w / 2.0, h / 2.0)),
                width: w,
                height: h,
                angle: self.angle,
            },
            Style::filled(LOT_COLOR).with_edge(STALL_MARKING_COLOR),
        )];

        if self.stalls > 0 {
            let stall_width = w / self.stalls as f32;
            let stall_depth = h * 0.4;
            for i in 0..=self.stalls {
                let x = stall_width * i as f32;
                patches.push(Patch::new(
                    Shape::Line {
                        from: self.local_to_world(Vec2::new(x, 0.0)),
                        to: self.local_to_world(Vec2::new(x, stall_depth)),
                    },
                    Style::outlined(STALL_MARKING_COLOR),
                ));
            }
        }

        patches
    }
}
