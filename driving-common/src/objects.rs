//! Movable and static objects that sit on top of the road surfaces.

use crate::patch::{Patch, Renderable, Rgba, Scale, Shape, Style};
use crate::trajectory::Trajectory;
use crate::vecmath::{angle_to_vec, Vec2};

pub const USER_VEHICLE_COLOR: Rgba = [30, 90, 220, 255];
pub const EXTERNAL_VEHICLE_COLOR: Rgba = [200, 40, 40, 255];
pub const CRATE_COLOR: Rgba = [160, 110, 50, 255];
pub const OBSTACLE_COLOR: Rgba = [90, 90, 90, 255];
const OUTLINE_COLOR: Rgba = [20, 20, 20, 255];
const WINDSHIELD_COLOR: Rgba = [220, 235, 245, 255];

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: u32,
    pub length: f32,
    pub width: f32,
    /// User vehicles are drawn above every external vehicle.
    pub is_user: bool,
    pub color: Rgba,
    pub trajectory: Trajectory,
}

impl Vehicle {
    pub fn new(id: u32, length: f32, width: f32, is_user: bool, trajectory: Trajectory) -> Self {
        let color = if is_user { USER_VEHICLE_COLOR } else { EXTERNAL_VEHICLE_COLOR };
        Vehicle { id, length, width, is_user, color, trajectory }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }
}

impl Renderable for Vehicle {
    /// Body rectangle plus a windshield triangle pointing in the direction of travel.
    fn patches(&self, scale: Scale, time: u32) -> Vec<Patch> {
        let pose = self.trajectory.pose_at(time);
        let length = scale.sx(self.length);
        let width = scale.sy(self.width);

        let body = Patch::new(
            Shape::Rect { center: pose.position, width: length, height: width, angle: pose.heading },
            Style::filled(self.color).with_edge(OUTLINE_COLOR),
        );

        let forward = angle_to_vec(pose.heading);
        let left = forward.rotate(std::f32::consts::FRAC_PI_2);
        let nose = pose.position + forward * (length * 0.45);
        let base = pose.position + forward * (length * 0.15);
        let windshield = Patch::new(
            Shape::Polygon {
                points: vec![nose, base + left * (width * 0.35), base - left * (width * 0.35)],
            },
            Style::filled(WINDSHIELD_COLOR),
        );

        vec![body, windshield]
    }
}

#[derive(Debug, Clone)]
pub struct Crate {
    pub position: Vec2,
    pub size: f32,
    pub color: Rgba,
}

impl Crate {
    pub fn new(position: Vec2, size: f32) -> Self {
        Crate { position, size, color: CRATE_COLOR }
    }
}

impl Renderable for Crate {
    fn patches(&self, scale: Scale, _time: u32) -> Vec<Patch> {
        let w = scale.sx(self.size);
        let h = scale.sy(self.size);
        let half = Vec2::new(w / 2.0, h / 2.0);
        vec![
            Patch::new(
                Shape::Rect { center: self.position, width: w, height: h, angle: 0.0 },
                Style::filled(self.color).with_edge(OUTLINE_COLOR),
            ),
            // Cross bracing
            Patch::new(
                Shape::Line { from: self.position - half, to: self.position + half },
                Style::outlined(OUTLINE_COLOR),
            ),
            Patch::new(
                Shape::Line {
                    from: self.position + Vec2::new(-half.x, half.y),
                    to: self.position + Vec2::new(half.x, -half.y),
                },
                Style::outlined(OUTLINE_COLOR),
            ),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Obstacle {
    pub position: Vec2,
    pub radius: f32,
    pub color: Rgba,
}

impl Obstacle {
    pub fn new(position: Vec2, radius: f32) -> Self {
        Obstacle { position, radius, color: OBSTACLE_COLOR }
    }
}

impl Renderable for Obstacle {
    fn patches(&self, scale: Scale, _time: u32) -> Vec<Patch> {
        let radius = self.radius * scale.x.min(scale.y);
        vec![Patch::new(
            Shape::Circle { center: self.position, radius },
            Style::filled(self.color).with_edge(OUTLINE_COLOR),
        )]
    }
}
