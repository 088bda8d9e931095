use crate::vecmath::{vec_to_angle, Vec2};

/// Position and heading (radians, counter-clockwise from +x) at one timestep.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pose {
    pub position: Vec2,
    pub heading: f32,
}

impl Pose {
    pub fn new(position: Vec2, heading: f32) -> Self {
        Pose { position, heading }
    }
}

/// Where a vehicle is at every timestep.
///
/// Vehicles replay these; there are no dynamics behind them.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    motion: Motion,
}

#[derive(Debug, Clone, PartialEq)]
enum Motion {
    /// One pose per timestep from 0, the last one held afterwards.
    Recorded(Vec<Pose>),
    /// Constant speed along the non-degenerate segments of a polyline, covering the
    /// whole route between t = 0 and t = `horizon`.
    Route { segments: Vec<Segment>, horizon: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    from: Vec2,
    to: Vec2,
    /// Distance travelled before entering the segment.
    start: f32,
    length: f32,
}

impl Trajectory {
    /// A vehicle that never moves.
    pub fn parked(pose: Pose) -> Self {
        Trajectory { motion: Motion::Recorded(vec![pose]) }
    }

    /// Builds a trajectory from explicit per-timestep poses. Empty input yields a
    /// vehicle parked at the origin.
    pub fn from_poses(poses: Vec<Pose>) -> Self {
        if poses.is_empty() {
            return Trajectory::parked(Pose::new(Vec2::zero(), 0.0));
        }
        Trajectory { motion: Motion::Recorded(poses) }
    }

    /// Moves along the polyline through `waypoints` at constant speed, starting on the
    /// first waypoint at t = 0 and arriving on the last one at t = `horizon`.
    ///
    /// A single waypoint (or a polyline of zero length) gives a parked vehicle facing
    /// `default_heading`. Poses are computed on lookup, so the horizon costs nothing.
    pub fn from_waypoints(waypoints: &[Vec2], horizon: u32, default_heading: f32) -> Self {
        let Some(&first) = waypoints.first() else {
            return Trajectory::parked(Pose::new(Vec2::zero(), default_heading));
        };

        let mut segments = Vec::with_capacity(waypoints.len().saturating_sub(1));
        let mut travelled = 0.0;
        for w in waypoints.windows(2) {
            let length = w[0].distance(w[1]);
            // Repeated waypoints take no time and have no heading
            if length > f32::EPSILON {
                segments.push(Segment { from: w[0], to: w[1], start: travelled, length });
                travelled += length;
            }
        }

        if segments.is_empty() || horizon == 0 {
            return Trajectory::parked(Pose::new(first, default_heading));
        }
        Trajectory { motion: Motion::Route { segments, horizon } }
    }

    /// Pose at `time`, holding the last pose once the trajectory runs out.
    pub fn pose_at(&self, time: u32) -> Pose {
        match &self.motion {
            Motion::Recorded(poses) => poses[(time as usize).min(poses.len() - 1)],
            Motion::Route { segments, horizon } => {
                let last = segments[segments.len() - 1];
                let total = f64::from(last.start) + f64::from(last.length);
                let target = (total * f64::from(time.min(*horizon)) / f64::from(*horizon)) as f32;

                let idx = segments
                    .partition_point(|s| s.start + s.length < target)
                    .min(segments.len() - 1);
                let segment = segments[idx];
                let frac = ((target - segment.start) / segment.length).clamp(0.0, 1.0);
                Pose::new(segment.from.lerp(segment.to, frac), vec_to_angle(segment.to - segment.from))
            }
        }
    }
}
