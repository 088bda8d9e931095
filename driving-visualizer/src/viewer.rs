use crate::animation::Animation;
use crate::canvas::Axes;
use crate::display::Display;
use crate::raster::{self, draw_label, Figure};
use ab_glyph::FontVec;
use anyhow::Result;
use driving_common::{Renderable, Scale, SimulatorState};
use image::RgbaImage;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, trace};

// Stacking order of the entity layers, back to front
pub const ROAD_LAYER: i32 = 1;
pub const LOT_LAYER: i32 = 2;
pub const OBSTACLE_LAYER: i32 = 3;
pub const CRATE_LAYER: i32 = 4;
pub const EXTERNAL_VEHICLE_LAYER: i32 = 5;
pub const USER_VEHICLE_LAYER: i32 = 6;

/// Result of asking the viewer for one animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Drawn,
    /// The timestep was outside `[0, horizon)`; the display has been closed.
    Closed,
}

/// What an animation run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSummary {
    pub frames_drawn: usize,
    /// First timestep that fell outside the drawable range, if the run got that far.
    pub stopped_at: Option<i64>,
}

/// Draws a simulation state onto a surface and forwards the frames to a display.
///
/// The viewer only reads the state; every redraw starts from a cleared surface.
pub struct Viewer<'a, D: Display> {
    state: &'a SimulatorState,
    axes: Axes,
    figure: Figure,
    scale: Scale,
    display: D,
    font: Option<FontVec>,
}

impl<'a, D: Display> Viewer<'a, D> {
    pub fn new(state: &'a SimulatorState, figure: Figure, display: D) -> Self {
        let axes = Axes::new((0.0, state.x_bound), (0.0, state.y_bound));
        info!(
            "Viewer ready: {}x{} px surface over a {:.1} x {:.1} world, horizon {}",
            figure.width_px, figure.height_px, state.x_bound, state.y_bound, state.horizon
        );
        Viewer { state, axes, figure, scale: Scale::identity(), display, font: None }
    }

    /// Labels each frame with its timestep.
    pub fn with_font(mut self, font: FontVec) -> Self {
        self.font = Some(font);
        self
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.scale = scale;
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (self.figure.width_px, self.figure.height_px)
    }

    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn into_display(self) -> D {
        self.display
    }

    /// Runs the animation from `start_t` to the horizon, pausing `real_t` seconds
    /// between frames on paced displays.
    pub fn run_sim(&mut self, start_t: f64, real_t: f64) -> Result<AnimationSummary> {
        let animation = Animation::new(start_t, self.state.horizon, real_t);
        let interval = animation.interval();
        info!(
            "Running animation from t={} to t={} every {} ms",
            start_t.trunc() as i64,
            self.state.horizon,
            interval.as_millis()
        );

        let progress_bar = ProgressBar::new(animation.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({percent}%) [{eta}]")?
                .progress_chars("#>-"),
        );

        let mut summary = AnimationSummary { frames_drawn: 0, stopped_at: None };
        for time in animation {
            match self.draw_frame(time)? {
                FrameOutcome::Drawn => {
                    summary.frames_drawn += 1;
                    progress_bar.inc(1);
                    if self.display.paced() {
                        std::thread::sleep(interval);
                    }
                }
                FrameOutcome::Closed => {
                    summary.stopped_at = Some(time);
                    break;
                }
            }
        }

        // An empty frame range never reaches the closing frame
        self.display.close()?;
        progress_bar.finish_with_message(format!("Drew {} frames", summary.frames_drawn));
        info!("Animation finished after {} frame(s)", summary.frames_drawn);
        Ok(summary)
    }

    /// Draws the state at `time` and shows it.
    pub fn draw_timestep(&mut self, time: u32) -> Result<()> {
        self.add_timestep(time);
        let frame = self.render(time);
        self.display.show(&frame, time)
    }

    /// Draws `time` if it lies in `[0, horizon)`, otherwise closes the display.
    pub fn draw_frame(&mut self, time: i64) -> Result<FrameOutcome> {
        if time >= 0 && time < self.state.horizon as i64 {
            debug!("Drawing frame {}", time);
            self.draw_timestep(time as u32)?;
            Ok(FrameOutcome::Drawn)
        } else {
            debug!("Frame {} is outside [0, {}), closing", time, self.state.horizon);
            self.display.close()?;
            Ok(FrameOutcome::Closed)
        }
    }

    /// Clears the surface and adds every layer at `time` without showing it.
    pub fn add_timestep(&mut self, time: u32) {
        self.clear();
        self.add_objects(time);
        self.add_surfaces(time);
    }

    /// Rasterizes the current surface, labelled with `time` when a font is set.
    pub fn render(&self, time: u32) -> RgbaImage {
        let mut frame = raster::render(&self.axes, &self.figure);
        if let Some(font) = &self.font {
            let label = format!(
                "t = {} / {} | vehicles: {}",
                time,
                self.state.horizon,
                self.state.vehicle_count()
            );
            draw_label(&mut frame, font, self.figure.background, &label);
        }
        frame
    }

    /// Discards everything drawn and resets the limits to the world bounds.
    pub fn clear(&mut self) {
        self.axes.clear();
        self.axes.set_xlim(0.0, self.state.x_bound);
        self.axes.set_ylim(0.0, self.state.y_bound);
    }

    fn add_collection<'r, R, I>(&mut self, to_render: I, time: u32, zorder: i32)
    where
        R: Renderable + 'r,
        I: IntoIterator<Item = &'r R>,
    {
        let mut added = 0;
        for r in to_render {
            for patch in r.patches(self.scale, time) {
                self.axes.add_artist(patch, zorder);
                added += 1;
            }
        }
        trace!("Layer {}: {} patch(es) at t={}", zorder, added, time);
    }

    fn add_vehicles(&mut self, time: u32) {
        let state = self.state;
        self.add_collection(&state.external_vehicles, time, EXTERNAL_VEHICLE_LAYER);
        self.add_collection(&state.user_vehicles, time, USER_VEHICLE_LAYER);
    }

    fn add_crates(&mut self, time: u32) {
        let state = self.state;
        self.add_collection(&state.crates, time, CRATE_LAYER);
    }

    fn add_obstacles(&mut self, time: u32) {
        let state = self.state;
        self.add_collection(&state.obstacles, time, OBSTACLE_LAYER);
    }

    fn add_roads(&mut self, time: u32) {
        let state = self.state;
        self.add_collection(state.roads.values(), time, ROAD_LAYER);
    }

    fn add_lots(&mut self, time: u32) {
        let state = self.state;
        self.add_collection(state.lots.values(), time, LOT_LAYER);
    }

    fn add_objects(&mut self, time: u32) {
        self.add_vehicles(time);
        self.add_crates(time);
        self.add_obstacles(time);
    }

    fn add_surfaces(&mut self, time: u32) {
        self.add_roads(time);
        self.add_lots(time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MemoryDisplay;
    use driving_common::surfaces::ASPHALT_COLOR;
    use driving_common::objects::USER_VEHICLE_COLOR;
    use driving_common::{Crate, Lot, Obstacle, Pose, Road, Trajectory, Vec2, Vehicle};

    fn scene() -> SimulatorState {
        let mut state = SimulatorState::new(30, 100.0, 80.0);
        state.add_road(Road::new(0, Vec2::new(0.0, 50.0), 100.0, 10.0, 0.0, 2));
        state.add_lot(Lot::new(1, Vec2::new(10.0, 5.0), 30.0, 20.0, 0.0, 5));
        state.add_obstacle(Obstacle::new(Vec2::new(60.0, 20.0), 2.0));
        state.add_crate(Crate::new(Vec2::new(70.0, 20.0), 2.0));
        state.add_vehicle(Vehicle::new(
            0,
            4.0,
            2.0,
            false,
            Trajectory::from_waypoints(&[Vec2::new(90.0, 52.0), Vec2::new(10.0, 52.0)], 30, 0.0),
        ));
        state.add_vehicle(Vehicle::new(
            1,
            6.0,
            4.0,
            true,
            Trajectory::from_waypoints(&[Vec2::new(2.0, 48.0), Vec2::new(98.0, 48.0)], 30, 0.0),
        ));
        state
    }

    fn test_viewer(state: &SimulatorState) -> Viewer<'_, MemoryDisplay> {
        Viewer::new(state, Figure::new(200, 160, [255, 255, 255, 255]), MemoryDisplay::new())
    }

    #[test]
    fn new_viewer_matches_world_bounds() {
        let state = scene();
        let viewer = test_viewer(&state);
        assert_eq!(viewer.axes().xlim(), (0.0, 100.0));
        assert_eq!(viewer.axes().ylim(), (0.0, 80.0));
        assert_eq!(viewer.scale(), Scale::identity());
        assert_eq!(viewer.pixel_size(), (200, 160));
        assert!(viewer.axes().is_empty());
    }

    #[test]
    fn every_timestep_in_range_draws() {
        let state = scene();
        let mut viewer = test_viewer(&state);
        for t in 0..state.horizon {
            viewer.draw_timestep(t).unwrap();
        }
        let display = viewer.into_display();
        assert_eq!(display.times(), (0..30).collect::<Vec<u32>>());
        assert!(display.frames().iter().all(|(_, f)| f.dimensions() == (200, 160)));
    }

    #[test]
    fn layers_are_stacked_in_order() {
        let state = scene();
        let mut viewer = test_viewer(&state);
        viewer.add_timestep(0);

        let zorders: Vec<i32> = viewer.axes().draw_order().iter().map(|p| p.zorder).collect();
        assert!(zorders.windows(2).all(|w| w[0] <= w[1]));
        for layer in [ROAD_LAYER, LOT_LAYER, OBSTACLE_LAYER, CRATE_LAYER, EXTERNAL_VEHICLE_LAYER, USER_VEHICLE_LAYER] {
            assert!(zorders.contains(&layer), "layer {} missing", layer);
        }
        assert_eq!(zorders.first(), Some(&ROAD_LAYER));
        assert_eq!(zorders.last(), Some(&USER_VEHICLE_LAYER));
    }

    #[test]
    fn user_vehicle_is_painted_over_the_road() {
        let state = scene();
        let mut viewer = test_viewer(&state);
        viewer.draw_timestep(0).unwrap();
        let display = viewer.into_display();
        let (_, frame) = &display.frames()[0];

        // World (1, 48) is inside the user vehicle body, (50, 54) is bare road
        assert_eq!(frame.get_pixel(2, 64).0, USER_VEHICLE_COLOR);
        assert_eq!(frame.get_pixel(100, 52).0, ASPHALT_COLOR);
    }

    #[test]
    fn clear_discards_artists_and_restores_bounds() {
        let state = scene();
        let mut viewer = test_viewer(&state);
        viewer.add_timestep(3);
        assert!(!viewer.axes().is_empty());

        viewer.axes.set_xlim(-5.0, 5.0);
        viewer.clear();
        assert!(viewer.axes().is_empty());
        assert_eq!(viewer.axes().xlim(), (0.0, 100.0));
        assert_eq!(viewer.axes().ylim(), (0.0, 80.0));
    }

    #[test]
    fn redraw_does_not_accumulate() {
        let state = scene();
        let mut viewer = test_viewer(&state);
        viewer.add_timestep(0);
        let first = viewer.axes().artists().len();
        viewer.add_timestep(1);
        assert_eq!(viewer.axes().artists().len(), first);
    }

    #[test]
    fn out_of_range_frames_close_instead_of_drawing() {
        let state = scene();
        for t in [-1, 30, 31] {
            let mut viewer = test_viewer(&state);
            assert_eq!(viewer.draw_frame(t).unwrap(), FrameOutcome::Closed);
            let display = viewer.into_display();
            assert!(display.is_closed());
            assert!(display.frames().is_empty());
        }

        let mut viewer = test_viewer(&state);
        assert_eq!(viewer.draw_frame(29).unwrap(), FrameOutcome::Drawn);
    }

    #[test]
    fn drawing_resumes_after_a_closing_frame() {
        let state = scene();
        let mut viewer = test_viewer(&state);
        assert_eq!(viewer.draw_frame(30).unwrap(), FrameOutcome::Closed);
        viewer.draw_timestep(0).unwrap();
        assert!(!viewer.display().is_closed());

        let summary = viewer.run_sim(28.0, 0.0).unwrap();
        assert_eq!(summary.frames_drawn, 2);
        let second = viewer.run_sim(29.0, 0.0).unwrap();
        assert_eq!(second, AnimationSummary { frames_drawn: 1, stopped_at: Some(30) });
        assert_eq!(viewer.into_display().times(), vec![0, 28, 29, 29]);
    }

    #[test]
    fn animation_draws_start_to_horizon_then_stops() {
        let state = scene();
        let mut viewer = test_viewer(&state);
        let summary = viewer.run_sim(25.0, 0.0).unwrap();
        assert_eq!(summary, AnimationSummary { frames_drawn: 5, stopped_at: Some(30) });
        let display = viewer.into_display();
        assert_eq!(display.times(), vec![25, 26, 27, 28, 29]);
        assert!(display.is_closed());
    }

    #[test]
    fn animation_from_negative_start_stops_immediately() {
        let state = scene();
        let mut viewer = test_viewer(&state);
        let summary = viewer.run_sim(-3.0, 0.0).unwrap();
        assert_eq!(summary, AnimationSummary { frames_drawn: 0, stopped_at: Some(-3) });
    }

    #[test]
    fn animation_past_horizon_still_closes() {
        let state = scene();
        let mut viewer = test_viewer(&state);
        let summary = viewer.run_sim(40.0, 0.0).unwrap();
        assert_eq!(summary, AnimationSummary { frames_drawn: 0, stopped_at: None });
        assert!(viewer.display().is_closed());
    }

    #[test]
    fn drawing_leaves_state_untouched() {
        let state = scene();
        let before = format!("{:?}", state);
        let mut viewer = test_viewer(&state);
        viewer.run_sim(0.0, 0.0).unwrap();
        assert_eq!(format!("{:?}", state), before);
    }

    #[test]
    fn empty_state_draws_background_only() {
        let state = SimulatorState::new(2, 10.0, 10.0);
        let mut viewer = Viewer::new(&state, Figure::new(20, 20, [1, 1, 1, 255]), MemoryDisplay::new());
        viewer.draw_timestep(0).unwrap();
        assert!(viewer.axes().is_empty());
        let display = viewer.into_display();
        assert!(display.frames()[0].1.pixels().all(|p| p.0 == [1, 1, 1, 255]));
    }

    #[test]
    fn scale_is_forwarded_to_entities() {
        let mut state = SimulatorState::new(2, 10.0, 10.0);
        state.add_vehicle(Vehicle::new(
            0,
            2.0,
            1.0,
            true,
            Trajectory::parked(Pose::new(Vec2::new(5.0, 5.0), 0.0)),
        ));
        let mut viewer = Viewer::new(&state, Figure::default(), MemoryDisplay::new());
        viewer.set_scale(Scale::new(2.0, 3.0));
        viewer.add_timestep(0);
        match &viewer.axes().artists()[0].shape {
            driving_common::Shape::Rect { width, height, .. } => {
                assert_eq!(*width, 4.0);
                assert_eq!(*height, 3.0);
            }
            other => panic!("expected vehicle body, got {:?}", other),
        }
    }
}
