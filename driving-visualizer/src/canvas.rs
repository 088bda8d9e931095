use driving_common::Patch;

/// Retained drawing surface: axis limits plus every patch added since the last clear.
#[derive(Debug, Clone)]
pub struct Axes {
    xlim: (f32, f32),
    ylim: (f32, f32),
    artists: Vec<Patch>,
}

impl Axes {
    pub fn new(xlim: (f32, f32), ylim: (f32, f32)) -> Self {
        Axes { xlim, ylim, artists: Vec::new() }
    }

    pub fn set_xlim(&mut self, min: f32, max: f32) {
        self.xlim = (min, max);
    }

    pub fn set_ylim(&mut self, min: f32, max: f32) {
        self.ylim = (min, max);
    }

    pub fn xlim(&self) -> (f32, f32) {
        self.xlim
    }

    pub fn ylim(&self) -> (f32, f32) {
        self.ylim
    }

    /// Adds a patch at the given stacking order.
    pub fn add_artist(&mut self, mut patch: Patch, zorder: i32) {
        patch.zorder = zorder;
        self.artists.push(patch);
    }

    /// Patches in insertion order.
    pub fn artists(&self) -> &[Patch] {
        &self.artists
    }

    /// Patches back to front. Equal zorders keep insertion order.
    pub fn draw_order(&self) -> Vec<&Patch> {
        let mut ordered: Vec<&Patch> = self.artists.iter().collect();
        ordered.sort_by_key(|p| p.zorder);
        ordered
    }

    /// Drops every artist. Limits are left untouched.
    pub fn clear(&mut self) {
        self.artists.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driving_common::{Shape, Style, Vec2};

    fn dot(x: f32) -> Patch {
        Patch::new(Shape::Circle { center: Vec2::new(x, 0.0), radius: 1.0 }, Style::default())
    }

    #[test]
    fn add_artist_overwrites_zorder() {
        let mut axes = Axes::new((0.0, 10.0), (0.0, 10.0));
        axes.add_artist(dot(1.0), 4);
        assert_eq!(axes.artists()[0].zorder, 4);
    }

    #[test]
    fn draw_order_is_stable_by_zorder() {
        let mut axes = Axes::new((0.0, 10.0), (0.0, 10.0));
        axes.add_artist(dot(1.0), 5);
        axes.add_artist(dot(2.0), 1);
        axes.add_artist(dot(3.0), 5);
        axes.add_artist(dot(4.0), 1);

        let xs: Vec<f32> = axes
            .draw_order()
            .iter()
            .map(|p| match p.shape {
                Shape::Circle { center, .. } => center.x,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(xs, vec![2.0, 4.0, 1.0, 3.0]);
    }

    #[test]
    fn clear_keeps_limits() {
        let mut axes = Axes::new((0.0, 10.0), (0.0, 5.0));
        axes.add_artist(dot(1.0), 1);
        axes.clear();
        assert!(axes.is_empty());
        assert_eq!(axes.xlim(), (0.0, 10.0));
        assert_eq!(axes.ylim(), (0.0, 5.0));
    }
}
