use driving_common::Rgba;
use log::warn;
use palette::{FromColor, Hsv, Srgb};
use rand::seq::SliceRandom;
use rand::Rng;

// Color definitions for named colors (RGBA format)
const COLOR_MAP: &[(&str, Rgba)] = &[
    ("black", [0, 0, 0, 255]),
    ("white", [255, 255, 255, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("magenta", [255, 0, 255, 255]),
    ("gray", [128, 128, 128, 255]),
    ("orange", [255, 140, 0, 255]),
    ("brown", [139, 90, 43, 255]),
    ("lightgreen", [200, 235, 200, 255]),
];

/// Parse a color name to RGBA values
pub fn parse_color(color_name: &str) -> Rgba {
    for &(name, color) in COLOR_MAP {
        if name.eq_ignore_ascii_case(color_name) {
            return color;
        }
    }
    // Default to black if color not found
    warn!("Color '{}' not recognized, using black.", color_name);
    [0, 0, 0, 255]
}

/// Generate `count` well separated colors, shuffled so neighbours in the list differ.
pub fn generate_color_palette<R: Rng>(count: usize, rng: &mut R) -> Vec<Rgba> {
    let mut colors = Vec::with_capacity(count);

    for i in 0..count {
        // Spread hues evenly, jitter saturation and value a little
        let hue = (i as f32) / (count as f32);
        let saturation = 0.7 + rng.random_range(-0.1..0.1);
        let value = 0.8 + rng.random_range(-0.1..0.1);

        let hsv: Hsv = Hsv::new(hue * 360.0, saturation, value);
        let rgb: Srgb = Srgb::from_color(hsv);

        let r = (rgb.red * 255.0) as u8;
        let g = (rgb.green * 255.0) as u8;
        let b = (rgb.blue * 255.0) as u8;

        colors.push([r, g, b, 255]);
    }

    colors.shuffle(rng);

    colors
}

/// Perceived brightness of a color (BT.601 weights), 0 to 255.
pub fn luminance(color: Rgba) -> f32 {
    0.299 * color[0] as f32 + 0.587 * color[1] as f32 + 0.114 * color[2] as f32
}

/// Black or white, whichever reads better on `background`.
pub fn contrasting_text_color(background: Rgba) -> Rgba {
    if luminance(background) > 128.0 {
        [0, 0, 0, 255]
    } else {
        [255, 255, 255, 255]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn named_colors_are_case_insensitive() {
        assert_eq!(parse_color("Red"), [255, 0, 0, 255]);
        assert_eq!(parse_color("WHITE"), [255, 255, 255, 255]);
    }

    #[test]
    fn unknown_color_falls_back_to_black() {
        assert_eq!(parse_color("chartreuse-ish"), [0, 0, 0, 255]);
    }

    #[test]
    fn palette_is_reproducible_for_a_seed() {
        let a = generate_color_palette(8, &mut StdRng::seed_from_u64(3));
        let b = generate_color_palette(8, &mut StdRng::seed_from_u64(3));
        assert_eq!(a.len(), 8);
        assert_eq!(a, b);
        assert!(a.iter().all(|c| c[3] == 255));
    }

    #[test]
    fn text_contrasts_with_background() {
        assert_eq!(contrasting_text_color([255, 255, 255, 255]), [0, 0, 0, 255]);
        assert_eq!(contrasting_text_color([10, 10, 40, 255]), [255, 255, 255, 255]);
    }
}
