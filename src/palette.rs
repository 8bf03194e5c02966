use crate::model::Color;

const HUE_STEP: usize = 30;
const SATURATIONS: [f64; 2] = [40.0, 99.0];
const VALUES: [f64; 2] = [0.66, 0.99];

/// Converts HSV to a hex color. `s` is a percentage, `v` is in `[0, 1]`.
/// Channels are truncated, not rounded.
pub fn hsv_to_color(h: f64, s: f64, v: f64) -> Color {
    let h = h.rem_euclid(360.0);
    let chroma = v * (s / 100.0);
    let x = chroma * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - chroma;

    let (r, g, b) = match (h / 60.0).floor() as u8 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    Color::from_rgb(channel(r + m), channel(g + m), channel(b + m))
}

fn channel(value: f64) -> u8 {
    (value * 255.0).floor().clamp(0.0, 255.0) as u8
}

/// Picker layout: one row per value/saturation pair, white alone at the end.
pub fn palette_rows() -> Vec<Vec<Color>> {
    let mut rows = Vec::with_capacity(VALUES.len() * SATURATIONS.len() + 1);
    for v in VALUES {
        for s in SATURATIONS {
            rows.push(
                (0..360)
                    .step_by(HUE_STEP)
                    .map(|h| hsv_to_color(h as f64, s, v))
                    .collect(),
            );
        }
    }
    rows.push(vec![Color::white()]);
    rows
}

pub fn generate_palette() -> Vec<Color> {
    palette_rows().into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(color: Color) -> String {
        color.to_string()
    }

    #[test]
    fn full_saturation_hues_hit_primaries_and_secondaries() {
        assert_eq!(hex(hsv_to_color(0.0, 100.0, 1.0)), "#ff0000");
        assert_eq!(hex(hsv_to_color(60.0, 100.0, 1.0)), "#ffff00");
        assert_eq!(hex(hsv_to_color(120.0, 100.0, 1.0)), "#00ff00");
        assert_eq!(hex(hsv_to_color(180.0, 100.0, 1.0)), "#00ffff");
        assert_eq!(hex(hsv_to_color(240.0, 100.0, 1.0)), "#0000ff");
        assert_eq!(hex(hsv_to_color(300.0, 100.0, 1.0)), "#ff00ff");
    }

    #[test]
    fn negative_hue_wraps_around() {
        assert_eq!(hsv_to_color(-60.0, 100.0, 1.0), hsv_to_color(300.0, 100.0, 1.0));
        assert_eq!(hsv_to_color(360.0, 100.0, 1.0), hsv_to_color(0.0, 100.0, 1.0));
    }

    #[test]
    fn channels_are_truncated() {
        // 0.5 * 255 = 127.5
        assert_eq!(hex(hsv_to_color(0.0, 0.0, 0.5)), "#7f7f7f");
    }

    #[test]
    fn palette_is_deterministic_and_ends_white() {
        let first = generate_palette();
        let second = generate_palette();
        assert_eq!(first, second);
        assert_eq!(first.len(), 12 * 2 * 2 + 1);
        assert_eq!(first.last(), Some(&Color::white()));
    }

    #[test]
    fn rows_match_flat_palette() {
        let rows = palette_rows();
        assert_eq!(rows.len(), 5);
        assert!(rows[..4].iter().all(|row| row.len() == 12));
        assert_eq!(rows.concat(), generate_palette());
    }
}
