use image::Rgb;

/// Assigns one color per class, spreading hues evenly around the color wheel.
///
/// The mapping only depends on `num_classes`, so the same class keeps its color across
/// images and calls.
pub fn generate_color_mapping(num_classes: usize) -> Vec<Rgb<u8>> {
    (0..num_classes)
        .map(|class_id| hsv_to_rgb(360.0 * class_id as f32 / num_classes as f32, 0.85, 0.95))
        .collect()
}

/// Picks black or white, whichever reads better on `background`.
pub fn best_text_color(background: Rgb<u8>) -> Rgb<u8> {
    let [r, g, b] = background.0;
    let luminance = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luminance > 150.0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
}

fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Rgb<u8> {
    let chroma = value * saturation;
    let sector = (hue / 60.0) % 6.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = value - chroma;
    let channel = |c: f32| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb([channel(r), channel(g), channel(b)])
}
