use field_data::contour::Colormap;

const VIRIDIS: [[u8; 3]; 10] = [
    [0x44, 0x01, 0x54],
    [0x48, 0x28, 0x78],
    [0x3e, 0x49, 0x89],
    [0x31, 0x68, 0x8e],
    [0x26, 0x82, 0x8e],
    [0x1f, 0x9e, 0x89],
    [0x35, 0xb7, 0x79],
    [0x6e, 0xce, 0x58],
    [0xb5, 0xde, 0x2b],
    [0xfd, 0xe7, 0x25],
];
const PLASMA: [[u8; 3]; 10] = [
    [0x0d, 0x08, 0x87],
    [0x46, 0x03, 0x9f],
    [0x72, 0x01, 0xa8],
    [0x9c, 0x17, 0x9e],
    [0xbd, 0x37, 0x86],
    [0xd8, 0x57, 0x6b],
    [0xed, 0x79, 0x53],
    [0xfb, 0x9f, 0x3a],
    [0xfd, 0xca, 0x26],
    [0xf0, 0xf9, 0x21],
];

/// Linear interpolation between the anchors; `t` is clamped to `[0, 1]`.
pub(super) fn sample(colormap: Colormap, t: f32) -> egui::Color32 {
    let anchors = match colormap {
        Colormap::Viridis => &VIRIDIS,
        Colormap::Plasma => &PLASMA,
    };
    let t = if t.is_nan() { 0. } else { t.clamp(0., 1.) };
    let position = t * (anchors.len() - 1) as f32;
    let lower = (position.floor() as usize).min(anchors.len() - 2);
    let fraction = position - lower as f32;
    let [a, b] = [anchors[lower], anchors[lower + 1]];
    let mix = |i: usize| (a[i] as f32 + (b[i] as f32 - a[i] as f32) * fraction).round() as u8;
    egui::Color32::from_rgb(mix(0), mix(1), mix(2))
}

/// Color of the band with index `band`, taken from the band's center.
pub(super) fn band_color(colormap: Colormap, band: usize, band_count: usize) -> egui::Color32 {
    sample(colormap, (band as f32 + 0.5) / band_count.max(1) as f32)
}

#[test]
fn ends_hit_the_anchors() {
    assert_eq!(
        sample(Colormap::Viridis, 0.),
        egui::Color32::from_rgb(0x44, 0x01, 0x54)
    );
    assert_eq!(
        sample(Colormap::Plasma, 1.),
        egui::Color32::from_rgb(0xf0, 0xf9, 0x21)
    );
    assert_eq!(sample(Colormap::Plasma, 7.), sample(Colormap::Plasma, 1.));
    assert_eq!(sample(Colormap::Viridis, f32::NAN), sample(Colormap::Viridis, 0.));
}

#[test]
fn bands_get_darker_to_brighter_colors() {
    let luminance = |c: egui::Color32| c.r() as u32 + c.g() as u32 + c.b() as u32;
    let colors = (0..8)
        .map(|band| luminance(band_color(Colormap::Viridis, band, 8)))
        .collect::<Vec<_>>();
    assert!(colors.first() < colors.last());
    assert_ne!(band_color(Colormap::Viridis, 0, 8), band_color(Colormap::Viridis, 1, 8));
}
