//! Geometry behind the filled contour plots.
//!
//! Values are bucketed into bands between evenly spaced levels. The fill is
//! sampled through bilinear interpolation of the grid, band boundaries are
//! traced with marching squares. Grid coordinates use `x` for the column and
//! `y` for the row, row 0 being the bottom of the plot.
use crate::sample::{Matrix, MeasurementPair};

pub const DEFAULT_BAND_COUNT: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum Colormap {
    Viridis,
    Plasma,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quantity {
    Temperature,
    Concentration,
}

/// `band_count + 1` evenly spaced boundaries covering the range.
///
/// The boundaries are blended from both ends, `max - min` may not be
/// representable.
pub fn levels(range: Option<(f64, f64)>, band_count: usize) -> Vec<f64> {
    let band_count = band_count.max(1);
    let (min, max) = match range {
        Some((min, max)) if min < max => (min, max),
        Some((value, _)) => (value - 0.5, value + 0.5),
        None => (-0.5, 0.5),
    };
    (0..=band_count)
        .map(|i| {
            let t = i as f64 / band_count as f64;
            if i == band_count {
                max
            } else {
                min * (1. - t) + max * t
            }
        })
        .collect()
}

/// Index of the band holding `value`; values outside are clamped to the
/// outermost band. A boundary belongs to the band above it.
pub fn band_of(value: f64, levels: &[f64]) -> Option<usize> {
    let bands = levels.len().saturating_sub(1);
    if bands == 0 || !value.is_finite() {
        return None;
    }
    Some(levels[1..bands].partition_point(|&level| level <= value))
}

/// Interpolated value at a fractional grid position, clamped to the grid.
pub fn bilinear(matrix: &Matrix, x: f64, y: f64) -> f64 {
    fn split(position: f64, len: usize) -> (usize, usize, f64) {
        let last = len.saturating_sub(1);
        let position = position.clamp(0., last as f64);
        let lower = (position.floor() as usize).min(last);
        let upper = (lower + 1).min(last);
        (lower, upper, position - lower as f64)
    }
    let (c0, c1, tx) = split(x, matrix.columns());
    let (r0, r1, ty) = split(y, matrix.rows());
    let bottom = matrix.get(r0, c0) * (1. - tx) + matrix.get(r0, c1) * tx;
    let top = matrix.get(r1, c0) * (1. - tx) + matrix.get(r1, c1) * tx;
    bottom * (1. - ty) + top * ty
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: GridPoint,
    pub to: GridPoint,
}

/// Marching squares iso-line of `level` through the grid.
pub fn iso_segments(matrix: &Matrix, level: f64) -> Vec<Segment> {
    let mut segments = Vec::new();
    if matrix.rows() < 2 || matrix.columns() < 2 {
        return segments;
    }
    for row in 0..matrix.rows() - 1 {
        for column in 0..matrix.columns() - 1 {
            // corners counter-clockwise from the lower left
            let corners = [
                (column, row),
                (column + 1, row),
                (column + 1, row + 1),
                (column, row + 1),
            ];
            let values = corners.map(|(c, r)| matrix.get(r, c));
            if values.iter().any(|v| !v.is_finite()) {
                continue;
            }
            let point = |corners: [(usize, usize); 2], values: [f64; 2]| {
                let [(c0, r0), (c1, r1)] = corners;
                let t = if values[1] == values[0] {
                    0.5
                } else {
                    ((level - values[0]) / (values[1] - values[0])).clamp(0., 1.)
                };
                GridPoint {
                    x: c0 as f64 + (c1 as f64 - c0 as f64) * t,
                    y: r0 as f64 + (r1 as f64 - r0 as f64) * t,
                }
            };
            let edge = |index: usize| {
                let next = (index + 1) % 4;
                point([corners[index], corners[next]], [values[index], values[next]])
            };
            // edges: 0 bottom, 1 right, 2 top, 3 left
            let above = values.map(|v| v >= level);
            let case = above
                .iter()
                .enumerate()
                .fold(0, |case, (i, &a)| if a { case | 1 << i } else { case });
            let center_above = values.iter().sum::<f64>() / 4. >= level;
            let pairs: &[(usize, usize)] = match case {
                0 | 15 => &[],
                1 | 14 => &[(3, 0)],
                2 | 13 => &[(0, 1)],
                3 | 12 => &[(3, 1)],
                4 | 11 => &[(1, 2)],
                6 | 9 => &[(0, 2)],
                7 | 8 => &[(2, 3)],
                // saddles: lower left and upper right on one side
                5 if center_above => &[(0, 1), (2, 3)],
                5 => &[(3, 0), (1, 2)],
                10 if center_above => &[(3, 0), (1, 2)],
                10 => &[(0, 1), (2, 3)],
                _ => unreachable!("marching squares case is four bits"),
            };
            segments.extend(pairs.iter().map(|&(a, b)| Segment {
                from: edge(a),
                to: edge(b),
            }));
        }
    }
    segments
}

/// Number of decimals which keep level labels of a given span apart.
pub fn label_decimals(levels: &[f64]) -> usize {
    let step = match levels {
        [first, second, ..] => (second - first).abs(),
        _ => return 0,
    };
    if step == 0. || !step.is_finite() {
        return 0;
    }
    (1. - step.log10().floor()).clamp(0., 6.) as usize
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColorBar {
    pub colormap: Colormap,
    pub levels: Vec<f64>,
}
impl ColorBar {
    pub fn band_count(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }
}

/// One of the two panels of the canvas.
#[derive(Clone, Debug)]
pub struct ContourPanel {
    quantity: Quantity,
    colormap: Colormap,
    matrix: Option<Matrix>,
    levels: Vec<f64>,
    iso_lines: Vec<Segment>,
    color_bar: Option<ColorBar>,
}
impl ContourPanel {
    fn new(quantity: Quantity, colormap: Colormap) -> Self {
        Self {
            quantity,
            colormap,
            matrix: None,
            levels: Vec::new(),
            iso_lines: Vec::new(),
            color_bar: None,
        }
    }
    fn clear(&mut self) {
        self.matrix = None;
        self.levels.clear();
        self.iso_lines.clear();
    }
    fn fill(&mut self, matrix: &Matrix, band_count: usize) {
        self.levels = levels(matrix.range(), band_count);
        let inner = &self.levels[1..self.levels.len() - 1];
        self.iso_lines = inner
            .iter()
            .flat_map(|&level| iso_segments(matrix, level))
            .collect();
        self.matrix = Some(matrix.clone());
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }
    pub fn colormap(&self) -> Colormap {
        self.colormap
    }
    pub fn matrix(&self) -> Option<&Matrix> {
        self.matrix.as_ref()
    }
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }
    pub fn iso_lines(&self) -> &[Segment] {
        &self.iso_lines
    }
    pub fn color_bar(&self) -> Option<&ColorBar> {
        self.color_bar.as_ref()
    }

    /// Band indices of a `width × height` raster, top row first.
    pub fn raster(&self, width: usize, height: usize) -> Vec<Option<usize>> {
        let Some(matrix) = &self.matrix else {
            return vec![None; width * height];
        };
        let scale = |len: usize, cells: usize| {
            if len > 1 {
                cells.saturating_sub(1) as f64 / (len - 1) as f64
            } else {
                0.
            }
        };
        let (x_scale, y_scale) = (scale(width, matrix.columns()), scale(height, matrix.rows()));
        let mut raster = Vec::with_capacity(width * height);
        for py in 0..height {
            let y = (height - 1 - py) as f64 * y_scale;
            for px in 0..width {
                let value = bilinear(matrix, px as f64 * x_scale, y);
                raster.push(band_of(value, &self.levels));
            }
        }
        raster
    }
}

/// Model of the two side-by-side contour plots.
#[derive(Clone, Debug)]
pub struct ContourCanvas {
    panels: [ContourPanel; 2],
    band_count: usize,
    generation: u64,
}
impl Default for ContourCanvas {
    fn default() -> Self {
        Self::new(DEFAULT_BAND_COUNT)
    }
}
impl ContourCanvas {
    pub fn new(band_count: usize) -> Self {
        Self {
            panels: [
                ContourPanel::new(Quantity::Temperature, Colormap::Viridis),
                ContourPanel::new(Quantity::Concentration, Colormap::Plasma),
            ],
            band_count,
            generation: 0,
        }
    }

    /// Replaces both plots. The previous color bars are removed before the
    /// new fills are computed, then every panel gets exactly one new bar.
    pub fn plot(&mut self, pair: &MeasurementPair) {
        for panel in self.panels.iter_mut() {
            panel.color_bar = None;
            panel.clear();
        }
        for (panel, matrix) in self.panels.iter_mut().zip(pair.matrices()) {
            panel.fill(matrix, self.band_count);
            panel.color_bar = Some(ColorBar {
                colormap: panel.colormap,
                levels: panel.levels.clone(),
            });
        }
        self.generation += 1;
    }

    pub fn panels(&self) -> &[ContourPanel; 2] {
        &self.panels
    }

    /// Increases with every `plot`, used to invalidate rendered images.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn color_bar_count(&self) -> usize {
        self.panels.iter().filter(|p| p.color_bar.is_some()).count()
    }

    pub fn to_tsv(&self) -> String {
        self.panels
            .iter()
            .filter_map(|panel| {
                let name = match panel.quantity {
                    Quantity::Temperature => "temperature",
                    Quantity::Concentration => "concentration",
                };
                panel.matrix.as_ref().map(|m| format!("{name}\n{}", m.to_tsv()))
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[test]
fn levels_cover_the_range() {
    let range = Some((-1., 3.));
    assert_eq!(levels(range, 4), vec![-1., 0., 1., 2., 3.]);
}

#[test]
fn flat_field_gets_one_visible_band() {
    let range = Some((0., 0.));
    let levels = levels(range, 8);
    assert_eq!(levels.first(), Some(&-0.5));
    assert_eq!(levels.last(), Some(&0.5));
    assert_eq!(band_of(0., &levels), Some(4));
}

#[test]
fn huge_spans_keep_finite_levels() {
    let mut values = vec![0.; crate::sample::VALUE_COUNT];
    values[0] = -1e308;
    values[1] = 1e308;
    let text = values
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let pair = MeasurementPair::parse_str(&text).unwrap();
    let mut canvas = ContourCanvas::default();
    canvas.plot(&pair);
    let panel = &canvas.panels()[0];
    let levels = panel.levels();
    assert!(levels.iter().all(|l| l.is_finite()), "{levels:?}");
    assert!(levels.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(levels.first(), Some(&-1e308));
    assert_eq!(levels.last(), Some(&1e308));
    let bands = panel
        .raster(40, 40)
        .into_iter()
        .collect::<std::collections::HashSet<_>>();
    assert!(bands.len() > 1);
}

#[test]
fn band_lookup_clamps_and_skips_nan() {
    let levels = [0., 1., 2., 3.];
    assert_eq!(band_of(-5., &levels), Some(0));
    assert_eq!(band_of(0.5, &levels), Some(0));
    assert_eq!(band_of(1., &levels), Some(1));
    assert_eq!(band_of(2.999, &levels), Some(2));
    assert_eq!(band_of(7., &levels), Some(2));
    assert_eq!(band_of(f64::NAN, &levels), None);
    assert_eq!(band_of(1., &[1.]), None);
}

#[test]
fn bilinear_hits_grid_points_and_midpoints() {
    let m = Matrix::from_values(2, 2, vec![0., 2., 4., 6.]).unwrap();
    assert_eq!(bilinear(&m, 0., 0.), 0.);
    assert_eq!(bilinear(&m, 1., 1.), 6.);
    assert_eq!(bilinear(&m, 0.5, 0.), 1.);
    assert_eq!(bilinear(&m, 0.5, 0.5), 3.);
    assert_eq!(bilinear(&m, 5., -3.), 2.);
}

#[test]
fn iso_line_of_a_ramp_is_straight() {
    // value grows with the column
    let m = Matrix::from_values(3, 3, vec![0., 1., 2., 0., 1., 2., 0., 1., 2.]).unwrap();
    let segments = iso_segments(&m, 0.5);
    assert_eq!(segments.len(), 2);
    for s in segments {
        assert_eq!(s.from.x, 0.5);
        assert_eq!(s.to.x, 0.5);
        assert!((s.from.y - s.to.y).abs() == 1.);
    }
}

#[test]
fn saddle_is_split_into_two_segments() {
    let m = Matrix::from_values(2, 2, vec![1., 0., 0., 1.]).unwrap();
    assert_eq!(iso_segments(&m, 0.5).len(), 2);
    assert!(iso_segments(&m, 2.).is_empty());
}

#[test]
fn replotting_replaces_color_bars() {
    let mut canvas = ContourCanvas::default();
    assert_eq!(canvas.color_bar_count(), 0);
    canvas.plot(&MeasurementPair::zeros());
    assert_eq!(canvas.color_bar_count(), 2);
    let mut pair = MeasurementPair::zeros();
    pair.temperature = Matrix::from_values(
        15,
        15,
        (0..225).map(|i| i as f64).collect(),
    )
    .unwrap();
    canvas.plot(&pair);
    assert_eq!(canvas.color_bar_count(), 2);
    assert_eq!(canvas.generation(), 2);
    let [temperature, concentration] = canvas.panels();
    let bar = temperature.color_bar().unwrap();
    assert_eq!(bar.colormap, Colormap::Viridis);
    assert_eq!(bar.levels.first(), Some(&0.));
    assert_eq!(bar.levels.last(), Some(&224.));
    assert_eq!(bar.band_count(), DEFAULT_BAND_COUNT);
    assert_eq!(
        concentration.color_bar().map(|b| b.colormap),
        Some(Colormap::Plasma)
    );
}

#[test]
fn raster_puts_row_zero_at_the_bottom() {
    let mut canvas = ContourCanvas::new(2);
    let mut pair = MeasurementPair::zeros();
    pair.temperature = Matrix::from_values(
        15,
        15,
        (0..225).map(|i| (i / 15) as f64).collect(),
    )
    .unwrap();
    canvas.plot(&pair);
    let raster = canvas.panels()[0].raster(4, 3);
    assert_eq!(raster.len(), 12);
    assert!(raster[..4].iter().all(|b| *b == Some(1)));
    assert!(raster[8..].iter().all(|b| *b == Some(0)));
}

#[test]
fn label_decimals_follow_step() {
    assert_eq!(label_decimals(&[0., 10., 20.]), 0);
    assert_eq!(label_decimals(&[0., 0.25]), 2);
    assert_eq!(label_decimals(&[0., 1.]), 1);
    assert_eq!(label_decimals(&[]), 0);
}
