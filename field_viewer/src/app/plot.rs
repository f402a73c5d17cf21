use super::colormap;
use crate::localization::{CONCENTRATION, TEMPERATURE};
use crate::Language;
use field_data::contour::{bilinear, label_decimals, ColorBar, ContourCanvas, ContourPanel, GridPoint, Quantity};

/// Side length of the band raster uploaded per panel.
const RASTER_SIZE: usize = 150;
const COLOR_BAR_WIDTH: f32 = 70.;
const COLOR_STRIP_WIDTH: f32 = 14.;

/// Rendered images of the canvas, rebuilt whenever the canvas is re-plotted.
#[derive(Default)]
pub(super) struct ContourPlot {
    generation: Option<u64>,
    textures: Vec<egui::TextureHandle>,
}

impl ContourPlot {
    fn update_textures(&mut self, ctx: &egui::Context, canvas: &ContourCanvas) {
        if self.generation == Some(canvas.generation()) {
            return;
        }
        self.textures = canvas
            .panels()
            .iter()
            .map(|panel| {
                let bands = panel.levels().len().saturating_sub(1);
                let pixels = panel
                    .raster(RASTER_SIZE, RASTER_SIZE)
                    .into_iter()
                    .map(|band| match band {
                        Some(band) => colormap::band_color(panel.colormap(), band, bands),
                        None => egui::Color32::TRANSPARENT,
                    })
                    .collect();
                let image = egui::ColorImage {
                    size: [RASTER_SIZE, RASTER_SIZE],
                    pixels,
                };
                ctx.load_texture(
                    format!("contour_{:?}", panel.quantity()),
                    image,
                    egui::TextureOptions::NEAREST,
                )
            })
            .collect();
        self.generation = Some(canvas.generation());
        log::debug!("contour images rebuilt, generation {}", canvas.generation());
    }

    pub(super) fn show(&mut self, ui: &mut egui::Ui, canvas: &ContourCanvas, language: Language) {
        self.update_textures(ui.ctx(), canvas);
        let textures = &self.textures;
        ui.columns(2, |columns| {
            for ((ui, panel), texture) in columns.iter_mut().zip(canvas.panels()).zip(textures) {
                show_panel(ui, panel, texture, language);
            }
        });
    }
}

fn show_panel(
    ui: &mut egui::Ui,
    panel: &ContourPanel,
    texture: &egui::TextureHandle,
    language: Language,
) {
    let title = match panel.quantity() {
        Quantity::Temperature => TEMPERATURE,
        Quantity::Concentration => CONCENTRATION,
    }
    .localize(language);
    ui.vertical_centered(|ui| ui.strong(title));

    let available = ui.available_size();
    let (response, painter) = ui.allocate_painter(
        egui::vec2(available.x, available.y.max(120.)),
        egui::Sense::hover(),
    );
    let rect = response.rect.shrink(4.);
    let plot_rect = egui::Rect::from_min_max(
        rect.min,
        egui::pos2((rect.right() - COLOR_BAR_WIDTH).max(rect.left()), rect.bottom()),
    );
    painter.image(
        texture.id(),
        plot_rect,
        egui::Rect::from_min_max(egui::pos2(0., 0.), egui::pos2(1., 1.)),
        egui::Color32::WHITE,
    );

    let Some(matrix) = panel.matrix() else {
        return;
    };
    let cells_x = matrix.columns().saturating_sub(1).max(1) as f32;
    let cells_y = matrix.rows().saturating_sub(1).max(1) as f32;
    let to_screen = |p: GridPoint| {
        egui::pos2(
            plot_rect.left() + p.x as f32 / cells_x * plot_rect.width(),
            plot_rect.bottom() - p.y as f32 / cells_y * plot_rect.height(),
        )
    };
    let stroke = egui::Stroke::new(1., egui::Color32::from_black_alpha(90));
    for segment in panel.iso_lines() {
        painter.line_segment([to_screen(segment.from), to_screen(segment.to)], stroke);
    }
    painter.rect_stroke(
        plot_rect,
        egui::Rounding::none(),
        ui.visuals().widgets.noninteractive.bg_stroke,
    );

    if let Some(bar) = panel.color_bar() {
        let bar_rect = egui::Rect::from_min_max(
            egui::pos2(plot_rect.right() + 8., plot_rect.top()),
            rect.max,
        );
        paint_color_bar(&painter, bar_rect, bar, ui.visuals().text_color());
    }

    if let Some(pos) = response.hover_pos().filter(|pos| plot_rect.contains(*pos)) {
        let x = ((pos.x - plot_rect.left()) / plot_rect.width() * cells_x) as f64;
        let y = ((plot_rect.bottom() - pos.y) / plot_rect.height() * cells_y) as f64;
        let decimals = label_decimals(panel.levels()) + 1;
        let value = bilinear(matrix, x, y);
        response.on_hover_text(format!("{title}: {value:.decimals$}"));
    }
}

/// Band strip with one label per level, lowest band at the bottom.
fn paint_color_bar(painter: &egui::Painter, rect: egui::Rect, bar: &ColorBar, text_color: egui::Color32) {
    let bands = bar.band_count();
    if bands == 0 {
        return;
    }
    let strip = egui::Rect::from_min_max(
        rect.min,
        egui::pos2(rect.left() + COLOR_STRIP_WIDTH, rect.bottom()),
    );
    let band_height = strip.height() / bands as f32;
    for band in 0..bands {
        let bottom = strip.bottom() - band as f32 * band_height;
        painter.rect_filled(
            egui::Rect::from_min_max(
                egui::pos2(strip.left(), bottom - band_height),
                egui::pos2(strip.right(), bottom),
            ),
            egui::Rounding::none(),
            colormap::band_color(bar.colormap, band, bands),
        );
    }
    let decimals = label_decimals(&bar.levels);
    for (i, level) in bar.levels.iter().enumerate() {
        painter.text(
            egui::pos2(strip.right() + 4., strip.bottom() - i as f32 * band_height),
            egui::Align2::LEFT_CENTER,
            format!("{level:.decimals$}"),
            egui::FontId::proportional(10.),
            text_color,
        );
    }
}
