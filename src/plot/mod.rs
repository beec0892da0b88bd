//! Side-by-side figure of the original polygons and the merged macro-regions.

mod color;
pub(crate) mod scene;

use std::path::Path;

use anyhow::{Result, anyhow};
use tracing::info;

use crate::{config::Config, geom::{PolygonSet, bounds_of}, io, region::MacroRegion};

pub use color::Rgb;
pub(crate) use scene::{Panel, Scene};

/// Errors a caller may want to match on when rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cluster label {label} has no color: the palette holds {palette_len} colors")]
    PaletteExhausted { label: usize, palette_len: usize },

    #[error("unsupported output format for {0:?}: expected a .svg or .png path")]
    UnsupportedFormat(String),
}

/// Output encodings, chosen from the output path's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat { Svg, Png }

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        match path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("svg") => Ok(Self::Svg),
            Some("png") => Ok(Self::Png),
            _ => Err(RenderError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Figure options: palette indexed by cluster label, fill for the original polygons, size and DPI.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub palette: Vec<Rgb>,
    pub original_fill: Rgb,
    pub figure_size: (f64, f64),
    pub dpi: u32,
}

impl PlotOptions {
    /// Resolve color names from the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            palette: config.palette.iter()
                .map(|name| Rgb::parse(name))
                .collect::<Result<Vec<_>>>()?,
            original_fill: Rgb::parse(&config.original_fill)?,
            figure_size: (config.figure_size[0], config.figure_size[1]),
            dpi: config.dpi,
        })
    }

    /// Color for a cluster label. Labels past the end of the palette are an error, never wrapped.
    pub fn color_for(&self, label: usize) -> Result<Rgb, RenderError> {
        self.palette.get(label).copied()
            .ok_or(RenderError::PaletteExhausted { label, palette_len: self.palette.len() })
    }
}

/// Lay out both panels: left holds every original polygon, right holds the macro-regions
/// colored by their own cluster label.
pub(crate) fn build_scene(polygons: &PolygonSet, regions: &[MacroRegion], options: &PlotOptions) -> Result<Scene> {
    // Resolve every color up front so nothing is drawn with a missing color.
    let fills = regions.iter()
        .map(|region| options.color_for(region.label))
        .collect::<Result<Vec<_>, _>>()?;

    let mut scene = Scene::new(options.figure_size, options.dpi);
    let (width, height) = (scene.width as f64, scene.height as f64);

    let title_h = height * 0.08;
    let margin = 0.04 * (width / 2.0).min(height);
    let left = Panel { x0: 0.0, y0: title_h, width: width / 2.0, height: height - title_h };
    let right = Panel { x0: width / 2.0, ..left };

    let bounds = polygons.bounds()
        .ok_or_else(|| anyhow!("[plot] Could not determine bounds; nothing to draw."))?;
    let project = left.projection(bounds, margin);
    for shape in polygons.shapes() {
        scene.add_shape(shape, options.original_fill, Some(Rgb::BLACK), project.as_ref());
    }

    // Same extent as the originals unless there are no regions at all.
    let region_bounds = bounds_of(regions.iter().map(|region| &region.geometry)).unwrap_or(bounds);
    let project = right.projection(region_bounds, margin);
    for (region, fill) in regions.iter().zip(fills) {
        scene.add_shape(&region.geometry, fill, None, project.as_ref());
    }

    let title_size = title_h * 0.45;
    scene.add_label(left.x0 + left.width / 2.0, title_h * 0.7, title_size, "Original Polygons");
    scene.add_label(right.x0 + right.width / 2.0, title_h * 0.7, title_size, "Macro Polygons");

    Ok(scene)
}

/// Render the side-by-side figure to `path`, as SVG or PNG depending on its extension.
pub fn render_side_by_side(path: &Path, polygons: &PolygonSet, regions: &[MacroRegion], options: &PlotOptions) -> Result<()> {
    let format = OutputFormat::from_path(path)?;
    let scene = build_scene(polygons, regions, options)?;

    info!(path = %path.display(), ?format, width = scene.width, height = scene.height, "writing figure");
    match format {
        OutputFormat::Svg => io::write_scene_to_svg(path, &scene),
        OutputFormat::Png => io::write_scene_to_png(path, &scene),
    }
}

/// Render the side-by-side figure as an SVG document in memory.
pub fn render_side_by_side_svg(polygons: &PolygonSet, regions: &[MacroRegion], options: &PlotOptions) -> Result<String> {
    io::write_scene_to_svg_string(&build_scene(polygons, regions, options)?)
}
