//! SVG writing operations.

use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result};

use crate::plot::Scene;

pub(crate) struct SvgWriter {
    writer: BufWriter<File>
}

/// String-based SVG writer, used to render figures in memory.
pub(crate) struct SvgStringWriter {
    buffer: Vec<u8>
}

/// Implement std::io::Write so `write!` / `writeln!` work.
impl Write for SvgWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.writer.write(buf) }

    fn flush(&mut self) -> std::io::Result<()> { self.writer.flush() }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> { self.writer.write_all(buf) }
}

impl Write for SvgStringWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        std::io::Result::Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> { std::io::Result::Ok(()) }
}

impl SvgStringWriter {
    /// Create a new string-based SVG writer
    pub(crate) fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Get the SVG string
    pub(crate) fn into_string(self) -> Result<String> {
        String::from_utf8(self.buffer)
            .context("[io::svg] SVG output is not valid UTF-8")
    }
}

impl SvgWriter {
    /// Create a new SVG writer to a file path, overwriting any existing file.
    pub(crate) fn new(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("[io::svg] Failed to create {}", path.display()))?;

        Ok(Self { writer: BufWriter::new(file) })
    }
}

/// Write a whole scene as an SVG file.
pub(crate) fn write_scene_to_svg(path: &Path, scene: &Scene) -> Result<()> {
    let mut writer = SvgWriter::new(path)?;
    write_svg_scene(&mut writer, scene)?;
    writer.flush()
        .with_context(|| format!("[io::svg] Failed to flush {}", path.display()))
}

/// Render a whole scene to an SVG string.
pub(crate) fn write_scene_to_svg_string(scene: &Scene) -> Result<String> {
    let mut writer = SvgStringWriter::new();
    write_svg_scene(&mut writer, scene)?;
    writer.into_string()
}

/// Write a scene to any writer: header, styles, shapes, labels, footer.
pub(crate) fn write_svg_scene<W: Write>(writer: &mut W, scene: &Scene) -> Result<()> {
    write_svg_header(writer, scene)?;
    write_svg_styles(writer)?;

    for shape in &scene.shapes {
        let mut d = String::new();
        for ring in &shape.rings {
            super::ring_to_path(ring, &mut d);
        }
        match shape.stroke {
            Some(stroke) => writeln!(writer, r#"<path class="shp" d="{d}" fill="{}" stroke="{stroke}"/>"#, shape.fill)?,
            None => writeln!(writer, r#"<path class="shp" d="{d}" fill="{}" stroke="none"/>"#, shape.fill)?,
        }
    }

    for label in &scene.labels {
        writeln!(writer, r#"<text class="title" x="{:.1}" y="{:.1}" font-size="{:.1}">{}</text>"#,
            label.x, label.y, label.size, escape_text(&label.text))?;
    }

    write_svg_footer(writer)
}

/// Write SVG header to any writer (standalone function).
/// Physical size is given in inches so the document keeps the figure's DPI.
pub(crate) fn write_svg_header<W: Write>(writer: &mut W, scene: &Scene) -> Result<()> {
    let (width_in, height_in) = scene.inches();
    writeln!(writer, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
    writeln!(writer, r##"<svg xmlns="http://www.w3.org/2000/svg"
        width="{width_in}in" height="{height_in}in"
        viewBox="0 0 {width} {height}"
        data-dpi="{dpi}">"##,
        width = scene.width,
        height = scene.height,
        dpi = scene.dpi,
    )?;
    writeln!(writer, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
    Ok(())
}

/// Write SVG styles to any writer (standalone function).
pub(crate) fn write_svg_styles<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, r##"<defs>
<style>
    .shp {{ fill-rule: evenodd; stroke-width: 1; stroke-linejoin: round; }}
    .title {{ font-family: sans-serif; text-anchor: middle; fill: #000000; }}
</style>
</defs>"##)?;
    Ok(())
}

/// Write SVG footer to any writer (standalone function).
pub(crate) fn write_svg_footer<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "</svg>")?;
    Ok(())
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
