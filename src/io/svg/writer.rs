//! SVG document frame: output targets, header, styles and footer.

use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result};

/// Buffered SVG output file.
pub(crate) fn create_svg_file(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("[io::svg] Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Finish an in-memory SVG document.
pub(crate) fn svg_into_string(buffer: Vec<u8>) -> Result<String> {
    String::from_utf8(buffer).context("[io::svg] SVG output is not valid UTF-8")
}

/// Write the XML declaration, the opening <svg> tag, and a white background.
pub(crate) fn write_svg_header<W: Write>(writer: &mut W, width: f64, height: f64, margin: f64, scale: f64, bounds: &geo::Rect) -> Result<()> {
    writeln!(writer, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
    writeln!(writer, r##"<svg xmlns="http://www.w3.org/2000/svg"
        width="{width}" height="{height}"
        viewBox="0 0 {width} {height}"
        data-x-min="{x_min}" data-x-max="{x_max}"
        data-y-min="{y_min}" data-y-max="{y_max}"
        data-margin="{margin}" data-scale="{scale}">"##,
        x_min = bounds.min().x,
        x_max = bounds.max().x,
        y_min = bounds.min().y,
        y_max = bounds.max().y,
    )?;
    writeln!(writer, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
    Ok(())
}

/// Write styles and the arrowhead marker.
pub(crate) fn write_svg_styles<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, r##"<defs>
<style>
    .region {{ stroke: #111827; stroke-width: 0.5; fill-rule: evenodd; vector-effect: non-scaling-stroke; }}
    .arrow {{ stroke: #111827; stroke-width: 1.2; }}
    .legend {{ font-family: sans-serif; font-size: 14px; fill: #111827; }}
</style>
<marker id="head" viewBox="0 0 10 10" refX="8" refY="5" markerWidth="5" markerHeight="5" orient="auto-start-reverse">
    <path d="M0,0 L10,5 L0,10 z" fill="#111827"/>
</marker>
</defs>"##)?;
    Ok(())
}

pub(crate) fn write_svg_footer<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "</svg>")?;
    Ok(())
}
