use std::io::Write;

use anyhow::Result;
use geo::{Coord, CoordsIter, LineString, MultiPolygon};

use super::Rgb;

/// Projection function: map coords -> SVG coords (x,y)
pub(crate) type Projection = dyn Fn(&Coord<f64>) -> (f64, f64);

/// Draw each region as one path, holes included, with its fill color.
pub(crate) fn draw_regions_with_fill(
    writer: &mut impl Write,
    regions: &[(&str, &MultiPolygon<f64>, Rgb)],
    project: &Projection,
) -> Result<()> {
    for (name, boundary, color) in regions {
        writeln!(writer, r#"<path class="region" d="{}" style="fill:{}"><title>{}</title></path>"#,
            multipolygon_to_path(boundary, project),
            color,
            escape_text(name),
        )?;
    }
    Ok(())
}

/// Draw an arrow from `origin` along the screen-space offset `(dx, dy)`.
pub(crate) fn draw_arrow(writer: &mut impl Write, origin: (f64, f64), offset: (f64, f64)) -> Result<()> {
    let (x1, y1) = origin;
    let (x2, y2) = (x1 + offset.0, y1 + offset.1);
    writeln!(writer, r##"<line class="arrow" x1="{x1:.3}" y1="{y1:.3}" x2="{x2:.3}" y2="{y2:.3}" marker-end="url(#head)"/>"##)?;
    Ok(())
}

/// Write a line of text at (x, y).
pub(crate) fn draw_label(writer: &mut impl Write, x: f64, y: f64, text: &str) -> Result<()> {
    writeln!(writer, r#"<text class="legend" x="{x:.3}" y="{y:.3}">{}</text>"#, escape_text(text))?;
    Ok(())
}

/// Build a compact SVG path string for a MultiPolygon (exteriors + holes).
fn multipolygon_to_path(shape: &MultiPolygon<f64>, project: &Projection) -> String {
    let mut out = String::new();

    for polygon in &shape.0 {
        out.push_str(&ring_to_path(polygon.exterior(), project));
        for interior in polygon.interiors() {
            out.push_str(&ring_to_path(interior, project));
        }
    }

    out
}

/// Build a compact SVG path string for a LineString (ring).
fn ring_to_path(ring: &LineString<f64>, project: &Projection) -> String {
    let mut out = String::new();

    let mut coords = ring.coords_iter()
        .map(|coord| project(&coord));
    if let Some((x, y)) = coords.next() {
        out.push_str(&format!(" M{x:.3},{y:.3}"));
        for (x, y) in coords {
            out.push_str(&format!(" L{x:.3},{y:.3}"));
        }
        out.push('Z');
    }

    out
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
