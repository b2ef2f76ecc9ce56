use std::{io::Write, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDateTime;
use geo::{Centroid, Coord};

use crate::{
    aggregate::{Aggregation, FieldAggregate, ReductionKind, Reduced},
    geom::GeometryIndex,
    io::svg::{self, ColorRamp, Rgb},
};

/// Height reserved below the map for the legend.
const LEGEND_HEIGHT: f64 = 48.0;

/// Longest arrow, as a fraction of the drawing width.
const ARROW_FRACTION: f64 = 0.04;

/// What to draw and how.
#[derive(Clone, Debug, PartialEq)]
pub struct ChoroplethOptions {
    /// Output field to color by.
    pub field: String,
    /// Value range mapped onto the ramp. Defaults to the range of the data.
    pub range: Option<(f64, f64)>,
    pub ramp: ColorRamp,
    pub width: f64,
    pub margin: f64,
    /// Legend timestamp. Defaults to the latest observation time.
    pub time_label: Option<NaiveDateTime>,
}

impl ChoroplethOptions {
    pub fn new(field: impl Into<String>) -> Self {
        Self { field: field.into(), range: None, ramp: ColorRamp::default(), width: 1200.0, margin: 10.0, time_label: None }
    }

    pub fn with_range(mut self, low: f64, high: f64) -> Self {
        self.range = Some((low, high));
        self
    }

    pub fn with_ramp(mut self, ramp: ColorRamp) -> Self {
        self.ramp = ramp;
        self
    }
}

impl Aggregation {
    /// Draw the regions of `index` colored by one field, as an SVG file.
    ///
    /// Regions without data are grey and masked regions get their own color.
    /// Vector fields also get an arrow at each region's centroid.
    pub fn write_choropleth_svg(&self, path: &Path, index: &GeometryIndex, options: &ChoroplethOptions) -> Result<()> {
        let mut writer = svg::create_svg_file(path)?;
        self.render_choropleth(&mut writer, index, options)?;
        writer.flush().with_context(|| format!("[aggregate::to_svg] Failed to write {}", path.display()))
    }

    /// Draw the choropleth into a string.
    pub fn to_choropleth_svg(&self, index: &GeometryIndex, options: &ChoroplethOptions) -> Result<String> {
        let mut buffer = Vec::new();
        self.render_choropleth(&mut buffer, index, options)?;
        svg::svg_into_string(buffer)
    }

    fn render_choropleth(&self, writer: &mut impl Write, index: &GeometryIndex, options: &ChoroplethOptions) -> Result<()> {
        let field = options.field.as_str();
        let rule = self.rules.get(field)
            .ok_or_else(|| anyhow!("[aggregate::to_svg] No rule produces field {field:?}"))?;

        if index.len() != self.records.len() {
            bail!("[aggregate::to_svg] Index has {} regions, aggregation has {} records", index.len(), self.records.len());
        }

        let bounds = index.bounds()
            .ok_or_else(|| anyhow!("[aggregate::to_svg] Could not determine bounds; nothing to draw."))?;
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            bail!("[aggregate::to_svg] Region bounds are degenerate");
        }

        let margin = options.margin;
        let width = options.width;
        let scale = (width - 2.0 * margin) / bounds.width();
        let map_height = bounds.height() * scale + 2.0 * margin;
        let height = map_height + LEGEND_HEIGHT;

        let project = move |coord: &Coord<f64>| -> (f64, f64) {
            let x = margin + (coord.x - bounds.min().x) * scale;
            let y = margin + (bounds.max().y - coord.y) * scale; // invert vertically
            (x, y)
        };

        let aggregates: Vec<Option<&FieldAggregate>> = self.records.iter().map(|record| record.get(field)).collect();
        let (low, high) = options.range.unwrap_or_else(|| data_range(&aggregates));

        let regions: Vec<(&str, _, Rgb)> = index.regions().iter()
            .zip(&aggregates)
            .map(|(region, aggregate)| {
                let color = match aggregate {
                    Some(FieldAggregate { out_of_range: Some(true), .. }) => svg::MASKED,
                    Some(aggregate) => aggregate.value.value()
                        .map_or(svg::NO_DATA, |value| options.ramp.color(value, low, high)),
                    None => svg::NO_DATA,
                };
                (region.name().as_ref(), region.boundary(), color)
            })
            .collect();

        svg::write_svg_header(writer, width, height, margin, scale, &bounds)?;
        svg::write_svg_styles(writer)?;
        svg::draw_regions_with_fill(writer, &regions, &project)?;

        if let ReductionKind::VectorMean { .. } = rule.kind() {
            let max_speed = aggregates.iter()
                .filter_map(|aggregate| match aggregate.map(|a| a.value)? {
                    Reduced::Vector { speed, direction: Some(_), .. } => Some(speed),
                    _ => None,
                })
                .fold(0.0, f64::max);

            for (region, aggregate) in index.regions().iter().zip(&aggregates) {
                let Some(Reduced::Vector { u, v, speed, direction: Some(_) }) = aggregate.map(|a| a.value) else { continue };
                let Some(centroid) = region.boundary().centroid() else { continue };
                let length = ARROW_FRACTION * width * speed / max_speed;
                // Screen y grows downward.
                let offset = (u / speed * length, -v / speed * length);
                svg::draw_arrow(writer, project(&centroid.0), offset)?;
            }
        }

        let legend_y = map_height + LEGEND_HEIGHT / 2.0;
        svg::draw_label(writer, margin, legend_y - 8.0, &format!("{field}: {low:.1} to {high:.1}"))?;
        if let Some(time) = options.time_label.or(self.latest) {
            let text = format!("Latest Observation Time: {}", time.format("%Y-%m-%d %H:%M"));
            svg::draw_label(writer, margin, legend_y + 12.0, &text)?;
        }

        svg::write_svg_footer(writer)
    }
}

/// Min and max over the present values, or (0, 1) when there are none.
fn data_range(aggregates: &[Option<&FieldAggregate>]) -> (f64, f64) {
    aggregates.iter()
        .filter_map(|aggregate| aggregate.and_then(|a| a.value.value()))
        .fold(None, |range: Option<(f64, f64)>, v| match range {
            Some((low, high)) => Some((low.min(v), high.max(v))),
            None => Some((v, v)),
        })
        .unwrap_or((0.0, 1.0))
}
