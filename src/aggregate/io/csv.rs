use std::path::Path;

use anyhow::{Context, Result};
use polars::{frame::DataFrame, prelude::{Column, NamedFrom}, series::Series};

use crate::{aggregate::{Aggregation, ReductionKind, Reduced}, io};

impl Aggregation {
    /// One row per region. Per rule: `<field>`, `<field>_count`, and
    /// `<field>_out_of_range` when the rule has a band; vector rules also get
    /// `<field>_u`, `<field>_v` and `<field>_speed`, with `<field>` holding the
    /// direction. No data is null, never 0.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = vec![
            Series::new("region".into(), self.records.iter().map(|r| r.region.to_string()).collect::<Vec<_>>()).into(),
            Series::new("observations".into(), self.records.iter().map(|r| r.observations as u64).collect::<Vec<_>>()).into(),
        ];

        for (i, rule) in self.rules.rules().iter().enumerate() {
            let field = rule.field().as_ref();
            let aggregates = self.records.iter().map(|record| &record.fields[i]);

            match rule.kind() {
                ReductionKind::VectorMean { .. } => {
                    let parts: Vec<_> = aggregates.clone()
                        .map(|aggregate| match aggregate.value {
                            Reduced::Vector { u, v, speed, direction } => (Some(u), Some(v), Some(speed), direction),
                            _ => (None, None, None, None),
                        })
                        .collect();
                    columns.push(Series::new(field.into(), parts.iter().map(|p| p.3).collect::<Vec<_>>()).into());
                    columns.push(Series::new(format!("{field}_u").into(), parts.iter().map(|p| p.0).collect::<Vec<_>>()).into());
                    columns.push(Series::new(format!("{field}_v").into(), parts.iter().map(|p| p.1).collect::<Vec<_>>()).into());
                    columns.push(Series::new(format!("{field}_speed").into(), parts.iter().map(|p| p.2).collect::<Vec<_>>()).into());
                }
                _ => {
                    let values: Vec<Option<f64>> = aggregates.clone().map(|aggregate| aggregate.value.value()).collect();
                    columns.push(Series::new(field.into(), values).into());
                }
            }

            let counts: Vec<u64> = aggregates.clone().map(|aggregate| aggregate.count as u64).collect();
            columns.push(Series::new(format!("{field}_count").into(), counts).into());

            if rule.band().is_some() {
                let flags: Vec<Option<bool>> = aggregates.map(|aggregate| aggregate.out_of_range).collect();
                columns.push(Series::new(format!("{field}_out_of_range").into(), flags).into());
            }
        }

        DataFrame::new(columns).context("[aggregate::to_dataframe] Failed to assemble columns")
    }

    /// Write the records as CSV.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        io::csv::write_csv(&mut self.to_dataframe()?, path)
    }

    /// Render the records as a CSV string.
    pub fn to_csv_string(&self) -> Result<String> {
        io::csv::write_csv_string(&mut self.to_dataframe()?)
    }
}
