mod accumulator;
mod io;
mod record;
mod reduction;

pub use io::ChoroplethOptions;
pub use record::{Aggregation, FieldAggregate, RegionRecord, Reduced};
pub use reduction::{Band, ReductionKind, ReductionRules, Rule, RuleConfig, RulesConfig};

use crate::{attribution::Attribution, error::ConfigError, observation::Observation};
use accumulator::Accumulator;

/// Reduces each region's bucket to one record under a fixed rule set.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionAggregator {
    rules: ReductionRules,
}

impl RegionAggregator {
    pub fn new(rules: ReductionRules) -> Self { Self { rules } }

    /// Validate a rules configuration and build an aggregator from it.
    pub fn from_config(config: &RulesConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(ReductionRules::from_config(config)?))
    }

    #[inline] pub fn rules(&self) -> &ReductionRules { &self.rules }

    /// One record per region, in region input order. Regions with an empty
    /// bucket still get a record, with every field set to no data.
    pub fn aggregate(&self, attribution: &Attribution) -> Aggregation {
        let records = reduce_all(&self.rules, attribution);

        let empty = records.iter().filter(|record| record.observations == 0).count();
        log::info!("[aggregate] reduced {} regions ({empty} without observations)", records.len());

        Aggregation {
            rules: self.rules.clone(),
            records,
            audit: attribution.audit().clone(),
            latest: attribution.latest_observation_time(),
        }
    }
}

/// Reduce the bucket of region `idx`.
fn reduce_region(rules: &ReductionRules, attribution: &Attribution, idx: usize) -> RegionRecord {
    let region = &attribution.index().regions()[idx];
    let bucket: Vec<&Observation> = attribution.bucket(idx).collect();

    let fields = rules.rules().iter()
        .map(|rule| {
            let mut acc = Accumulator::new(rule.kind());
            for observation in &bucket { acc.push(rule, observation) }
            let (value, count) = acc.finish();
            let out_of_range = rule.band()
                .and_then(|band| value.value().map(|v| !band.contains(v)));
            FieldAggregate { field: rule.field().clone(), value, count, out_of_range }
        })
        .collect();

    RegionRecord {
        region: region.name().clone(),
        idx,
        observations: bucket.len(),
        fields,
    }
}

#[cfg(not(feature = "parallel"))]
fn reduce_all(rules: &ReductionRules, attribution: &Attribution) -> Vec<RegionRecord> {
    (0..attribution.len()).map(|idx| reduce_region(rules, attribution, idx)).collect()
}

#[cfg(feature = "parallel")]
fn reduce_all(rules: &ReductionRules, attribution: &Attribution) -> Vec<RegionRecord> {
    use rayon::prelude::*;
    // Each region is folded sequentially, so the result matches the serial build bit for bit.
    (0..attribution.len()).into_par_iter().map(|idx| reduce_region(rules, attribution, idx)).collect()
}
