use crate::{
    aggregate::{Aggregation, ReductionRules, RegionAggregator},
    attribution::Attribution,
    geom::GeometryIndex,
    observation::Observation,
};

/// Attribution followed by aggregation over a fixed index and rule set.
#[derive(Debug, Clone)]
pub struct Pipeline {
    index: GeometryIndex,
    aggregator: RegionAggregator,
}

impl Pipeline {
    pub fn new(index: GeometryIndex, rules: ReductionRules) -> Self {
        Self { index, aggregator: RegionAggregator::new(rules) }
    }

    #[inline] pub fn index(&self) -> &GeometryIndex { &self.index }

    #[inline] pub fn rules(&self) -> &ReductionRules { self.aggregator.rules() }

    /// Attribute a batch and reduce it. Neither input is mutated, so repeated
    /// runs over the same batch give identical results.
    pub fn run(&self, observations: &[Observation]) -> Aggregation {
        let attribution = Attribution::join(&self.index, observations);
        self.aggregator.aggregate(&attribution)
    }
}
