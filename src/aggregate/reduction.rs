use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the values of one field are combined within a region.
#[derive(Clone, Debug, PartialEq)]
pub enum ReductionKind {
    /// Arithmetic mean over present values; absent values count for nothing.
    MeanSkipMissing,
    /// Mean direction of angles in degrees clockwise from north.
    CircularMean,
    /// Arithmetic mean of a non-negative magnitude; negative readings are skipped.
    MagnitudeMean,
    /// Speed-weighted mean of direction/speed pairs read from two source fields.
    VectorMean { direction: Arc<str>, speed: Arc<str> },
}

impl ReductionKind {
    /// Configuration name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MeanSkipMissing => "mean-skip-missing",
            Self::CircularMean => "circular-mean",
            Self::MagnitudeMean => "magnitude-mean",
            Self::VectorMean { .. } => "vector-mean",
        }
    }
}

/// Inclusive display band for the threshold mask.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    /// Construct a band, checking that `low <= high` and neither bound is NaN.
    pub fn new(field: &str, low: f64, high: f64) -> Result<Self, ConfigError> {
        if low.is_nan() || high.is_nan() || low > high {
            return Err(ConfigError::InvalidBand { field: field.to_string(), low, high })
        }
        Ok(Self { low, high })
    }

    #[inline] pub fn contains(&self, value: f64) -> bool { self.low <= value && value <= self.high }
}

/// One output field: what it is called, how it is reduced, and its optional mask band.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    field: Arc<str>,
    kind: ReductionKind,
    band: Option<Band>,
}

impl Rule {
    pub fn new(field: &str, kind: ReductionKind) -> Self {
        Self { field: Arc::from(field), kind, band: None }
    }

    pub fn mean(field: &str) -> Self { Self::new(field, ReductionKind::MeanSkipMissing) }

    pub fn circular(field: &str) -> Self { Self::new(field, ReductionKind::CircularMean) }

    pub fn magnitude(field: &str) -> Self { Self::new(field, ReductionKind::MagnitudeMean) }

    pub fn vector(field: &str, direction: &str, speed: &str) -> Self {
        Self::new(field, ReductionKind::VectorMean { direction: Arc::from(direction), speed: Arc::from(speed) })
    }

    pub fn with_band(mut self, band: Band) -> Self {
        self.band = Some(band);
        self
    }

    #[inline] pub fn field(&self) -> &Arc<str> { &self.field }

    #[inline] pub fn kind(&self) -> &ReductionKind { &self.kind }

    #[inline] pub fn band(&self) -> Option<&Band> { self.band.as_ref() }
}

/// Serialized form of one rule, as read from a rules file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub field: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band: Option<[f64; 2]>,
}

/// Serialized rule set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    pub rules: Vec<RuleConfig>,
}

impl RulesConfig {
    /// The configuration form of `ReductionRules::weather_defaults`.
    pub fn weather_defaults() -> Self {
        ReductionRules::weather_defaults().to_config()
    }
}

/// A validated, ordered rule set. Output fields appear in rule order.
#[derive(Clone, Debug, PartialEq)]
pub struct ReductionRules {
    rules: Vec<Rule>,
}

impl ReductionRules {
    /// Build a rule set from rules, rejecting duplicate output fields.
    pub fn new(rules: Vec<Rule>) -> Result<Self, ConfigError> {
        for (i, rule) in rules.iter().enumerate() {
            if rules[..i].iter().any(|other| other.field == rule.field) {
                return Err(ConfigError::DuplicateRule { field: rule.field.to_string() })
            }
        }
        Ok(Self { rules })
    }

    /// Validate a rules configuration. Every entry is checked before anything is returned,
    /// so a bad configuration fails before any region is processed.
    pub fn from_config(config: &RulesConfig) -> Result<Self, ConfigError> {
        let mut rules: Vec<Rule> = Vec::with_capacity(config.rules.len());
        let mut masks: Vec<(&str, Band)> = Vec::new();

        for entry in &config.rules {
            let field = entry.field.as_str();
            let band = entry.band
                .map(|[low, high]| Band::new(field, low, high))
                .transpose()?;

            let kind = match entry.kind.trim() {
                "mean-skip-missing" => ReductionKind::MeanSkipMissing,
                "circular-mean" => ReductionKind::CircularMean,
                "magnitude-mean" => ReductionKind::MagnitudeMean,
                "vector-mean" => {
                    let require = |value: &Option<String>, parameter: &'static str| value.as_deref()
                        .map(Arc::<str>::from)
                        .ok_or_else(|| ConfigError::MissingParameter { field: field.to_string(), kind: "vector-mean", parameter });
                    ReductionKind::VectorMean {
                        direction: require(&entry.direction, "direction")?,
                        speed: require(&entry.speed, "speed")?,
                    }
                }
                "threshold-mask" => {
                    let band = band.ok_or_else(|| ConfigError::MissingParameter {
                        field: field.to_string(),
                        kind: "threshold-mask",
                        parameter: "band",
                    })?;
                    masks.push((field, band));
                    continue;
                }
                other => return Err(ConfigError::UnknownReductionKind {
                    field: field.to_string(),
                    kind: other.to_string(),
                }),
            };

            rules.push(Rule { field: Arc::from(field), kind, band });
        }

        let mut rules = Self::new(rules)?;

        // Masks attach to a reduction regardless of where they appear in the list.
        for (field, band) in masks {
            let rule = rules.rules.iter_mut()
                .find(|rule| rule.field.as_ref() == field)
                .ok_or_else(|| ConfigError::MaskWithoutReduction { field: field.to_string() })?;
            rule.band = Some(band);
        }

        Ok(rules)
    }

    /// Rules for the Central Weather Bureau station feed (O-A0001-001 element names).
    pub fn weather_defaults() -> Self {
        Self {
            rules: vec![
                Rule::mean("TEMP").with_band(Band { low: -10.0, high: 999.0 }),
                Rule::mean("D_TX"),
                Rule::mean("D_TN"),
                Rule::mean("H_24R"),
                Rule::mean("HUMD"),
                Rule::magnitude("WDSD"),
                Rule::circular("WDIR"),
                Rule::vector("WIND", "WDIR", "WDSD"),
            ],
        }
    }

    /// Convert back to the serialized form.
    pub fn to_config(&self) -> RulesConfig {
        RulesConfig {
            rules: self.rules.iter()
                .map(|rule| {
                    let (direction, speed) = match &rule.kind {
                        ReductionKind::VectorMean { direction, speed } => {
                            (Some(direction.to_string()), Some(speed.to_string()))
                        }
                        _ => (None, None),
                    };
                    RuleConfig {
                        field: rule.field.to_string(),
                        kind: rule.kind.name().to_string(),
                        direction,
                        speed,
                        band: rule.band.map(|band| [band.low, band.high]),
                    }
                })
                .collect(),
        }
    }

    #[inline] pub fn rules(&self) -> &[Rule] { &self.rules }

    #[inline] pub fn len(&self) -> usize { self.rules.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.rules.is_empty() }

    /// Get the rule producing `field`.
    pub fn get(&self, field: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.field.as_ref() == field)
    }
}
