//! Quantiles of numeric columns at configurable levels.

use serde::Serialize;

use crate::error::{ProfileError, ProfileResult};
use crate::source::{Aggregate, QuantileInterpolation, Scalar, SemanticTypeSet};

use super::{MetricProfiler, ProfilerKind, check_arity, spread};

/// Levels used when none are configured.
pub const DEFAULT_LEVELS: [f64; 5] = [0.05, 0.25, 0.5, 0.75, 0.95];

/// One `quantile(p)` aggregate per configured level, plus the inter-quartile range.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileProfiler {
    levels: Vec<f64>,
    interpolation: QuantileInterpolation,
}

impl QuantileProfiler {
    /// Fails if a level is outside `[0, 1]` or appears twice.
    pub fn new(levels: Vec<f64>, interpolation: QuantileInterpolation) -> ProfileResult<Self> {
        for (i, p) in levels.iter().enumerate() {
            if !(0.0..=1.0).contains(p) {
                return Err(ProfileError::InvalidOption {
                    message: format!("quantile level {p} is outside [0, 1]"),
                });
            }
            if levels[..i].contains(p) {
                return Err(ProfileError::InvalidOption {
                    message: format!("quantile level {p} is configured twice"),
                });
            }
        }
        Ok(Self { levels, interpolation })
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }
}

impl Default for QuantileProfiler {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS.to_vec(),
            interpolation: QuantileInterpolation::default(),
        }
    }
}

/// A quantile level and its value (`None` for an empty column).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuantileValue {
    pub level: f64,
    pub value: Option<f64>,
}

/// Quantiles of one column in configured order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantileProfile {
    quantiles: Vec<QuantileValue>,
    iqr: Option<f64>,
}

impl QuantileProfile {
    pub fn quantiles(&self) -> &[QuantileValue] {
        &self.quantiles
    }

    /// Value at `level`, if that level was configured and defined.
    pub fn get(&self, level: f64) -> Option<f64> {
        self.quantiles
            .iter()
            .find(|q| q.level == level)
            .and_then(|q| q.value)
    }

    /// `q(0.75) - q(0.25)`; `None` when either level is missing or undefined.
    pub fn iqr(&self) -> Option<f64> {
        self.iqr
    }
}

impl MetricProfiler for QuantileProfiler {
    type Output = QuantileProfile;

    fn kind(&self) -> ProfilerKind {
        ProfilerKind::Quantile
    }

    fn applies_to(&self) -> SemanticTypeSet {
        SemanticTypeSet::NUMERIC
    }

    fn aggregate_list(&self) -> Vec<Aggregate> {
        self.levels
            .iter()
            .map(|p| Aggregate::Quantile(*p, self.interpolation))
            .collect()
    }

    fn decode(&self, values: &[Scalar]) -> ProfileResult<QuantileProfile> {
        check_arity(self.kind(), self.levels.len(), values)?;

        let quantiles: Vec<QuantileValue> = self
            .levels
            .iter()
            .zip(values)
            .map(|(level, v)| QuantileValue {
                level: *level,
                value: v.as_f64(),
            })
            .collect();
        let at = |level: f64| quantiles.iter().find(|q| q.level == level).and_then(|q| q.value);
        let iqr = spread(at(0.75), at(0.25));

        Ok(QuantileProfile { quantiles, iqr })
    }
}
