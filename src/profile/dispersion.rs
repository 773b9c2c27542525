//! Spread and shape of numeric columns.

use serde::Serialize;

use crate::error::ProfileResult;
use crate::source::{Aggregate, Scalar, SemanticTypeSet};

use super::{MetricProfiler, ProfilerKind, check_arity};

/// Standard deviation, coefficient of variation, kurtosis and skewness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispersionProfiler;

/// Dispersion and shape of one column. Each field is `None` when undefined for the data
/// (fewer than two values, zero variance, zero mean for the coefficient of variation).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispersionProfile {
    std_dev: Option<f64>,
    coefficient_of_variation: Option<f64>,
    kurtosis: Option<f64>,
    skewness: Option<f64>,
}

impl DispersionProfile {
    /// Sample standard deviation.
    pub fn std_dev(&self) -> Option<f64> {
        self.std_dev
    }

    pub fn coefficient_of_variation(&self) -> Option<f64> {
        self.coefficient_of_variation
    }

    /// Excess (Fisher) kurtosis.
    pub fn kurtosis(&self) -> Option<f64> {
        self.kurtosis
    }

    pub fn skewness(&self) -> Option<f64> {
        self.skewness
    }
}

impl MetricProfiler for DispersionProfiler {
    type Output = DispersionProfile;

    fn kind(&self) -> ProfilerKind {
        ProfilerKind::Dispersion
    }

    fn applies_to(&self) -> SemanticTypeSet {
        SemanticTypeSet::NUMERIC
    }

    fn aggregate_list(&self) -> Vec<Aggregate> {
        vec![
            Aggregate::StdDev,
            Aggregate::CoefficientOfVariation,
            Aggregate::Kurtosis,
            Aggregate::Skewness,
        ]
    }

    fn decode(&self, values: &[Scalar]) -> ProfileResult<DispersionProfile> {
        check_arity(self.kind(), 4, values)?;
        Ok(DispersionProfile {
            std_dev: values[0].as_f64(),
            coefficient_of_variation: values[1].as_f64(),
            kurtosis: values[2].as_f64(),
            skewness: values[3].as_f64(),
        })
    }
}
