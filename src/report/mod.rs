//! Report model and the aggregator that builds it.
//!
//! A [`ReportModel`] pairs a [`DatasetSummary`] with one [`ColumnProfile`] per profiled column,
//! keyed by column name in source column order. Every node is `Serialize`, and undefined values
//! are `None` (`null` in JSON).

mod aggregator;
pub mod observer;

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::profile::{
    DispersionProfile, MetricResult, NumericProfile, ProfilerKind, QuantileProfile, TemporalProfile, TextProfile,
};
use crate::source::SemanticType;

pub use aggregator::{ExecutionMode, ProfileAggregator, ProfileOptions};
pub use observer::{CompositeObserver, ProfileEvent, ProfileObserver, StdErrProfileObserver};

/// Dataset-level shape, computed once per run independently of the profilers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DatasetSummary {
    /// Number of columns.
    pub variables: usize,
    /// Number of rows.
    pub observations: usize,
    /// Rows that are exactly equal to at least one other row.
    pub duplicates: usize,
    /// Column count per semantic type.
    pub variable_types: BTreeMap<SemanticType, usize>,
}

/// All profiler results for one column, in registry order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub semantic_type: SemanticType,
    /// Physical type as the source reports it.
    pub dtype: String,
    pub profiles: Vec<MetricResult>,
}

macro_rules! typed_accessor {
    ($(#[$doc:meta])* $name:ident, $variant:ident, $ty:ty) => {
        $(#[$doc])*
        pub fn $name(&self) -> Option<&$ty> {
            self.profiles.iter().find_map(|p| match p {
                MetricResult::$variant(v) => Some(v),
                _ => None,
            })
        }
    };
}

impl ColumnProfile {
    typed_accessor!(
        /// Numeric summary, if the numeric profiler ran for this column.
        numeric, Numeric, NumericProfile
    );
    typed_accessor!(quantile, Quantile, QuantileProfile);
    typed_accessor!(dispersion, Dispersion, DispersionProfile);
    typed_accessor!(temporal, Temporal, TemporalProfile);
    typed_accessor!(text, Text, TextProfile);

    /// Kinds of profiler that contributed to this column.
    pub fn kinds(&self) -> impl Iterator<Item = ProfilerKind> + '_ {
        self.profiles.iter().map(MetricResult::kind)
    }
}

/// A profiler (or the summary pass) that failed and was left out of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfilerFailure {
    /// Profiler kind, or `summary` for the dataset summary pass.
    pub profiler: String,
    pub message: String,
}

/// The result of one profiling run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportModel {
    pub table: DatasetSummary,
    pub variables: IndexMap<String, ColumnProfile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ProfilerFailure>,
}

impl ReportModel {
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.variables.get(name)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
