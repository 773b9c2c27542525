//! Runs every registered profiler over one source and assembles the [`ReportModel`].
//!
//! A profiler that fails is recorded in [`ReportModel::failures`] and the run carries on with
//! the rest. Per-column results are regrouped in source column order whichever
//! [`ExecutionMode`] was used.
//!
//! ```rust
//! use rust_data_profiling::report::{ExecutionMode, ProfileAggregator, ProfileOptions};
//! use rust_data_profiling::types::{DataSet, DataType, Field, Schema, Value};
//!
//! # fn main() -> Result<(), rust_data_profiling::ProfileError> {
//! let ds = DataSet::new(
//!     Schema::new(vec![Field::new("b", DataType::Float64), Field::new("a", DataType::Utf8)]),
//!     vec![vec![Value::Float64(0.5), Value::Utf8("x".to_string())]],
//! );
//! let options = ProfileOptions {
//!     execution: ExecutionMode::Parallel { num_threads: Some(2) },
//!     ..ProfileOptions::default()
//! };
//! let report = ProfileAggregator::new(options)?.run(&ds);
//! assert!(report.failures.is_empty());
//! assert_eq!(report.variables.keys().map(String::as_str).collect::<Vec<_>>(), ["b", "a"]);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{ProfileError, ProfileResult};
use crate::profile::{
    DispersionProfiler, MetricResult, NumericProfiler, Profiler, ProfilerKind, QuantileProfiler, TemporalProfiler,
    TextProfiler, quantile::DEFAULT_LEVELS,
};
use crate::source::{NullDistinct, QuantileInterpolation, TabularSource};

use super::observer::{ProfileEvent, ProfileObserver};
use super::{ColumnProfile, DatasetSummary, ProfilerFailure, ReportModel};

/// How the registered profilers are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One profiler after another on the calling thread.
    #[default]
    Sequential,
    /// Profilers run concurrently on a dedicated rayon pool.
    ///
    /// If `num_threads` is `None`, uses the platform's available parallelism.
    Parallel { num_threads: Option<usize> },
}

/// Configuration for [`ProfileAggregator`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileOptions {
    /// Quantile levels, each in `[0, 1]`.
    pub quantiles: Vec<f64>,
    pub interpolation: QuantileInterpolation,
    /// Whether nulls count towards `distinct_count`.
    pub null_distinct: NullDistinct,
    pub execution: ExecutionMode,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            quantiles: DEFAULT_LEVELS.to_vec(),
            interpolation: QuantileInterpolation::default(),
            null_distinct: NullDistinct::default(),
            execution: ExecutionMode::default(),
        }
    }
}

impl ProfileOptions {
    /// Parse options from a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> ProfileResult<Self> {
        serde_json::from_str(json).map_err(|e| ProfileError::InvalidOption {
            message: e.to_string(),
        })
    }

    /// The default registry: numeric, quantile, dispersion, temporal, text.
    pub fn profilers(&self) -> ProfileResult<Vec<Profiler>> {
        Ok(vec![
            NumericProfiler::new(self.null_distinct).into(),
            QuantileProfiler::new(self.quantiles.clone(), self.interpolation)?.into(),
            DispersionProfiler.into(),
            TemporalProfiler::new(self.null_distinct).into(),
            TextProfiler::new(self.null_distinct).into(),
        ])
    }
}

/// Runs every registered profiler over a source and assembles a [`ReportModel`].
///
/// A failing profiler is logged and recorded in [`ReportModel::failures`]; the others still
/// contribute. [`ProfileAggregator::run`] itself never fails.
pub struct ProfileAggregator {
    profilers: Vec<Profiler>,
    execution: ExecutionMode,
    observer: Option<Arc<dyn ProfileObserver>>,
}

type Outcome = (ProfilerKind, ProfileResult<IndexMap<String, MetricResult>>);

impl ProfileAggregator {
    /// Build an aggregator with the default registry configured by `options`.
    pub fn new(options: ProfileOptions) -> ProfileResult<Self> {
        if let ExecutionMode::Parallel { num_threads: Some(0) } = options.execution {
            return Err(ProfileError::InvalidOption {
                message: "num_threads must be > 0 when set".to_string(),
            });
        }
        Ok(Self {
            profilers: options.profilers()?,
            execution: options.execution,
            observer: None,
        })
    }

    /// Replace the registry. Profilers run, and contribute to each column, in the given order.
    pub fn with_profilers(mut self, profilers: Vec<Profiler>) -> Self {
        self.profilers = profilers;
        self
    }

    /// Attach an observer for profiling events.
    pub fn with_observer(mut self, observer: Arc<dyn ProfileObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn profilers(&self) -> &[Profiler] {
        &self.profilers
    }

    /// Profile `source`.
    #[instrument(skip_all, fields(profilers = self.profilers.len()))]
    pub fn run<S>(&self, source: &S) -> ReportModel
    where
        S: TabularSource + Sync + ?Sized,
    {
        let start = Instant::now();
        let mut failures = Vec::new();

        let table = self.summarise(source, &mut failures);
        info!(
            rows = table.observations,
            columns = table.variables,
            "starting profile run"
        );
        self.emit(ProfileEvent::RunStarted {
            rows: table.observations,
            columns: table.variables,
            profilers: self.profilers.len(),
        });

        let outcomes = match self.execution {
            ExecutionMode::Sequential => self.run_sequential(source),
            ExecutionMode::Parallel { num_threads } => self.run_parallel(source, num_threads),
        };

        let mut results = Vec::with_capacity(outcomes.len());
        for (kind, outcome) in outcomes {
            match outcome {
                Ok(map) => results.push(map),
                Err(e) => {
                    error!(profiler = %kind, error = %e, "profiler failed");
                    self.emit(ProfileEvent::ProfilerFailed {
                        profiler: kind,
                        message: e.to_string(),
                    });
                    failures.push(ProfilerFailure {
                        profiler: kind.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let variables = regroup(source, results);

        let elapsed = start.elapsed();
        info!(
            columns = variables.len(),
            failures = failures.len(),
            "profile run finished in {:.3}s",
            elapsed.as_secs_f64()
        );
        self.emit(ProfileEvent::RunFinished {
            elapsed,
            failures: failures.len(),
        });

        ReportModel {
            table,
            variables,
            failures,
        }
    }

    fn summarise<S>(&self, source: &S, failures: &mut Vec<ProfilerFailure>) -> DatasetSummary
    where
        S: TabularSource + ?Sized,
    {
        let columns = source.columns();
        let mut variable_types = BTreeMap::new();
        for c in &columns {
            *variable_types.entry(c.semantic_type).or_insert(0) += 1;
        }

        let duplicates = source.duplicate_row_count().unwrap_or_else(|e| {
            error!(error = %e, "duplicate row count failed");
            failures.push(ProfilerFailure {
                profiler: "summary".to_string(),
                message: e.to_string(),
            });
            0
        });

        DatasetSummary {
            variables: source.column_count(),
            observations: source.row_count(),
            duplicates,
            variable_types,
        }
    }

    fn run_sequential<S>(&self, source: &S) -> Vec<Outcome>
    where
        S: TabularSource + ?Sized,
    {
        self.profilers.iter().map(|p| self.run_one(p, source)).collect()
    }

    fn run_parallel<S>(&self, source: &S, num_threads: Option<usize>) -> Vec<Outcome>
    where
        S: TabularSource + Sync + ?Sized,
    {
        let n_threads = num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
            .max(1);

        match ThreadPoolBuilder::new().num_threads(n_threads).build() {
            Ok(pool) => pool.install(|| {
                self.profilers
                    .par_iter()
                    .map(|p| self.run_one(p, source))
                    .collect()
            }),
            Err(e) => {
                warn!(error = %e, "failed to build thread pool, running sequentially");
                self.run_sequential(source)
            }
        }
    }

    fn run_one<S>(&self, profiler: &Profiler, source: &S) -> Outcome
    where
        S: TabularSource + ?Sized,
    {
        let kind = profiler.kind();
        let start = Instant::now();
        let outcome = profiler.evaluate(source);
        if let Ok(map) = &outcome {
            let elapsed: Duration = start.elapsed();
            debug!(profiler = %kind, columns = map.len(), ?elapsed, "profiler finished");
            self.emit(ProfileEvent::ProfilerFinished {
                profiler: kind,
                columns: map.len(),
                elapsed,
            });
        }
        (kind, outcome)
    }

    fn emit(&self, event: ProfileEvent) {
        if let Some(o) = &self.observer {
            o.on_event(&event);
        }
    }
}

/// Merge per-profiler mappings into one profile per column, in source column order.
/// Columns no profiler selected are left out.
fn regroup<S>(source: &S, mut results: Vec<IndexMap<String, MetricResult>>) -> IndexMap<String, ColumnProfile>
where
    S: TabularSource + ?Sized,
{
    let mut variables = IndexMap::new();
    for column in source.columns() {
        let profiles: Vec<MetricResult> = results
            .iter_mut()
            .filter_map(|map| map.shift_remove(&column.name))
            .collect();
        if profiles.is_empty() {
            continue;
        }
        variables.insert(
            column.name.clone(),
            ColumnProfile {
                name: column.name,
                semantic_type: column.semantic_type,
                dtype: column.dtype,
                profiles,
            },
        );
    }
    variables
}
