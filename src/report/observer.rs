//! Progress hooks for [`super::ProfileAggregator`] runs.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::profile::ProfilerKind;

/// Events emitted while the aggregator runs.
#[derive(Debug, Clone)]
pub enum ProfileEvent {
    RunStarted {
        rows: usize,
        columns: usize,
        profilers: usize,
    },
    ProfilerFinished {
        profiler: ProfilerKind,
        columns: usize,
        elapsed: Duration,
    },
    ProfilerFailed {
        profiler: ProfilerKind,
        message: String,
    },
    RunFinished {
        elapsed: Duration,
        failures: usize,
    },
}

/// Observer hook for profiling events.
///
/// In parallel mode events for different profilers may arrive from different threads and in
/// any order.
pub trait ProfileObserver: Send + Sync {
    fn on_event(&self, event: &ProfileEvent);
}

/// Fans events out to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ProfileObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn ProfileObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ProfileObserver for CompositeObserver {
    fn on_event(&self, event: &ProfileEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

/// Writes one line per event to stderr.
#[derive(Debug, Default)]
pub struct StdErrProfileObserver;

impl ProfileObserver for StdErrProfileObserver {
    fn on_event(&self, event: &ProfileEvent) {
        match event {
            ProfileEvent::RunStarted {
                rows,
                columns,
                profilers,
            } => eprintln!("[profile][start] rows={rows} columns={columns} profilers={profilers}"),
            ProfileEvent::ProfilerFinished {
                profiler,
                columns,
                elapsed,
            } => eprintln!("[profile][ok] profiler={profiler} columns={columns} elapsed={elapsed:?}"),
            ProfileEvent::ProfilerFailed { profiler, message } => {
                eprintln!("[profile][failed] profiler={profiler} err={message}")
            }
            ProfileEvent::RunFinished { elapsed, failures } => {
                eprintln!("[profile][done] elapsed={elapsed:?} failures={failures}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::{CompositeObserver, ProfileEvent, ProfileObserver};

    #[derive(Default)]
    struct Counting(AtomicUsize);

    impl ProfileObserver for Counting {
        fn on_event(&self, _event: &ProfileEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn composite_forwards_to_every_observer() {
        let a = Arc::new(Counting::default());
        let b = Arc::new(Counting::default());
        let composite = CompositeObserver::new(vec![a.clone(), b.clone()]);

        composite.on_event(&ProfileEvent::RunFinished {
            elapsed: Duration::ZERO,
            failures: 0,
        });

        assert_eq!(a.0.load(Ordering::SeqCst), 1);
        assert_eq!(b.0.load(Ordering::SeqCst), 1);
        assert!(format!("{composite:?}").contains("observers_len: 2"));
    }
}
