//! # Run Registry
//!
//! Each user-triggered calculation takes a [`RunToken`] from the shared
//! [`RunRegistry`]. Beginning a new run supersedes every older token, and an
//! older sweep notices through its cancellation predicate on its next grid
//! point.
//!
//! [`SweepBoard`] holds the table shown to the user. Tables are replaced
//! wholesale and only the latest run may publish, so two sweeps never mix
//! their rows.
//!
//! ```rust
//! use std::sync::Arc;
//! use sc_force_core::calculations::runs::RunRegistry;
//!
//! let registry = Arc::new(RunRegistry::default());
//! let first = registry.begin();
//! let second = registry.begin();
//! assert!(first.is_superseded());
//! assert!(!second.is_superseded());
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::input::ConductorInput;
use super::pipeline::Dispatcher;
use super::sweep::{run_sweep, SweepConfig, SweepRow};
use crate::errors::CalcResult;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Guarded values are plain data, valid even after a panicking holder
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Issues monotonically increasing run ids.
#[derive(Debug, Default)]
pub struct RunRegistry {
    latest: Mutex<u64>,
}

impl RunRegistry {
    /// Start a new run, superseding all earlier ones.
    pub fn begin(self: &Arc<Self>) -> RunToken {
        let mut latest = lock(&self.latest);
        *latest += 1;
        debug!(run_id = *latest, "run started");
        RunToken {
            registry: Arc::clone(self),
            id: *latest,
        }
    }

    /// Id of the newest run, 0 before the first.
    pub fn latest(&self) -> u64 {
        *lock(&self.latest)
    }
}

/// Identity of one run.
#[derive(Debug, Clone)]
pub struct RunToken {
    registry: Arc<RunRegistry>,
    id: u64,
}

impl RunToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// True once a newer run has begun.
    pub fn is_superseded(&self) -> bool {
        self.registry.latest() != self.id
    }
}

/// A published sweep table.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepTable {
    pub run_id: u64,
    pub rows: Arc<Vec<SweepRow>>,
}

/// Latest sweep table.
#[derive(Debug, Default)]
pub struct SweepBoard {
    table: Mutex<Option<SweepTable>>,
}

impl SweepBoard {
    /// Replace the table with `rows` unless `token` has been superseded.
    ///
    /// Returns whether the table was replaced.
    pub fn publish(&self, token: &RunToken, rows: Vec<SweepRow>) -> bool {
        let mut table = lock(&self.table);
        let newer_published = table
            .as_ref()
            .is_some_and(|current| current.run_id > token.id());
        let stale = token.is_superseded() || newer_published;
        if stale {
            debug!(run_id = token.id(), "discarding rows of superseded run");
            return false;
        }
        *table = Some(SweepTable {
            run_id: token.id(),
            rows: Arc::new(rows),
        });
        true
    }

    /// Current table, if any run has published.
    pub fn snapshot(&self) -> Option<SweepTable> {
        lock(&self.table).clone()
    }
}

/// Start a run, sweep with its supersession as the cancellation predicate
/// and publish the rows.
///
/// Returns the run id.
pub fn run_registered_sweep(
    registry: &Arc<RunRegistry>,
    board: &SweepBoard,
    input: &mut ConductorInput,
    dispatcher: &mut Dispatcher,
    config: SweepConfig,
) -> CalcResult<u64> {
    let token = registry.begin();
    let rows = run_sweep(input, dispatcher, config, || token.is_superseded(), token.id())?;
    board.publish(&token, rows);
    Ok(token.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::pipeline::fixtures::twin_bundle;
    use crate::errors::CalcError;
    use std::sync::mpsc;
    use std::thread;

    fn grid() -> SweepConfig {
        SweepConfig {
            min: 10.0,
            max: 12.0,
            step: 0.5,
        }
    }

    #[test]
    fn test_ids_increase() {
        let registry = Arc::new(RunRegistry::default());
        assert_eq!(registry.latest(), 0);
        let a = registry.begin();
        let b = registry.begin();
        assert_eq!(a.id(), 1);
        assert_eq!(b.id(), 2);
        assert!(a.is_superseded());
        assert!(!b.is_superseded());
    }

    #[test]
    fn test_stale_publish_rejected() {
        let registry = Arc::new(RunRegistry::default());
        let board = SweepBoard::default();
        let old = registry.begin();
        let new = registry.begin();
        let row = SweepRow {
            f_st: 1.0,
            f_td: Some(2.0),
            f_fd: None,
            f_pi_d: None,
        };

        assert!(board.publish(&new, vec![row]));
        assert!(!board.publish(&old, vec![row, row]));
        let table = board.snapshot().unwrap();
        assert_eq!(table.run_id, 2);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_newer_sweep_cancels_older() {
        let registry = Arc::new(RunRegistry::default());
        let board = SweepBoard::default();

        // The first sweep's predicate starts a second run mid-loop
        let first = registry.begin();
        let mut input = twin_bundle();
        let mut dispatcher = Dispatcher::default();
        let mut second = None;
        let mut checks = 0;
        let outcome = run_sweep(
            &mut input,
            &mut dispatcher,
            grid(),
            || {
                checks += 1;
                if checks == 2 {
                    second = Some(registry.begin());
                }
                first.is_superseded()
            },
            first.id(),
        );
        assert_eq!(outcome.unwrap_err(), CalcError::Cancelled { run_id: 1 });

        let second = second.unwrap();
        let cancelled = || second.is_superseded();
        let rows = run_sweep(&mut input, &mut dispatcher, grid(), cancelled, second.id()).unwrap();
        assert!(board.publish(&second, rows));

        let table = board.snapshot().unwrap();
        assert_eq!(table.run_id, 2);
        assert_eq!(table.rows.len(), 5);
        assert_eq!(input, twin_bundle());
    }

    #[test]
    fn test_concurrent_sweeps_only_latest_published() {
        let registry = Arc::new(RunRegistry::default());
        let board = SweepBoard::default();
        let (started_tx, started_rx) = mpsc::channel();
        let (resume_tx, resume_rx) = mpsc::channel::<()>();

        thread::scope(|scope| {
            let (registry, board) = (&registry, &board);
            let older = scope.spawn(move || {
                let token = registry.begin();
                let mut input = twin_bundle();
                let mut dispatcher = Dispatcher::default();
                let mut first_check = true;
                let outcome = run_sweep(
                    &mut input,
                    &mut dispatcher,
                    grid(),
                    || {
                        if first_check {
                            first_check = false;
                            let _ = started_tx.send(());
                            let _ = resume_rx.recv();
                        }
                        token.is_superseded()
                    },
                    token.id(),
                );
                match outcome {
                    Ok(rows) => {
                        board.publish(&token, rows);
                        None
                    }
                    Err(err) => Some(err),
                }
            });

            started_rx.recv().unwrap();
            let mut input = twin_bundle();
            let mut dispatcher = Dispatcher::default();
            let id =
                run_registered_sweep(registry, board, &mut input, &mut dispatcher, grid()).unwrap();
            assert_eq!(id, 2);
            resume_tx.send(()).unwrap();

            let err = older.join().unwrap().unwrap();
            assert!(err.is_cancellation());
        });

        let table = board.snapshot().unwrap();
        assert_eq!(table.run_id, 2);
        assert_eq!(table.rows.len(), 5);
    }
}
