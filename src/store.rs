use itertools::Itertools;
use std::ops::Deref;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task;
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::record::Record;
use crate::source::RecordSource;
use crate::Error;

pub const DEFAULT_RELOAD_COOLDOWN: Duration = Duration::from_secs(60);

/// The Store publishes an immutable snapshot of the record set and swaps it wholesale on reload.
/// Readers grab an `Arc` to the current snapshot and never observe a partially built one. The
/// store is cheap to clone and is shared by every connection.
#[derive(Clone)]
pub struct Store {
    inner: Arc<InnerStore>,
}

pub struct InnerStore {
    snapshot: RwLock<Arc<Snapshot>>,
    // Claimed before loading starts, so a reload racing a slow load is throttled. Only held for
    // the check-and-set, never across the load itself.
    last_reload: Mutex<Option<Instant>>,
    cooldown: Duration,
    source: Box<dyn RecordSource>,
}

/// One generation of the record set together with the fields it uses.
#[derive(Debug, Default)]
pub struct Snapshot {
    records: Vec<Record>,
    universe: Universe,
}

/// The distinct field names seen across every record of a snapshot, in first-seen order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Universe {
    fields: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ReloadOutcome {
    Reloaded { records: usize },
    Throttled { remaining: Duration },
}

impl Store {
    /// Creates the store and publishes the first snapshot. Start up does not count as a reload,
    /// so the first `reload` command is never throttled.
    pub fn new(source: impl RecordSource + 'static, cooldown: Duration) -> Result<Store, Error> {
        let snapshot = Snapshot::new(source.load()?);

        let inner = Arc::new(InnerStore {
            snapshot: RwLock::new(Arc::new(snapshot)),
            last_reload: Mutex::new(None),
            cooldown,
            source: Box::new(source),
        });

        Ok(Self { inner })
    }

    /// A store over a fixed set of records; reloading republishes the same records.
    pub fn from_records(records: Vec<Record>) -> Store {
        let inner = Arc::new(InnerStore {
            snapshot: RwLock::new(Arc::new(Snapshot::new(records.clone()))),
            last_reload: Mutex::new(None),
            cooldown: DEFAULT_RELOAD_COOLDOWN,
            source: Box::new(move || -> Result<Vec<Record>, Error> { Ok(records.clone()) }),
        });

        Self { inner }
    }
}

impl Deref for Store {
    type Target = InnerStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl InnerStore {
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reloads the record set unless the previous reload happened less than `cooldown` ago.
    ///
    /// The new snapshot is built completely before it is published. If loading fails the
    /// current snapshot is kept and the throttle timestamp is restored.
    pub fn reload(&self) -> Result<ReloadOutcome, Error> {
        let now = Instant::now();
        let previous = {
            let mut last_reload = self
                .last_reload
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            if let Some(last) = *last_reload {
                let elapsed = now.saturating_duration_since(last);
                if elapsed < self.cooldown {
                    return Ok(ReloadOutcome::Throttled {
                        remaining: self.cooldown - elapsed,
                    });
                }
            }

            last_reload.replace(now)
        };

        let records = match off_runtime(|| self.source.load()) {
            Ok(records) => records,
            Err(e) => {
                let mut last_reload = self
                    .last_reload
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                if *last_reload == Some(now) {
                    *last_reload = previous;
                }
                return Err(e);
            }
        };

        let snapshot = Arc::new(Snapshot::new(records));
        let records = snapshot.records().len();
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = snapshot;

        debug!(records, "published new snapshot");
        Ok(ReloadOutcome::Reloaded { records })
    }
}

/// Runs blocking work so it does not stall the other tasks of a multi threaded runtime. Outside
/// of one (plain threads, current thread runtimes) it just runs `f`.
fn off_runtime<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            task::block_in_place(f)
        }
        _ => f(),
    }
}

impl Snapshot {
    pub fn new(records: Vec<Record>) -> Snapshot {
        let universe = Universe::from_records(&records);
        Snapshot { records, universe }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }
}

impl Universe {
    pub fn from_records(records: &[Record]) -> Universe {
        let fields = records
            .iter()
            .flat_map(Record::field_names)
            .unique_by(|name| name.to_ascii_lowercase())
            .map(str::to_string)
            .collect();

        Universe { fields }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields
            .iter()
            .any(|name| name.eq_ignore_ascii_case(field))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}
