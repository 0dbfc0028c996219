use hashbrown::{HashMap, HashSet};
use log::{debug, info, warn};
use rayon::prelude::*;

use super::{Job, StationOutput, compute_station};
use crate::config::PipelineConfig;
use crate::storage::ResultStore;
use crate::{Error, StationId, TransitGraph};

/// Counters of a finished batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub job: Job,
    /// Backlog pages processed
    pub passes: usize,
    /// Stations whose results were stored completely
    pub computed: usize,
    /// Failed station attempts, including retries
    pub failed: usize,
    /// Stations given up on for the rest of the run
    pub exhausted: usize,
}

impl RunSummary {
    fn new(job: Job) -> Self {
        Self {
            job,
            passes: 0,
            computed: 0,
            failed: 0,
            exhausted: 0,
        }
    }
}

/// Drains the backlog of one job page by page
///
/// Station computations of a page run on a dedicated rayon pool; results are
/// persisted afterwards on the calling thread, which owns the store.
pub struct BatchDriver<'a, S: ResultStore> {
    graph: &'a TransitGraph,
    store: &'a mut S,
    config: &'a PipelineConfig,
    pool: rayon::ThreadPool,
}

impl<'a, S: ResultStore> BatchDriver<'a, S> {
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the worker pool cannot be created
    pub fn new(
        graph: &'a TransitGraph,
        store: &'a mut S,
        config: &'a PipelineConfig,
    ) -> Result<Self, Error> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.batch.threads)
            .thread_name(|i| format!("railreach-worker-{i}"))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build worker pool: {e}")))?;

        Ok(Self {
            graph,
            store,
            config,
            pool,
        })
    }

    /// Processes pending stations until the backlog is empty
    ///
    /// Failing stations are logged and retried on later passes, up to
    /// `batch.max_attempts` times per run.
    ///
    /// # Errors
    ///
    /// Only a backlog query failing `batch.max_attempts` times in a row
    /// aborts the run.
    pub fn run(&mut self, job: Job) -> Result<RunSummary, Error> {
        let page_size = self.config.batch.page_size;
        let max_attempts = self.config.batch.max_attempts;

        let mut summary = RunSummary::new(job);
        let mut attempts: HashMap<StationId, u32> = HashMap::new();
        let mut exhausted: HashSet<StationId> = HashSet::new();
        let mut backlog_failures = 0;

        info!("Starting {job} run");
        loop {
            let backlog = match self.pending(job, page_size + exhausted.len()) {
                Ok(backlog) => {
                    backlog_failures = 0;
                    backlog
                }
                Err(error) if error.is_transient() && backlog_failures + 1 < max_attempts => {
                    backlog_failures += 1;
                    warn!("Backlog query failed ({backlog_failures}/{max_attempts}): {error}");
                    continue;
                }
                Err(error) => return Err(error),
            };

            let page: Vec<StationId> = backlog
                .into_iter()
                .filter(|id| !exhausted.contains(id))
                .take(page_size)
                .collect();
            if page.is_empty() {
                break;
            }
            summary.passes += 1;
            debug!("Pass {}: {} stations", summary.passes, page.len());

            let (graph, config) = (self.graph, self.config);
            let outputs: Vec<StationOutput> = self.pool.install(|| {
                page.par_iter()
                    .map(|&station| compute_station(graph, station, job, config))
                    .collect()
            });

            for output in outputs {
                let station = output.station_id();
                match self.persist(output) {
                    Ok(()) => {
                        summary.computed += 1;
                        debug!("Station {station}: {job} stored");
                    }
                    Err(error) => {
                        summary.failed += 1;
                        if error.is_transient() {
                            warn!("Station {station}: {error}; will retry");
                        } else {
                            warn!("Station {station}: {error}");
                        }
                    }
                }

                // Any station seen max_attempts times is dropped, whatever
                // the reason it keeps coming back
                let count = attempts.entry(station).or_insert(0);
                *count += 1;
                if *count >= max_attempts && exhausted.insert(station) {
                    summary.exhausted += 1;
                    warn!("Station {station}: giving up after {count} attempts in this run");
                }
            }
        }

        info!(
            "Finished {job} run: {} passes, {} stations computed, {} failures, {} stations skipped",
            summary.passes, summary.computed, summary.failed, summary.exhausted
        );
        Ok(summary)
    }

    fn pending(&self, job: Job, limit: usize) -> Result<Vec<StationId>, Error> {
        match job {
            Job::Isochrones => self
                .store
                .pending_isochrone_stations(&self.config.isochrones.thresholds, limit),
            Job::ShortestTimes => self.store.pending_shortest_time_stations(limit),
        }
    }

    /// Stores what was computed; a partial isochrone run keeps its earlier
    /// snapshots and still reports its error
    fn persist(&mut self, output: StationOutput) -> Result<(), Error> {
        match output {
            StationOutput::Isochrones(run) => {
                self.store.upsert_isochrones(&run.isochrones)?;
                match run.error {
                    Some(error) => Err(error),
                    None => Ok(()),
                }
            }
            StationOutput::ShortestTimes { table, .. } => {
                let table = table?;
                let inserted = self.store.insert_shortest_times(&table)?;
                debug!(
                    "Station {}: {inserted} of {} shortest-time rows were new",
                    table.from_station_id,
                    table.len()
                );
                Ok(())
            }
        }
    }
}
