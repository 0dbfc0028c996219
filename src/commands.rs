use std::path::Path;

use railreach_core::loading::CsvGraphSource;
use railreach_core::{
    BatchDriver, Error, GraphSource, PipelineConfig, SqliteStore, export_shortest_times,
    export_station_isochrones, load_transit_graph,
};
use tracing::info;

use crate::cli::{Cli, Command, JobArg};
use crate::settings;

pub fn execute(cli: Cli) -> Result<(), Error> {
    let config = settings::load(cli.config.as_deref(), cli.database)?;
    match cli.command {
        Command::Run { job } => run(&config, job),
        Command::Import {
            stations,
            direct_times,
        } => import(&config, &stations, &direct_times),
        Command::Export { out } => export(&config, &out),
    }
}

/// Loads the graph once and drains the backlog of each selected job
fn run(config: &PipelineConfig, job: JobArg) -> Result<(), Error> {
    let mut store = SqliteStore::open(&config.database)?;
    let graph = load_transit_graph(&store)?;

    for &job in job.jobs() {
        let summary = BatchDriver::new(&graph, &mut store, config)?.run(job)?;
        info!(
            job = %summary.job,
            passes = summary.passes,
            computed = summary.computed,
            failed = summary.failed,
            exhausted = summary.exhausted,
            "Run finished"
        );
    }
    Ok(())
}

fn import(config: &PipelineConfig, stations: &Path, direct_times: &Path) -> Result<(), Error> {
    let source = CsvGraphSource::new(stations, direct_times);
    let mut store = SqliteStore::open(&config.database)?;

    let stations = source.stations()?;
    let inserted = store.insert_stations(&stations)?;
    info!(
        "Imported {inserted} of {} stations into {}",
        stations.len(),
        config.database.display()
    );

    let direct_times = source.direct_times()?;
    let inserted = store.insert_direct_times(&direct_times)?;
    info!(
        "Imported {inserted} of {} direct times into {}",
        direct_times.len(),
        config.database.display()
    );
    Ok(())
}

fn export(config: &PipelineConfig, out: &Path) -> Result<(), Error> {
    let store = SqliteStore::open(&config.database)?;
    export_station_isochrones(&store, &config.isochrones.thresholds, out)?;
    export_shortest_times(&store, out)?;
    Ok(())
}
