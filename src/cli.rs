use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use railreach_core::Job;

#[derive(Debug, Parser)]
#[command(
    name = "railreach",
    version,
    about = "Compute transit isochrones and shortest-time tables in batch"
)]
pub struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database, overrides the configured path
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute results for every pending station
    Run {
        #[arg(long, value_enum, default_value_t = JobArg::All)]
        job: JobArg,
    },
    /// Load stations and direct times from CSV files
    Import {
        #[arg(long)]
        stations: PathBuf,
        #[arg(long)]
        direct_times: PathBuf,
    },
    /// Write per-station isochrone (`.json`) and shortest-time (`.bin`) files
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JobArg {
    Isochrones,
    ShortestTimes,
    All,
}

impl JobArg {
    pub fn jobs(self) -> &'static [Job] {
        match self {
            JobArg::Isochrones => &[Job::Isochrones],
            JobArg::ShortestTimes => &[Job::ShortestTimes],
            JobArg::All => &[Job::Isochrones, Job::ShortestTimes],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults_to_all_jobs() {
        let cli = Cli::try_parse_from(["railreach", "run"]).unwrap();
        assert!(matches!(cli.command, Command::Run { job: JobArg::All }));
        assert!(cli.config.is_none());
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "railreach",
            "run",
            "--job",
            "shortest-times",
            "--database",
            "/tmp/net.db",
        ])
        .unwrap();
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/net.db")));
        let Command::Run { job } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(job.jobs(), &[Job::ShortestTimes]);
    }

    #[test]
    fn import_requires_both_tables() {
        assert!(Cli::try_parse_from(["railreach", "import", "--stations", "s.csv"]).is_err());
        let cli = Cli::try_parse_from([
            "railreach",
            "import",
            "--stations",
            "s.csv",
            "--direct-times",
            "d.csv",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Import { .. }));
    }
}
