use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::{Args, Parser, Subcommand};
use crashscraper::{
    config::Config,
    logging,
    pipeline::{self, OutputFormat, Years},
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Download Polish road accident, weather and calendar data"
)]
struct Cli {
    /// YAML config; built-in defaults otherwise.
    #[arg(long, env = "CRASHSCRAPER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Overrides `output.data_dir`.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone, Copy)]
struct YearArgs {
    /// First year (defaults to the current year).
    #[arg(long)]
    start: Option<i32>,
    /// Last year (defaults to the current year).
    #[arg(long)]
    end: Option<i32>,
}

impl YearArgs {
    fn years(self) -> Result<Years> {
        let now = Local::now().year();
        Years::new(self.start.unwrap_or(now), self.end.unwrap_or(now))
    }
}

#[derive(Subcommand)]
enum Command {
    /// Daily police statistics.
    Police {
        #[command(flatten)]
        years: YearArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
    /// Daily weather for the configured station.
    Weather {
        #[command(flatten)]
        years: YearArgs,
    },
    /// Public holidays.
    Holidays {
        #[command(flatten)]
        years: YearArgs,
    },
    /// Fridays, Saturdays and Sundays.
    Weekends {
        #[command(flatten)]
        years: YearArgs,
    },
    /// Every dataset above.
    All {
        #[command(flatten)]
        years: YearArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info");
    let cli = Cli::parse();

    let mut cfg = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(dir) = cli.data_dir {
        cfg.output.data_dir = dir;
    }
    info!(data_dir = %cfg.output.data_dir.display(), "startup");

    let written = match cli.command {
        Command::Police { years, format } => {
            vec![pipeline::run_police(&cfg, years.years()?, format).await?]
        }
        Command::Weather { years } => vec![pipeline::run_weather(&cfg, years.years()?).await?],
        Command::Holidays { years } => vec![pipeline::run_holidays(&cfg, years.years()?).await?],
        Command::Weekends { years } => vec![pipeline::run_weekends(&cfg, years.years()?)?],
        Command::All { years, format } => pipeline::run_all(&cfg, years.years()?, format).await?,
    };

    for path in &written {
        info!(path = %path.display(), "written");
    }
    Ok(())
}
