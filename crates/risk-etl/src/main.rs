//! Hazard-risk ETL CLI
//!
//! Usage:
//!   risk-etl --db data/airisk.db init
//!   risk-etl clean-nri --input data/raw/NRI_Table_Counties_Virginia.csv \
//!                      --output data/clean/nri_va_clean.csv
//!   risk-etl nri --input data/clean/nri_va_clean.csv
//!   risk-etl acs --input data/clean/cdc_svi_acs5_va_county.csv
//!   risk-etl xwalk --input data/clean/va_city_to_county.csv
//!   risk-etl metrics --input data/clean/geo_metrics.csv

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use nri_data::{schema, Database};
use risk_etl::{acs, metrics, nri, xwalk};

#[derive(Parser, Debug)]
#[command(name = "risk-etl", about = "Load hazard-risk datasets into the search database")]
struct Args {
    /// SQLite database path
    #[arg(long, default_value = "data/airisk.db")]
    db: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the tables if they do not exist
    Init,
    /// Clean a raw FEMA NRI county export into the canonical CSV layout
    CleanNri {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Ingest a cleaned NRI county CSV
    Nri {
        #[arg(long)]
        input: PathBuf,
    },
    /// Merge an ACS demographic county CSV into the county table
    Acs {
        #[arg(long)]
        input: PathBuf,
    },
    /// Ingest a city-to-county crosswalk CSV
    Xwalk {
        #[arg(long)]
        input: PathBuf,
    },
    /// Ingest a per-geography metrics CSV
    Metrics {
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let db = Database::new(&args.db);

    match args.command {
        Command::Init => {
            let conn = db.connect()?;
            schema::init(&conn)?;
            info!("schema ready at {:?}", db.path());
        }
        Command::CleanNri { input, output } => {
            let rows = nri::clean_nri(&input, &output)?;
            info!("wrote {rows} cleaned rows to {:?}", output);
        }
        Command::Nri { input } => {
            let mut conn = db.connect()?;
            schema::init(&conn)?;
            let rows = nri::ingest_nri(&mut conn, &input)?;
            info!("{rows} county rows ingested from {:?}", input);
        }
        Command::Acs { input } => {
            let mut conn = db.connect()?;
            schema::init(&conn)?;
            let rows = acs::ingest_acs(&mut conn, &input)?;
            info!("{rows} ACS rows staged and merged from {:?}", input);
        }
        Command::Xwalk { input } => {
            let mut conn = db.connect()?;
            schema::init(&conn)?;
            let rows = xwalk::ingest_crosswalk(&mut conn, &input)?;
            info!("{rows} crosswalk rows ingested from {:?}", input);
        }
        Command::Metrics { input } => {
            let mut conn = db.connect()?;
            schema::init(&conn)?;
            let rows = metrics::ingest_metrics(&mut conn, &input)?;
            info!("{rows} metrics rows ingested from {:?}", input);
        }
    }

    Ok(())
}
