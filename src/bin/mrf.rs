use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use marine_records_fetcher::app::App;
use marine_records_fetcher::cmems::{
    CmemsHttpClient, CmemsSession, MarineClient, PointRequest, PointSample,
};
use marine_records_fetcher::config::ConfigLoader;
use marine_records_fetcher::domain::{
    BoundingBox, DateRange, OCCURRENCE_LIMIT_MAX, OccurrenceLimit, OccurrenceQuery,
    OccurrenceSearch, SpeciesName,
};
use marine_records_fetcher::error::MrfError;
use marine_records_fetcher::gbif::{GbifHttpClient, OccurrenceClient, RawOccurrence};
use marine_records_fetcher::output::{JsonOutput, LogSink, OutputMode, PlainOutput};

#[derive(Parser)]
#[command(name = "mrf")]
#[command(about = "Fetch point ocean conditions (Copernicus Marine) and species occurrences (GBIF) into CSV")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true, help = "Print a JSON run summary instead of the confirmation line")]
    json: bool,

    #[arg(long, global = true, help = "Path to an mrf.json config file (cmems.base_url must name a point-subset gateway)")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Add surface temperature and salinity to each point of a CSV table (needs cmems.base_url in mrf.json)")]
    Marine(MarineArgs),
    #[command(about = "Download dated occurrence records of a species inside a bounding box")]
    Occurrences(OccurrenceArgs),
}

#[derive(Args)]
struct MarineArgs {
    #[arg(long, help = "Input CSV: decimalLongitude,decimalLatitude,year,day,month (header row skipped)")]
    csv: Utf8PathBuf,

    #[arg(long)]
    out_csv: Utf8PathBuf,
}

#[derive(Args)]
struct OccurrenceArgs {
    #[arg(long, help = "Scientific name, e.g. \"Chelonia mydas\"")]
    species: String,

    #[arg(long, allow_hyphen_values = true, help = "\"lat_min lat_max lon_min lon_max\", each pair ordered low to high")]
    bbox: String,

    #[arg(long, help = "Requested record count; the service returns at most 300")]
    limit: Option<u32>,

    #[arg(long, help = "YYYY-MM-DD")]
    begin_date: String,

    #[arg(long, help = "YYYY-MM-DD")]
    end_date: String,

    #[arg(long)]
    out_csv: Utf8PathBuf,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<MrfError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &MrfError) -> u8 {
    match error {
        MrfError::MalformedRow { .. }
        | MrfError::InvalidDate(_)
        | MrfError::InvalidBoundingBox(_)
        | MrfError::InvalidSpecies(_)
        | MrfError::InvalidDateRange(_)
        | MrfError::MissingConfig(_)
        | MrfError::MissingCredentials
        | MrfError::MissingCmemsEndpoint => 2,
        MrfError::CmemsHttp(_)
        | MrfError::CmemsStatus { .. }
        | MrfError::GbifHttp(_)
        | MrfError::GbifStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Plain
    };
    let config = ConfigLoader::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Marine(args) => {
            let session = CmemsSession::login(&config.cmems)?;
            tracing::debug!(user = session.username(), "cmems session ready");
            let marine = CmemsHttpClient::new(session)?;
            let app = App::new(marine, NopOccurrences);
            let result = app.run_marine(&args.csv, &args.out_csv, &LogSink)?;
            match output_mode {
                OutputMode::Json => JsonOutput::print_marine(&result).into_diagnostic()?,
                OutputMode::Plain => PlainOutput::print_marine(&result),
            }
            Ok(())
        }
        Commands::Occurrences(args) => {
            let query = build_occurrence_query(&args)?;
            if query.limit.exceeds_cap() {
                eprintln!(
                    "warning: --limit {} exceeds the GBIF maximum of {OCCURRENCE_LIMIT_MAX}; at most {OCCURRENCE_LIMIT_MAX} records will be requested",
                    query.limit.requested()
                );
            }
            let gbif = GbifHttpClient::new(&config.gbif)?;
            let app = App::new(NopMarine, gbif);
            let result = app.run_occurrences(&query, &args.out_csv, &LogSink)?;
            match output_mode {
                OutputMode::Json => JsonOutput::print_occurrences(&result).into_diagnostic()?,
                OutputMode::Plain => PlainOutput::print_occurrences(&result),
            }
            Ok(())
        }
    }
}

fn build_occurrence_query(args: &OccurrenceArgs) -> Result<OccurrenceQuery, MrfError> {
    Ok(OccurrenceQuery {
        species: args.species.parse::<SpeciesName>()?,
        bbox: args.bbox.parse::<BoundingBox>()?,
        limit: args.limit.map(OccurrenceLimit::new).unwrap_or_default(),
        dates: DateRange::parse(&args.begin_date, &args.end_date)?,
    })
}

struct NopMarine;
struct NopOccurrences;

impl MarineClient for NopMarine {
    fn sample(&self, _request: &PointRequest) -> Result<PointSample, MrfError> {
        Err(MrfError::CmemsHttp("CMEMS client not configured".to_string()))
    }
}

impl OccurrenceClient for NopOccurrences {
    fn match_species(&self, _name: &SpeciesName) -> Result<Option<u64>, MrfError> {
        Err(MrfError::GbifHttp("GBIF client not configured".to_string()))
    }

    fn search(&self, _search: &OccurrenceSearch) -> Result<Vec<RawOccurrence>, MrfError> {
        Err(MrfError::GbifHttp("GBIF client not configured".to_string()))
    }
}
