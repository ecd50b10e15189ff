use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use clap::Parser;
use tracing::{error, info};
use url::Url;

use emarks::cli::{Args, Command};
use emarks::config::Config;
use emarks::data::browse::{BrowseEvent, BrowseState, RecordFilter};
use emarks::data::records::MarkRecord;
use emarks::data::store::{self, JsonFileStore, RecordStore};
use emarks::emarks::EmarksClient;
use emarks::logging;
use emarks::scraper::{self, ExtractionReport};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::setup_logging(&config, args.tracing);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = env!("GIT_COMMIT_SHORT"),
        "starting emarks"
    );

    match args.command {
        Command::Extract { json } => cmd_extract(&config, json).await,
        command => match run_read_command(&config, command) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = ?e, "Command failed");
                ExitCode::FAILURE
            }
        },
    }
}

/// Run the extraction pipeline and report the outcome.
///
/// A failed run is reported as a structured failure, never a crash; the
/// exit code is the only thing that distinguishes it.
async fn cmd_extract(config: &Config, json: bool) -> ExitCode {
    let report = match run_extraction(config).await {
        Ok(outcome) => ExtractionReport::success(outcome),
        Err(e) => {
            error!(error = ?e, "Extraction run failed");
            ExtractionReport::failure(format!("{e:#}"))
        }
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).expect("Failed to serialize report")
        );
    } else if report.ok {
        let urls = report.urls.as_deref().map(<[String]>::len).unwrap_or(0);
        let records = report
            .records
            .as_deref()
            .map(<[MarkRecord]>::len)
            .unwrap_or(0);
        println!("Extracted {records} records from {urls} course pages");
    } else {
        println!(
            "Extraction failed: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
    }

    if report.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run_extraction(config: &Config) -> Result<scraper::ExtractionOutcome> {
    let marks_url = Url::parse(&config.marks_url)
        .with_context(|| format!("Invalid marks URL {}", config.marks_url))?;
    let client = EmarksClient::new(marks_url, config.session_cookie.clone())
        .context("Failed to create eMarks client")?;
    let mut record_store = JsonFileStore::new(&config.data_file);

    scraper::run_extraction(&client, &mut record_store).await
}

fn run_read_command(config: &Config, command: Command) -> Result<()> {
    let mut record_store = JsonFileStore::new(&config.data_file);

    match command {
        Command::Extract { .. } => unreachable!("handled in main"),
        Command::Show {
            course,
            year,
            session,
            id,
            firstname,
            lastname,
        } => {
            let state = load_state(&record_store)?;
            let filter = RecordFilter {
                course,
                year,
                session,
                id_term: id.unwrap_or_default(),
                firstname_term: firstname.unwrap_or_default(),
                lastname_term: lastname.unwrap_or_default(),
            };
            cmd_show(state, filter)
        }
        Command::Course { code } => cmd_course(load_state(&record_store)?, &code),
        Command::Status => cmd_status(load_state(&record_store)?),
        Command::Clear => {
            record_store
                .clear()
                .context("Failed to clear record store")?;
            println!("Cleared stored records");
            Ok(())
        }
    }
}

fn load_state(record_store: &dyn RecordStore) -> Result<BrowseState> {
    let (records, updated_at) = store::load_records(record_store)?;
    let mut state = BrowseState::default();
    state.update(BrowseEvent::RecordsLoaded {
        records,
        updated_at,
    });
    Ok(state)
}

fn cmd_show(mut state: BrowseState, filter: RecordFilter) -> Result<()> {
    state.update(BrowseEvent::FilterChanged(filter));

    let records = state.filtered_records();
    if records.is_empty() {
        println!("No records found. Run `emarks extract` first.");
        return Ok(());
    }

    for record in &records {
        match record {
            MarkRecord::Scored(r) => println!(
                "{} {} {:<6}  {}  {}, {}  score {:>3}  offering avg {} (rank {})  course avg {} (rank {})",
                r.course,
                r.year,
                r.session,
                r.id,
                r.lastname,
                r.firstname,
                r.score,
                r.session_average,
                r.session_rank,
                r.course_average,
                r.course_rank,
            ),
            MarkRecord::Unscored(r) => println!(
                "{} {} {:<6}  {}  {}, {}  score   -",
                r.course, r.year, r.session, r.id, r.lastname, r.firstname,
            ),
        }
    }

    let stats = state.dataset_stats();
    println!(
        "\n{} shown of {} records | {} students | {} courses | {} offerings | updated {}",
        records.len(),
        stats.total_records,
        stats.unique_students,
        stats.courses,
        stats.offerings,
        format_updated_at(state.updated_at()),
    );
    Ok(())
}

fn cmd_course(state: BrowseState, code: &str) -> Result<()> {
    let summaries = state.course_summaries(code);
    if summaries.is_empty() {
        println!("No records found for course {code}.");
        return Ok(());
    }

    println!(
        "{code}: overall average {}",
        format_average(state.course_average(code))
    );
    for summary in summaries {
        println!(
            "  {} {:<6}  {:>3} students  average {}",
            summary.year,
            summary.session,
            summary.students,
            format_average(summary.average),
        );
    }
    Ok(())
}

fn cmd_status(state: BrowseState) -> Result<()> {
    let stats = state.dataset_stats();
    println!(
        "{} records | {} students | {} courses | updated {}",
        stats.total_records,
        stats.unique_students,
        stats.courses,
        format_updated_at(state.updated_at()),
    );
    Ok(())
}

fn format_average(average: Option<f64>) -> String {
    match average {
        Some(value) => format!("{value:.2}"),
        None => "--".to_string(),
    }
}

fn format_updated_at(timestamp_ms: Option<i64>) -> String {
    timestamp_ms
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "never".to_string())
}
