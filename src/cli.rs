//! Command-line interface definitions.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "emarks", about = "Extract and browse peer-relative mark statistics from eMarks")]
pub struct Args {
    /// Log output format.
    #[arg(long, value_enum, default_value_t = TracingFormat::Pretty, global = true)]
    pub tracing: TracingFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingFormat {
    Pretty,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the extraction pipeline and replace the stored records.
    Extract {
        /// Print the structured run report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print stored records, optionally filtered.
    Show {
        /// Exact course code filter.
        #[arg(long)]
        course: Option<String>,
        /// Exact year filter.
        #[arg(long)]
        year: Option<String>,
        /// Exact session filter (winter, summer, fall).
        #[arg(long)]
        session: Option<String>,
        /// Substring filter over student ids.
        #[arg(long)]
        id: Option<String>,
        /// Substring filter over first names.
        #[arg(long)]
        firstname: Option<String>,
        /// Substring filter over last names.
        #[arg(long)]
        lastname: Option<String>,
    },
    /// Print per-offering summaries for one course.
    Course {
        /// Course code, e.g. CSC108.
        code: String,
    },
    /// Print record count and last extraction time.
    Status,
    /// Wipe all stored records.
    Clear,
}
