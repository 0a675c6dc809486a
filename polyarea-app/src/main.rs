//! Polyarea
//!
//! Headless driver for the polygon area editor.
//!
//! Features:
//! - Replays JSON edit scripts (viewport picks, drags, direct point edits)
//! - Built-in demo session when no script is given
//! - Prints the resulting area mesh as JSON

mod app;
mod errors;
mod script;

use clap::{Parser, ValueEnum};
use polyarea_edit::{DeletePolicy, EditConfig};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Remove the point closest to the pointer
    Nearest,
    /// Remove the highest-index point within the pick radius
    Last,
}

impl From<PolicyArg> for DeletePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Nearest => DeletePolicy::Nearest,
            PolicyArg::Last => DeletePolicy::LastWithinRadius,
        }
    }
}

/// Polyarea - Polygon Area Editing
#[derive(Parser, Debug)]
#[command(name = "polyarea")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to an edit script (JSON)
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Which point a delete click removes when several are in range
    #[arg(long, value_enum, default_value = "nearest")]
    policy: PolicyArg,

    /// Pick radius in pixels
    #[arg(long, default_value_t = 10.0)]
    pick_radius: f32,

    /// Stop at the first rejected step
    #[arg(long)]
    strict: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Stream spans to Tracy (requires the `tracy` feature)
    #[arg(long)]
    tracy: bool,
}

impl From<Args> for app::AppConfig {
    fn from(args: Args) -> Self {
        Self {
            script: args.script,
            edit: EditConfig {
                pick_radius_px: args.pick_radius,
                delete_policy: args.policy.into(),
                ..EditConfig::default()
            },
            strict: args.strict,
            pretty: args.pretty,
            logging: app::LoggingConfig {
                level: args.log_level,
                enable_tracy: args.tracy,
            },
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = app::run(args.into()) {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}
