//! Command-line surface: argument structs and command labels.

use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::Url;
use uuid::Uuid;

use crate::client::parse_url;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
/// Dashboard refresh cadence, matching the original polling controller.
const DEFAULT_REFRESH_SECS: u64 = 10;

#[derive(Parser)]
#[command(name = "healthtrack", about = "Dashboard and administrative CLI for HealthTrack")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "HEALTHTRACK_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(
        long,
        global = true,
        env = "HEALTHTRACK_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    Dashboard(DashboardArgs),
    Ls(ListArgs),
    #[command(subcommand)]
    Service(ServiceCommand),
    Checks(ChecksArgs),
    Overview(OverviewArgs),
    Tail(TailArgs),
}

#[derive(Subcommand)]
pub(crate) enum ServiceCommand {
    Add(ServiceAddArgs),
    Remove(ServiceRemoveArgs),
}

#[derive(Args)]
pub(crate) struct DashboardArgs {
    #[arg(
        long,
        default_value_t = DEFAULT_REFRESH_SECS,
        help = "Seconds between dashboard refreshes"
    )]
    pub(crate) refresh_secs: u64,
    #[arg(long, help = "Render one cycle and exit instead of polling")]
    pub(crate) once: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Default)]
pub(crate) struct ListArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
}

#[derive(Args)]
pub(crate) struct ServiceAddArgs {
    #[arg(help = "Display name, unique across the fleet")]
    pub(crate) name: String,
    #[arg(help = "Target URL probed on every check")]
    pub(crate) url: String,
    #[arg(long, help = "Seconds between checks (defaults to 60)")]
    pub(crate) interval: Option<u32>,
    #[arg(long, help = "Seconds before a probe is abandoned (defaults to 10)")]
    pub(crate) timeout_seconds: Option<u32>,
}

#[derive(Args)]
pub(crate) struct ServiceRemoveArgs {
    #[arg(help = "Service identifier")]
    pub(crate) id: Uuid,
}

#[derive(Args)]
pub(crate) struct ChecksArgs {
    #[arg(help = "Service identifier")]
    pub(crate) id: Uuid,
    #[arg(long, help = "Number of checks to fetch")]
    pub(crate) limit: Option<u32>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Default)]
pub(crate) struct OverviewArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Default)]
pub(crate) struct TailArgs {
    #[arg(long, value_delimiter = ',', help = "Filter to service IDs")]
    pub(crate) service: Vec<Uuid>,
    #[arg(long, value_delimiter = ',', help = "Filter to event kinds")]
    pub(crate) event: Vec<String>,
    #[arg(long, help = "Persist Last-Event-ID to this file")]
    pub(crate) resume_file: Option<std::path::PathBuf>,
    #[arg(
        long,
        default_value_t = 5,
        help = "Seconds to wait before reconnecting"
    )]
    pub(crate) retry_secs: u64,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub(crate) const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Dashboard(_) => "dashboard",
        Command::Ls(_) => "ls",
        Command::Service(ServiceCommand::Add(_)) => "service_add",
        Command::Service(ServiceCommand::Remove(_)) => "service_remove",
        Command::Checks(_) => "checks",
        Command::Overview(_) => "overview",
        Command::Tail(_) => "tail",
    }
}
