//! Clap derive structures for the `unistat` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// unistat -- status sensors and device switches for a UniFi site
#[derive(Debug, Parser)]
#[command(
    name = "unistat",
    version,
    about = "Poll a UniFi network controller for status sensors",
    long_about = "Polls one UniFi controller site over the legacy API and derives\n\
        status sensors (subsystem health, WAN throughput, speed tests, alerts,\n\
        firmware) plus restart and PoE switches for managed devices.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "UNISTAT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "UNISTAT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Controller URL (overrides profile)
    #[arg(long, short = 'c', env = "UNISTAT_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Site name
    #[arg(long, short = 's', env = "UNISTAT_SITE", global = true)]
    pub site: Option<String>,

    /// Login username (overrides profile)
    #[arg(long, short = 'u', global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "UNISTAT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "UNISTAT_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "UNISTAT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Refresh once and print every monitored sensor
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Poll on the configured interval and print sensors after each refresh
    Watch(WatchArgs),

    /// List managed devices, or show one device with its ports
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// List restart and PoE switches with their current state
    #[command(alias = "sw")]
    Switches,

    /// Restart a device
    Restart(RestartArgs),

    /// Switch PoE output of a device port
    Poe(PoeArgs),

    /// Validate the connection and credentials without polling
    Probe,

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Only base sensors (one per monitored condition)
    #[arg(long, conflicts_with = "derived")]
    pub base: bool,

    /// Only derived sensors
    #[arg(long)]
    pub derived: bool,

    /// Include sensor attributes in table output
    #[arg(long, short = 'a')]
    pub attributes: bool,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in seconds (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Device MAC, name or IP; shows details and ports
    pub device: Option<String>,
}

#[derive(Debug, Args)]
pub struct RestartArgs {
    /// Device MAC, name or IP
    pub device: String,
}

#[derive(Debug, Args)]
pub struct PoeArgs {
    /// Device MAC, name or IP
    pub device: String,

    /// Port index
    pub port: u32,

    /// Desired power state
    pub state: PowerState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PowerState {
    On,
    Off,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the merged configuration (passwords masked)
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
