//! Clap derive structures for the `omevlan` CLI.
//!
//! Defines the command tree, global flags, and the `PORT=VALUE` parsers
//! used by the inline declaration options.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// omevlan -- declarative VLAN assignment for OpenManage Enterprise templates
#[derive(Debug, Parser)]
#[command(
    name = "omevlan",
    version,
    about = "Manage template NIC VLANs on OpenManage Enterprise",
    long_about = "Declaratively set the untagged and tagged VLANs of NIC ports in an\n\
        OpenManage Enterprise configuration template. Only ports named in the\n\
        declaration are touched; a run that finds nothing to change is a no-op.",
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
    /// Appliance profile to use
    #[arg(long, short = 'p', env = "OMEVLAN_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Appliance hostname or IP address (overrides profile)
    #[arg(long, short = 'H', env = "OMEVLAN_HOSTNAME", global = true)]
    pub hostname: Option<String>,

    /// HTTPS port (overrides profile)
    #[arg(long, env = "OMEVLAN_PORT", global = true)]
    pub port: Option<u16>,

    /// Account name (overrides profile)
    #[arg(long, short = 'u', env = "OMEVLAN_USERNAME", global = true)]
    pub username: Option<String>,

    /// Account password
    #[arg(
        long,
        env = "OMEVLAN_PASSWORD",
        global = true,
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "OMEVLAN_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "OMEVLAN_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "OMEVLAN_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply a VLAN declaration to a template NIC
    Apply(ReconcileArgs),

    /// Show what `apply` would change without submitting anything
    #[command(alias = "diff")]
    Plan(ReconcileArgs),

    /// Show the current VLAN state of a template NIC's ports
    Show(ShowArgs),

    /// List the VLAN networks defined on the appliance
    #[command(alias = "net", alias = "vlans")]
    Networks,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Target selection ─────────────────────────────────────────────────

/// Which template and NIC to operate on.
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Template name (exact, case-sensitive)
    #[arg(long, conflicts_with = "template_id")]
    pub template_name: Option<String>,

    /// Template id
    #[arg(long)]
    pub template_id: Option<u32>,

    /// NIC display name, e.g. "NIC in Mezzanine 1A"
    #[arg(long = "nic", alias = "nic-identifier")]
    pub nic: Option<String>,
}

// ── Reconcile (apply / plan) ─────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Declaration file (YAML or JSON)
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Untagged VLAN by id; 0 clears
    #[arg(long = "untagged", value_name = "PORT=ID", value_parser = parse_port_id)]
    pub untagged: Vec<(u32, u32)>,

    /// Untagged VLAN by name; "0" clears
    #[arg(long = "untagged-name", value_name = "PORT=NAME", value_parser = parse_port_name)]
    pub untagged_name: Vec<(u32, String)>,

    /// Tagged VLANs by id, comma separated; replaces the port's list
    #[arg(long = "tagged", value_name = "PORT=ID[,ID...]", value_parser = parse_port_ids)]
    pub tagged: Vec<(u32, Vec<u32>)>,

    /// Tagged VLANs by name, comma separated
    #[arg(long = "tagged-name", value_name = "PORT=NAME[,NAME...]", value_parser = parse_port_names)]
    pub tagged_name: Vec<(u32, Vec<String>)>,

    /// Remove every tagged VLAN from a port
    #[arg(long = "clear-tagged", value_name = "PORT")]
    pub clear_tagged: Vec<u32>,
}

// ── Show ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

// ── PORT=VALUE parsers ───────────────────────────────────────────────

fn split_port(s: &str) -> Result<(u32, &str), String> {
    let (port, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PORT=VALUE, got '{s}'"))?;
    let port = port
        .trim()
        .parse()
        .map_err(|_| format!("invalid port '{}'", port.trim()))?;
    Ok((port, value.trim()))
}

fn parse_id(s: &str) -> Result<u32, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("invalid VLAN id '{}'", s.trim()))
}

fn parse_port_id(s: &str) -> Result<(u32, u32), String> {
    let (port, value) = split_port(s)?;
    Ok((port, parse_id(value)?))
}

fn parse_port_name(s: &str) -> Result<(u32, String), String> {
    let (port, value) = split_port(s)?;
    if value.is_empty() {
        return Err(format!("missing VLAN name for port {port}"));
    }
    Ok((port, value.to_owned()))
}

fn parse_port_ids(s: &str) -> Result<(u32, Vec<u32>), String> {
    let (port, value) = split_port(s)?;
    let ids = value
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(parse_id)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((port, ids))
}

fn parse_port_names(s: &str) -> Result<(u32, Vec<String>), String> {
    let (port, value) = split_port(s)?;
    let names = value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect();
    Ok((port, names))
}
