//! CLI argument definitions.
//!
//! All Clap derive structs for `cyberdrill` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::model::AttackKind;
use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Red vs. blue cyber range simulation engine.
#[derive(Parser, Debug)]
#[command(name = "cyberdrill", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log output format on stderr.
    #[arg(long, default_value = "human", global = true, env = "CYBERDRILL_LOG_FORMAT")]
    pub log_format: LogFormatChoice,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "CYBERDRILL_COLOR")]
    pub color: ColorChoice,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scripted exercise from a scenario file.
    Run(RunArgs),

    /// Run the workflow pipeline once.
    Workflow(WorkflowArgs),

    /// Validate a scenario file without running it.
    Validate(ValidateArgs),

    /// List the registered tools.
    Tools,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to a scenario YAML file; defaults apply when omitted.
    #[arg(short, long, env = "CYBERDRILL_SCENARIO")]
    pub config: Option<PathBuf>,

    /// Attack kinds to launch, in order.
    #[arg(short, long = "attack", value_enum, default_value = "sql-injection")]
    pub attacks: Vec<AttackKindChoice>,

    /// Write the JSONL event stream to a file instead of stdout.
    #[arg(long)]
    pub events_file: Option<PathBuf>,
}

/// Arguments for `workflow`.
#[derive(Args, Debug)]
pub struct WorkflowArgs {
    /// Path to a scenario YAML file; defaults apply when omitted.
    #[arg(short, long, env = "CYBERDRILL_SCENARIO")]
    pub config: Option<PathBuf>,

    /// Write the JSONL event stream to a file instead of stdout.
    #[arg(long)]
    pub events_file: Option<PathBuf>,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the scenario YAML file to validate.
    pub config: PathBuf,
}

// ============================================================================
// Value enums
// ============================================================================

/// Color output control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Color when stderr is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    /// Always color.
    Always,
    /// Never color.
    Never,
}

/// Log format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormatChoice {
    /// Human-readable output.
    #[default]
    Human,
    /// Newline-delimited JSON.
    Json,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Human => Self::Human,
            LogFormatChoice::Json => Self::Json,
        }
    }
}

/// Attack kind selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AttackKindChoice {
    /// SQL injection
    SqlInjection,
    /// Cross-site scripting
    Xss,
    /// Brute force
    BruteForce,
    /// Phishing campaign
    Phishing,
    /// Ransomware simulation
    Ransomware,
    /// DDoS attack
    Ddos,
    /// Privilege escalation
    PrivilegeEscalation,
    /// Data exfiltration
    DataExfiltration,
}

impl From<AttackKindChoice> for AttackKind {
    fn from(choice: AttackKindChoice) -> Self {
        match choice {
            AttackKindChoice::SqlInjection => Self::SqlInjection,
            AttackKindChoice::Xss => Self::CrossSiteScripting,
            AttackKindChoice::BruteForce => Self::BruteForce,
            AttackKindChoice::Phishing => Self::Phishing,
            AttackKindChoice::Ransomware => Self::Ransomware,
            AttackKindChoice::Ddos => Self::DenialOfService,
            AttackKindChoice::PrivilegeEscalation => Self::PrivilegeEscalation,
            AttackKindChoice::DataExfiltration => Self::DataExfiltration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_defaults_to_sql_injection() {
        let cli = Cli::try_parse_from(["cyberdrill", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.attacks, vec![AttackKindChoice::SqlInjection]);
    }

    #[test]
    fn multiple_attacks_accumulate() {
        let cli =
            Cli::try_parse_from(["cyberdrill", "run", "-a", "phishing", "-a", "ddos"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        let kinds: Vec<AttackKind> = args.attacks.into_iter().map(Into::into).collect();
        assert_eq!(kinds, vec![AttackKind::Phishing, AttackKind::DenialOfService]);
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["cyberdrill", "-vv", "tools"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
