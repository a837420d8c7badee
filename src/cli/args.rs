//! Command-line argument definitions shared by the gateway tools.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::pdu::RequestKind;

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable `OID = TYPE: value` lines.
    #[default]
    Human,
    /// Pretty-printed JSON.
    Json,
    /// Tab-separated OID and value, for scripts.
    Raw,
}

/// Request kind to classify as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    #[default]
    Get,
    Getnext,
    Getbulk,
    Set,
}

impl From<KindArg> for RequestKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Get => RequestKind::Get,
            KindArg::Getnext => RequestKind::GetNext,
            KindArg::Getbulk => RequestKind::GetBulk {
                non_repeaters: 0,
                max_repetitions: 10,
            },
            KindArg::Set => RequestKind::Set,
        }
    }
}

/// Configuration source.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Gateway configuration file (JSON).
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub path: PathBuf,
}

/// Output and logging options.
#[derive(Debug, Parser)]
pub struct OutputArgs {
    /// Output format.
    #[arg(short = 'O', long = "output", value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Print the loaded configuration and routing details to stderr.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Don't annotate OIDs with well-known names.
    #[arg(long)]
    pub no_hints: bool,

    /// Always show octet strings as hex.
    #[arg(short = 'x', long)]
    pub hex: bool,

    /// Enable debug logging of gateway decisions.
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Enable trace logging (per-binding detail).
    #[arg(long)]
    pub trace: bool,
}

impl OutputArgs {
    /// Install a stderr tracing subscriber.
    ///
    /// `RUST_LOG` wins when set; otherwise `--debug`/`--trace` pick the level
    /// for this crate and everything else stays at `warn`.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = if self.trace {
                "trace"
            } else if self.debug {
                "debug"
            } else {
                "warn"
            };
            EnvFilter::new(format!("warn,snmp_gateway={level}"))
        });

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Parser)]
    struct TestArgs {
        #[command(flatten)]
        config: ConfigArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[arg(long, value_enum, default_value = "get")]
        kind: KindArg,
    }

    #[test]
    fn test_defaults() {
        let args = TestArgs::try_parse_from(["check", "-c", "gw.json"]).unwrap();
        assert_eq!(args.config.path, PathBuf::from("gw.json"));
        assert_eq!(args.output.format, OutputFormat::Human);
        assert!(!args.output.verbose);
        assert_eq!(args.kind, KindArg::Get);
    }

    #[test]
    fn test_output_and_kind() {
        let args = TestArgs::try_parse_from([
            "check", "--config", "gw.json", "-O", "json", "--kind", "getnext", "-v",
        ])
        .unwrap();
        assert_eq!(args.output.format, OutputFormat::Json);
        assert!(args.output.verbose);
        assert_eq!(RequestKind::from(args.kind), RequestKind::GetNext);
    }

    #[test]
    fn test_config_required() {
        assert!(TestArgs::try_parse_from(["check"]).is_err());
    }
}
