//! snmpgw-check: show how the gateway would route a request.
//!
//! Loads a gateway configuration, classifies the given OIDs as one request,
//! and reports which are answered locally and whether the request would be
//! forwarded upstream. Nothing is sent on the network.

use std::process::ExitCode;

use clap::Parser;
use snmp_gateway::cli::args::{ConfigArgs, KindArg, OutputArgs};
use snmp_gateway::cli::hints::parse_oid;
use snmp_gateway::cli::output::{OutputContext, write_error, write_verbose_config};
use snmp_gateway::gateway::classify;
use snmp_gateway::varbind::null_varbinds;
use snmp_gateway::{GatewayConfig, Oid, RequestKind};

/// Show whether a request is answered locally or forwarded upstream.
#[derive(Debug, Parser)]
#[command(name = "snmpgw-check", version, about)]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Request kind to classify as.
    #[arg(short = 'k', long, value_enum, default_value = "get")]
    kind: KindArg,

    /// OIDs in the request (dotted notation or well-known names).
    #[arg(required = true, value_name = "OID")]
    oids: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    args.output.init_tracing();

    let config = match GatewayConfig::load(&args.config.path) {
        Ok(config) => config,
        Err(e) => {
            write_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let oids: Vec<Oid> = match args.oids.iter().map(|s| parse_oid(s)).collect() {
        Ok(oids) => oids,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.output.verbose {
        write_verbose_config(&config);
    }

    let kind = RequestKind::from(args.kind);
    let disposition = classify(config.local_table(), &null_varbinds(&oids));

    let mut output = OutputContext::new(args.output.format);
    output.show_hints = !args.output.no_hints;
    output.force_hex = args.output.hex;
    if let Err(e) = output.write_report(&config, kind, &oids, &disposition) {
        eprintln!("Error writing output: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
