//! Output formatting for the gateway tools.
//!
//! Supports human-readable, JSON, and raw output formats.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::cli::hints;
use crate::gateway::{Disposition, LocalTable};
use crate::pdu::RequestKind;
use crate::value::is_printable;
use crate::{GatewayConfig, Oid, Value};

/// Write the loaded configuration to stderr.
pub fn write_verbose_config(config: &GatewayConfig) {
    let mut stderr = io::stderr().lock();
    let upstream = config.upstream();
    let credentials = &upstream.credentials;

    let _ = writeln!(stderr, "--- Gateway ---");
    let _ = writeln!(stderr, "Listen:    {}", config.listen());
    let _ = writeln!(stderr, "Upstream:  {}", upstream.address);
    let _ = writeln!(stderr, "Username:  {}", credentials.username());
    let _ = writeln!(stderr, "Security:  {}", credentials.security_level());
    if let Some(auth) = credentials.auth_protocol() {
        let _ = writeln!(stderr, "Auth:      {}", auth);
    }
    if let Some(privacy) = credentials.priv_protocol() {
        let _ = writeln!(stderr, "Privacy:   {}", privacy);
    }
    if !upstream.context_name.is_empty() {
        let _ = writeln!(
            stderr,
            "Context:   {}",
            String::from_utf8_lossy(&upstream.context_name)
        );
    }
    match config.pending_timeout() {
        Some(timeout) => {
            let _ = writeln!(stderr, "Timeout:   {:?}", timeout);
        }
        None => {
            let _ = writeln!(stderr, "Timeout:   none");
        }
    }

    let table = config.local_table();
    let _ = writeln!(stderr, "Local:     {} OID(s)", table.len());
    for (oid, value) in table.iter() {
        let _ = writeln!(stderr, "  {} = {}", hints::annotate(oid), value);
    }
    let _ = writeln!(stderr);
}

/// Routing decision for one checked request, ready for output.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub kind: String,
    pub upstream: String,
    /// `"local"` or `"forward"`.
    pub decision: &'static str,
    /// 1-based position of the binding that forces forwarding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_remote: Option<usize>,
    pub bindings: Vec<BindingResult>,
}

/// One request binding and what the local table holds for it.
#[derive(Debug, Serialize)]
pub struct BindingResult {
    pub oid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the OID is in the local table.
    pub local: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    pub value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_hex: Option<String>,
}

/// Output context for formatting.
pub struct OutputContext {
    pub format: OutputFormat,
    pub show_hints: bool,
    pub force_hex: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            show_hints: true,
            force_hex: false,
        }
    }

    /// Write a classification report to stdout.
    pub fn write_report(
        &self,
        config: &GatewayConfig,
        kind: RequestKind,
        oids: &[Oid],
        disposition: &Disposition,
    ) -> io::Result<()> {
        let report = self.build_report(config, kind, oids, disposition);
        let mut stdout = io::stdout().lock();

        match self.format {
            OutputFormat::Human => self.write_human(&mut stdout, &report),
            OutputFormat::Json => write_json(&mut stdout, &report),
            OutputFormat::Raw => write_raw(&mut stdout, &report),
        }
    }

    pub fn build_report(
        &self,
        config: &GatewayConfig,
        kind: RequestKind,
        oids: &[Oid],
        disposition: &Disposition,
    ) -> CheckReport {
        let (decision, first_remote) = match disposition {
            Disposition::AllLocal(_) => ("local", None),
            Disposition::NeedsForward { first_remote } => ("forward", Some(first_remote + 1)),
        };

        CheckReport {
            kind: kind.to_string(),
            upstream: config.upstream().address.to_string(),
            decision,
            first_remote,
            bindings: oids
                .iter()
                .map(|oid| self.format_binding(config.local_table(), oid))
                .collect(),
        }
    }

    fn format_binding(&self, table: &LocalTable, oid: &Oid) -> BindingResult {
        let hint = if self.show_hints {
            hints::lookup(oid).map(String::from)
        } else {
            None
        };

        match table.lookup(oid) {
            Some(value) => {
                let (value_type, value, formatted, raw_hex) = format_value(value, self.force_hex);
                BindingResult {
                    oid: oid.to_string(),
                    hint,
                    local: true,
                    value_type: Some(value_type),
                    value,
                    formatted,
                    raw_hex,
                }
            }
            None => BindingResult {
                oid: oid.to_string(),
                hint,
                local: false,
                value_type: None,
                value: serde_json::Value::Null,
                formatted: None,
                raw_hex: None,
            },
        }
    }

    fn write_human<W: Write>(&self, w: &mut W, report: &CheckReport) -> io::Result<()> {
        writeln!(w, "{} request, {} binding(s)", report.kind, report.bindings.len())?;

        for vb in &report.bindings {
            if let Some(ref hint) = vb.hint {
                write!(w, "{} ({})", vb.oid, hint)?;
            } else {
                write!(w, "{}", vb.oid)?;
            }

            match (&vb.value_type, &vb.formatted, &vb.value) {
                (None, _, _) => writeln!(w, " = (not local)")?,
                (Some(t), Some(formatted), _) => writeln!(w, " = {}: {}", t, formatted)?,
                (Some(t), None, serde_json::Value::String(s)) => {
                    writeln!(w, " = {}: \"{}\"", t, s)?
                }
                (Some(t), None, other) => writeln!(w, " = {}: {}", t, other)?,
            }
        }

        match report.first_remote {
            None => writeln!(w, "=> answered locally"),
            Some(index) => writeln!(
                w,
                "=> forwarded to {} (first non-local binding: {})",
                report.upstream, index
            ),
        }
    }
}

fn write_json<W: Write>(w: &mut W, report: &CheckReport) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    writeln!(w, "{}", json)
}

fn write_raw<W: Write>(w: &mut W, report: &CheckReport) -> io::Result<()> {
    for vb in &report.bindings {
        let route = if report.first_remote.is_some() {
            "upstream"
        } else {
            "local"
        };
        let value = match &vb.value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        writeln!(w, "{}\t{}\t{}", vb.oid, route, value)?;
    }
    Ok(())
}

/// Format a value, returning (type_name, json_value, formatted_string, raw_hex).
fn format_value(
    value: &Value,
    force_hex: bool,
) -> (String, serde_json::Value, Option<String>, Option<String>) {
    match value {
        Value::Integer(v) => ("INTEGER".into(), (*v).into(), None, None),

        Value::OctetString(bytes) if force_hex || !is_printable(bytes) => {
            let hex = hex_string(bytes);
            (
                "Hex-STRING".into(),
                serde_json::Value::String(hex.clone()),
                Some(format_hex_string(bytes)),
                Some(hex),
            )
        }

        Value::OctetString(bytes) => (
            "STRING".into(),
            serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned()),
            None,
            Some(hex_string(bytes)),
        ),

        Value::Null => ("NULL".into(), serde_json::Value::Null, None, None),

        Value::ObjectIdentifier(oid) => (
            "OID".into(),
            serde_json::Value::String(oid.to_string()),
            None,
            None,
        ),

        Value::IpAddress(b) => (
            "IpAddress".into(),
            serde_json::Value::String(format!("{}.{}.{}.{}", b[0], b[1], b[2], b[3])),
            None,
            None,
        ),

        Value::Counter32(v) => ("Counter32".into(), (*v).into(), None, None),

        Value::Gauge32(v) => ("Gauge32".into(), (*v).into(), None, None),

        Value::TimeTicks(v) => (
            "TimeTicks".into(),
            (*v).into(),
            Some(format!("({}) {}", v, format_timeticks(*v))),
            None,
        ),

        Value::Opaque(bytes) => {
            let hex = hex_string(bytes);
            (
                "Opaque".into(),
                serde_json::Value::String(hex.clone()),
                Some(format_hex_string(bytes)),
                Some(hex),
            )
        }

        Value::Counter64(v) => ("Counter64".into(), (*v).into(), None, None),

        Value::NoSuchObject => (
            "NoSuchObject".into(),
            serde_json::Value::Null,
            Some("No Such Object available".into()),
            None,
        ),

        Value::NoSuchInstance => (
            "NoSuchInstance".into(),
            serde_json::Value::Null,
            Some("No Such Instance currently exists".into()),
            None,
        ),

        Value::EndOfMibView => (
            "EndOfMibView".into(),
            serde_json::Value::Null,
            Some("No more variables left in this MIB View".into()),
            None,
        ),

        Value::Unknown { tag, data } => {
            let hex = hex_string(data);
            (
                format!("Unknown(0x{:02X})", tag),
                serde_json::Value::String(hex.clone()),
                Some(format_hex_string(data)),
                Some(hex),
            )
        }
    }
}

/// Lowercase hex, no separator.
fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Uppercase hex separated by spaces, for display.
fn format_hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// TimeTicks (centiseconds) as `[Nd ]HH:MM:SS.cc`.
fn format_timeticks(centiseconds: u32) -> String {
    let total_seconds = centiseconds / 100;
    let cs = centiseconds % 100;

    let days = total_seconds / 86400;
    let hours = (total_seconds % 86400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if days > 0 {
        format!(
            "{}d {:02}:{:02}:{:02}.{:02}",
            days, hours, minutes, seconds, cs
        )
    } else {
        format!("{:02}:{:02}:{:02}.{:02}", hours, minutes, seconds, cs)
    }
}

/// Write an error message to stderr.
pub fn write_error(err: &crate::Error) {
    eprintln!("Error: {}", err);
}
