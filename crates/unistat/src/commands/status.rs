//! Sensor listing for `status` and `watch`.

use tabled::Tabled;

use unistat_core::{SensorReading, Snapshot};

use crate::cli::{GlobalOpts, OutputFormat, StatusArgs};
use crate::error::CliError;
use crate::output;

use super::util::Connection;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SensorRow {
    #[tabled(rename = "Sensor")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Key")]
    key: String,
}

#[derive(Tabled)]
struct SensorDetailRow {
    #[tabled(rename = "Sensor")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Attributes")]
    attributes: String,
}

fn display_value(reading: &SensorReading) -> String {
    match (&reading.value, reading.unit) {
        (Some(value), Some(unit)) => format!("{value} {unit}"),
        (Some(value), None) => value.to_string(),
        (None, _) => "-".into(),
    }
}

impl From<&SensorReading> for SensorRow {
    fn from(r: &SensorReading) -> Self {
        Self {
            name: r.name.clone(),
            value: display_value(r),
            key: r.key.clone(),
        }
    }
}

impl From<&SensorReading> for SensorDetailRow {
    fn from(r: &SensorReading) -> Self {
        let attributes = r
            .attributes
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            name: r.name.clone(),
            value: display_value(r),
            attributes,
        }
    }
}

fn plain_line(r: &SensorReading) -> String {
    let value = r.value.as_ref().map(ToString::to_string).unwrap_or_default();
    format!("{}={value}", r.key)
}

/// Pick the readings selected by `--base` / `--derived`.
pub fn select_readings(
    connection: &Connection,
    snapshot: Option<&Snapshot>,
    base_only: bool,
    derived_only: bool,
) -> Vec<SensorReading> {
    if base_only {
        connection.engine.base_readings(snapshot)
    } else if derived_only {
        connection.engine.derived_readings(snapshot)
    } else {
        connection.engine.readings(snapshot)
    }
}

pub fn render_readings(
    format: OutputFormat,
    readings: &[SensorReading],
    with_attributes: bool,
) -> Result<String, CliError> {
    if with_attributes {
        output::render_list(format, readings, |r| SensorDetailRow::from(r), plain_line)
    } else {
        output::render_list(format, readings, |r| SensorRow::from(r), plain_line)
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    connection: &Connection,
    args: StatusArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = connection.refresh().await?;
    let readings = select_readings(connection, Some(&snapshot), args.base, args.derived);
    let rendered = render_readings(global.output, &readings, args.attributes)?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
