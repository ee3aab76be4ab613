//! `watch`: run the periodic driver and print sensors after every refresh.

use owo_colors::OwoColorize;
use tracing::debug;

use unistat_core::RefreshOutcome;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::status;
use super::util::Connection;

pub async fn handle(connection: &Connection, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(global.color);
    let mut outcomes = connection.coordinator.subscribe();
    connection.coordinator.spawn_polling();

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            _ = &mut interrupted => {
                debug!("interrupted, stopping watch");
                break;
            }
            changed = outcomes.changed() => {
                if changed.is_err() {
                    break;
                }
                let outcome = outcomes.borrow_and_update().clone();
                if let Some(outcome) = outcome {
                    report(connection, &outcome, global, color)?;
                }
            }
        }
    }
    Ok(())
}

fn report(
    connection: &Connection,
    outcome: &RefreshOutcome,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    if outcome.is_success() {
        let snapshot = connection.coordinator.current_snapshot();
        let readings = status::select_readings(connection, snapshot.as_deref(), false, false);
        let rendered = status::render_readings(global.output, &readings, false)?;
        output::print_output(&rendered, global.quiet);
    }
    eprintln!("{}", status_line(outcome, color));
    Ok(())
}

/// One stderr line per refresh outcome; failures are red when colored.
fn status_line(outcome: &RefreshOutcome, color: bool) -> String {
    let line = match outcome {
        RefreshOutcome::Success { captured_at } => {
            format!("refreshed at {}", captured_at.format("%H:%M:%S"))
        }
        RefreshOutcome::SoftFailure {
            consecutive_failures,
            message,
        } => format!("refresh failed ({consecutive_failures} in a row): {message}"),
        RefreshOutcome::HardFailure { message } => format!("controller unavailable: {message}"),
    };

    match (color, outcome.is_success()) {
        (false, _) => line,
        (true, true) => line.dimmed().to_string(),
        (true, false) => line.red().to_string(),
    }
}
