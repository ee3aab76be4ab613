//! `restart` and `poe`: control actions followed by a confirming refresh.

use tracing::info;

use unistat_core::state;
use unistat_core::{DeviceSwitch, RefreshOutcome, SwitchKind};

use crate::cli::{GlobalOpts, PoeArgs, PowerState, RestartArgs};
use crate::error::CliError;
use crate::output;

use super::util::{self, Connection};

pub async fn restart(
    connection: &Connection,
    args: &RestartArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = connection.refresh().await?;
    let device = util::find_device(&snapshot, &args.device)?;
    let switch = DeviceSwitch {
        name: format!("{} {} Restart", connection.name, device.display_name()),
        mac: device.mac.clone(),
        kind: SwitchKind::Restart,
    };

    if !switch.state(Some(&snapshot)).is_available() {
        return Err(CliError::Validation {
            field: "device".into(),
            reason: format!(
                "{} is {} and cannot be restarted",
                device.display_name(),
                state::state_label(device.state_code)
            ),
        });
    }

    let prompt = format!("Restart {} ({})?", device.display_name(), device.mac);
    if !util::confirm(&prompt, global.yes)? {
        return Ok(());
    }

    let outcomes = connection.coordinator.subscribe();
    switch.turn_on(&connection.coordinator).await?;
    info!(mac = %switch.mac, "restart issued, waiting for refresh");

    let outcome = util::await_next_outcome(outcomes, connection.timeout).await?;
    report(&outcome, &format!("Restart requested for {}", device.display_name()), global);
    Ok(())
}

pub async fn poe(
    connection: &Connection,
    args: &PoeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = connection.refresh().await?;
    let device = util::find_device(&snapshot, &args.device)?;
    let port = device.port(args.port).ok_or_else(|| CliError::NotFound {
        resource_type: "port".into(),
        identifier: format!("{} on {}", args.port, device.display_name()),
        list_command: format!("devices {}", device.mac),
    })?;
    if !port.is_poe_capable {
        return Err(CliError::Validation {
            field: "port".into(),
            reason: format!("port {} ({}) has no PoE", port.port_index, port.name),
        });
    }

    let switch = DeviceSwitch {
        name: format!("{} {} PoE {}", connection.name, device.display_name(), port.name),
        mac: device.mac.clone(),
        kind: SwitchKind::Poe {
            port_index: port.port_index,
        },
    };
    if !switch.state(Some(&snapshot)).is_available() {
        return Err(CliError::Validation {
            field: "device".into(),
            reason: format!(
                "{} is {}",
                device.display_name(),
                state::state_label(device.state_code)
            ),
        });
    }

    let outcomes = connection.coordinator.subscribe();
    match args.state {
        PowerState::On => switch.turn_on(&connection.coordinator).await?,
        PowerState::Off => switch.turn_off(&connection.coordinator).await?,
    }

    let outcome = util::await_next_outcome(outcomes, connection.timeout).await?;
    let current = connection.coordinator.current_snapshot();
    let now = switch.state(current.as_deref());
    report(
        &outcome,
        &format!("{}: {}", switch.name, output::paint_state(now, output::should_color(global.color))),
        global,
    );
    Ok(())
}

fn report(outcome: &RefreshOutcome, message: &str, global: &GlobalOpts) {
    let line = match outcome {
        RefreshOutcome::Success { .. } => message.to_owned(),
        RefreshOutcome::SoftFailure { message: why, .. }
        | RefreshOutcome::HardFailure { message: why } => {
            format!("{message} (follow-up refresh failed: {why})")
        }
    };
    output::print_output(&line, global.quiet);
}
