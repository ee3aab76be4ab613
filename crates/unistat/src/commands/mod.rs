//! Command dispatch: opens the controller connection and routes to the
//! handlers.

pub mod config_cmd;
pub mod control;
pub mod devices;
pub mod probe;
pub mod status;
pub mod switches;
pub mod util;
pub mod watch;

use std::time::Duration;

use unistat_core::ControllerConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

use self::util::Connection;

/// Dispatch a controller-bound command. `probe` validates without polling;
/// everything else runs through a coordinator that is shut down afterwards.
pub async fn dispatch(
    cmd: Command,
    mut config: ControllerConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Command::Probe = cmd {
        return probe::handle(config, global).await;
    }

    if let Command::Watch(ref args) = cmd {
        match args.interval {
            Some(0) => {
                return Err(CliError::Validation {
                    field: "interval".into(),
                    reason: "must be at least 1 second".into(),
                });
            }
            Some(secs) => config.poll_interval = Duration::from_secs(secs),
            None => {}
        }
    }

    let connection = Connection::open(config).await?;
    let result = match cmd {
        Command::Status(args) => status::handle(&connection, args, global).await,
        Command::Watch(_) => watch::handle(&connection, global).await,
        Command::Devices(args) => devices::handle(&connection, &args, global).await,
        Command::Switches => switches::handle(&connection, global).await,
        Command::Restart(args) => control::restart(&connection, &args, global).await,
        Command::Poe(args) => control::poe(&connection, &args, global).await,
        Command::Probe | Command::Config(_) | Command::Completions(_) => Ok(()),
    };
    connection.close().await;
    result
}
