//! Switch listing.

use serde::Serialize;
use tabled::Tabled;

use unistat_core::model::Attributes;
use unistat_core::{DeviceSwitch, SwitchKind, SwitchState};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util::Connection;

#[derive(Serialize)]
struct SwitchView {
    #[serde(flatten)]
    switch: DeviceSwitch,
    state: SwitchState,
    attributes: Attributes,
}

#[derive(Tabled)]
struct SwitchRow {
    #[tabled(rename = "Switch")]
    name: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "State")]
    state: String,
}

impl From<&SwitchView> for SwitchRow {
    fn from(v: &SwitchView) -> Self {
        Self {
            name: v.switch.name.clone(),
            mac: v.switch.mac.to_string(),
            kind: match v.switch.kind {
                SwitchKind::Restart => "restart".into(),
                SwitchKind::Poe { port_index } => format!("poe (port {port_index})"),
            },
            state: v.state.to_string(),
        }
    }
}

pub async fn handle(connection: &Connection, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = connection.refresh().await?;
    let views: Vec<SwitchView> = DeviceSwitch::discover(&snapshot, &connection.name)
        .into_iter()
        .map(|switch| SwitchView {
            state: switch.state(Some(&snapshot)),
            attributes: switch.attributes(Some(&snapshot)),
            switch,
        })
        .collect();

    let rendered = output::render_list(
        global.output,
        &views,
        |v| SwitchRow::from(v),
        |v| format!("{}\t{}", v.switch.name, v.state),
    )?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
