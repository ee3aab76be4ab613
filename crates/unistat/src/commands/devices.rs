//! Device command handlers.

use serde::Serialize;
use tabled::Tabled;

use unistat_core::model::Attributes;
use unistat_core::state::{self, DeviceReachability};
use unistat_core::{DeviceRecord, Snapshot, SwitchState};

use crate::cli::{DevicesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util::{self, Connection};

// ── Views ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct DeviceView {
    name: String,
    mac: String,
    model: Option<String>,
    ip: Option<String>,
    version: Option<String>,
    state: &'static str,
    reachability: DeviceReachability,
    restart: SwitchState,
    attributes: Attributes,
    ports: Vec<PortView>,
}

#[derive(Serialize)]
struct PortView {
    index: u32,
    name: String,
    poe_capable: bool,
    poe_mode: Option<String>,
    poe: SwitchState,
    attributes: Attributes,
}

impl DeviceView {
    fn new(snapshot: &Snapshot, device: &DeviceRecord) -> Self {
        let ports = device
            .port_table
            .iter()
            .map(|port| PortView {
                index: port.port_index,
                name: port.name.clone(),
                poe_capable: port.is_poe_capable,
                poe_mode: port.poe_mode.clone(),
                poe: state::port_state(Some(snapshot), &device.mac, port.port_index),
                attributes: state::port_attributes(Some(snapshot), &device.mac, port.port_index),
            })
            .collect();
        Self {
            name: device.display_name().to_owned(),
            mac: device.mac.to_string(),
            model: device.model.clone(),
            ip: device.ip.clone(),
            version: device.version.clone(),
            state: state::state_label(device.state_code),
            reachability: state::device_reachability(device),
            restart: state::restart_state(Some(snapshot), &device.mac),
            attributes: state::restart_attributes(device),
            ports,
        }
    }
}

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "PoE on")]
    poe_on: String,
}

impl From<&DeviceView> for DeviceRow {
    fn from(d: &DeviceView) -> Self {
        let capable = d.ports.iter().filter(|p| p.poe_capable).count();
        let on = d.ports.iter().filter(|p| p.poe.is_on()).count();
        Self {
            name: d.name.clone(),
            mac: d.mac.clone(),
            model: d.model.clone().unwrap_or_default(),
            ip: d.ip.clone().unwrap_or_default(),
            state: d.state.to_owned(),
            poe_on: if capable == 0 {
                "-".into()
            } else {
                format!("{on}/{capable}")
            },
        }
    }
}

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "#")]
    index: u32,
    #[tabled(rename = "Port")]
    name: String,
    #[tabled(rename = "PoE mode")]
    mode: String,
    #[tabled(rename = "PoE")]
    state: String,
    #[tabled(rename = "Power")]
    power: String,
}

impl From<&PortView> for PortRow {
    fn from(p: &PortView) -> Self {
        let power = p
            .attributes
            .get("poe_power")
            .map_or_else(|| "-".into(), |w| format!("{w} W"));
        Self {
            index: p.index,
            name: p.name.clone(),
            mode: p.poe_mode.clone().unwrap_or_else(|| "-".into()),
            state: if p.poe_capable {
                p.poe.to_string()
            } else {
                "-".into()
            },
            power,
        }
    }
}

fn detail(d: &DeviceView) -> String {
    let mut lines = vec![
        format!("Name:     {}", d.name),
        format!("MAC:      {}", d.mac),
        format!("IP:       {}", d.ip.as_deref().unwrap_or("-")),
        format!("Model:    {}", d.model.as_deref().unwrap_or("-")),
        format!("Firmware: {}", d.version.as_deref().unwrap_or("-")),
        format!("State:    {} ({})", d.state, d.reachability),
        format!("Restart:  {}", d.restart),
    ];
    if let Some(uptime) = d.attributes.get("uptime") {
        lines.push(format!("Uptime:   {uptime}s"));
    }
    if !d.ports.is_empty() {
        let rows: Vec<PortRow> = d.ports.iter().map(PortRow::from).collect();
        lines.push(output::render_table(&rows));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    connection: &Connection,
    args: &DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = connection.refresh().await?;

    let rendered = match args.device {
        Some(ref needle) => {
            let device = util::find_device(&snapshot, needle)?;
            let view = DeviceView::new(&snapshot, device);
            output::render_single(global.output, &view, detail, |d| d.mac.clone())?
        }
        None => {
            let views: Vec<DeviceView> = snapshot
                .devices()
                .iter()
                .map(|device| DeviceView::new(&snapshot, device))
                .collect();
            output::render_list(
                global.output,
                &views,
                |d| DeviceRow::from(d),
                |d| format!("{}\t{}\t{}", d.mac, d.name, d.state),
            )?
        }
    };
    output::print_output(&rendered, global.quiet);
    Ok(())
}
