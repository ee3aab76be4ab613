// Built-in snapshot views: per-subsystem health, active alerts, and
// devices with pending firmware upgrades.

use indexmap::IndexMap;

use crate::model::{AlertRecord, Attributes, Snapshot, Subsystem};

/// Headline state and attributes of one subsystem.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthView<'a> {
    /// The record's status, upper-cased (`"OK"`, `"WARNING"`, ...).
    pub state: String,
    pub attributes: &'a Attributes,
}

pub fn health_view(snapshot: &Snapshot, subsystem: Subsystem) -> Option<HealthView<'_>> {
    snapshot.subsystem(subsystem).map(|record| HealthView {
        state: record.status.to_uppercase(),
        attributes: &record.fields,
    })
}

/// Non-archived alerts keyed by 1-based position in controller order.
pub fn alerts_view(snapshot: &Snapshot) -> IndexMap<usize, &AlertRecord> {
    snapshot
        .alerts()
        .iter()
        .filter(|alert| !alert.archived)
        .enumerate()
        .map(|(i, alert)| (i + 1, alert))
        .collect()
}

/// The alerts view as an attribute map (`"1" -> {raw alert}`).
pub fn alerts_attributes(snapshot: &Snapshot) -> Attributes {
    alerts_view(snapshot)
        .into_iter()
        .map(|(i, alert)| (i.to_string(), serde_json::Value::Object(alert.fields.clone())))
        .collect()
}

/// Devices offering a firmware upgrade, keyed by display name.
pub fn firmware_view(snapshot: &Snapshot) -> IndexMap<String, serde_json::Value> {
    snapshot
        .devices()
        .iter()
        .filter(|device| device.is_upgradable())
        .filter_map(|device| {
            let flag = device.fields.get("upgradable")?.clone();
            Some((device.display_name().to_owned(), flag))
        })
        .collect()
}
