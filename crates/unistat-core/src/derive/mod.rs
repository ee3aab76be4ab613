// ── Derivation engine ──
//
// Turns a snapshot into display values. The catalog is immutable data:
// a table of base sensors (one per monitored condition) and a table of
// derived rules holding plain function pointers. Evaluation is pure and
// runs on every read; a failing rule degrades to "no value".

pub mod format;
mod rules;
pub mod views;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::trace;

use crate::error::DerivationError;
use crate::model::{Attributes, Snapshot, Subsystem};

pub use rules::NO_ALERT;
pub use views::{HealthView, alerts_attributes, alerts_view, firmware_view, health_view};

// ── Condition ───────────────────────────────────────────────────────

/// A monitorable status area: the five subsystems plus alerts and firmware.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Condition {
    Vpn,
    Www,
    Wan,
    Lan,
    Wlan,
    Alerts,
    Firmware,
}

impl Condition {
    /// Every condition; the default monitored set.
    pub fn all() -> BTreeSet<Self> {
        Self::iter().collect()
    }

    /// The health subsystem this condition reads, if any.
    pub fn subsystem(self) -> Option<Subsystem> {
        match self {
            Self::Vpn => Some(Subsystem::Vpn),
            Self::Www => Some(Subsystem::Www),
            Self::Wan => Some(Subsystem::Wan),
            Self::Lan => Some(Subsystem::Lan),
            Self::Wlan => Some(Subsystem::Wlan),
            Self::Alerts | Self::Firmware => None,
        }
    }
}

impl From<Subsystem> for Condition {
    fn from(subsystem: Subsystem) -> Self {
        match subsystem {
            Subsystem::Vpn => Self::Vpn,
            Subsystem::Www => Self::Www,
            Subsystem::Wan => Self::Wan,
            Subsystem::Lan => Self::Lan,
            Subsystem::Wlan => Self::Wlan,
        }
    }
}

// ── SensorValue ─────────────────────────────────────────────────────

/// A typed sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl SensorValue {
    /// Scalar JSON to a value; arrays and objects are rejected.
    pub fn try_from_json(
        field: &'static str,
        value: &serde_json::Value,
    ) -> Result<Self, DerivationError> {
        match value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float))
                .ok_or(DerivationError::OutOfRange { field }),
            serde_json::Value::String(s) => Ok(Self::Text(s.clone())),
            serde_json::Value::Bool(b) => Ok(Self::Text(b.to_string())),
            serde_json::Value::Null => Err(DerivationError::MissingField { field }),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                Err(DerivationError::WrongType {
                    field,
                    expected: "a scalar",
                })
            }
        }
    }
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

// ── Catalog tables ──────────────────────────────────────────────────

/// Pure extraction from a source view's attribute map.
pub type Extractor = fn(&Attributes) -> Result<SensorValue, DerivationError>;

/// One derived sensor.
#[derive(Debug, Clone, Copy)]
pub struct DerivationRule {
    /// Stable unique identifier.
    pub key: &'static str,
    pub name: &'static str,
    /// View whose attributes feed `extract`.
    pub source: Condition,
    pub unit: Option<&'static str>,
    pub icon: Option<&'static str>,
    pub extract: Extractor,
}

/// One base sensor: the headline state of a condition.
#[derive(Debug, Clone, Copy)]
pub struct BaseSensor {
    pub condition: Condition,
    pub name: &'static str,
    pub icon: &'static str,
}

impl BaseSensor {
    pub fn key(&self) -> String {
        format!("unifi_status_{}", self.condition)
    }
}

/// Immutable sensor tables, built once and shared.
#[derive(Debug, Clone)]
pub struct SensorCatalog {
    base: Vec<BaseSensor>,
    derived: Vec<DerivationRule>,
}

impl SensorCatalog {
    /// The stock tables.
    pub fn standard() -> Self {
        Self {
            base: vec![
                base(Condition::Vpn, "VPN", "mdi:folder-key-network"),
                base(Condition::Www, "WWW", "mdi:web"),
                base(Condition::Wan, "WAN", "mdi:shield-outline"),
                base(Condition::Lan, "LAN", "mdi:lan"),
                base(Condition::Wlan, "WLAN", "mdi:wifi"),
                base(Condition::Alerts, "Alerts", "mdi:information-outline"),
                base(Condition::Firmware, "Firmware Upgradable", "mdi:database-plus"),
            ],
            derived: rules::standard_rules(),
        }
    }

    pub fn base_sensors(&self) -> &[BaseSensor] {
        &self.base
    }

    pub fn derived_rules(&self) -> &[DerivationRule] {
        &self.derived
    }
}

impl Default for SensorCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn base(condition: Condition, name: &'static str, icon: &'static str) -> BaseSensor {
    BaseSensor {
        condition,
        name,
        icon,
    }
}

// ── Readings ────────────────────────────────────────────────────────

/// Evaluated sensor, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub key: String,
    pub name: String,
    pub source: Condition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
    /// `None` when unavailable.
    pub value: Option<SensorValue>,
    #[serde(skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

/// Evaluates a catalog against snapshots for a set of monitored conditions.
#[derive(Debug, Clone)]
pub struct DerivationEngine {
    catalog: Arc<SensorCatalog>,
    monitored: BTreeSet<Condition>,
    prefix: String,
}

impl DerivationEngine {
    pub fn new(
        catalog: Arc<SensorCatalog>,
        monitored: BTreeSet<Condition>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            monitored,
            prefix: prefix.into(),
        }
    }

    pub fn monitored(&self) -> &BTreeSet<Condition> {
        &self.monitored
    }

    /// Base sensors for monitored conditions, in catalog order.
    pub fn base_readings(&self, snapshot: Option<&Snapshot>) -> Vec<SensorReading> {
        self.catalog
            .base_sensors()
            .iter()
            .filter(|sensor| self.monitored.contains(&sensor.condition))
            .map(|sensor| {
                let (value, attributes) = snapshot
                    .map(|snap| base_state(snap, sensor.condition))
                    .unwrap_or_default();
                SensorReading {
                    key: sensor.key(),
                    name: format!("{} {}", self.prefix, sensor.name),
                    source: sensor.condition,
                    unit: None,
                    icon: Some(sensor.icon),
                    value,
                    attributes,
                }
            })
            .collect()
    }

    /// Derived sensors whose source condition is monitored.
    pub fn derived_readings(&self, snapshot: Option<&Snapshot>) -> Vec<SensorReading> {
        self.catalog
            .derived_rules()
            .iter()
            .filter(|rule| self.monitored.contains(&rule.source))
            .map(|rule| SensorReading {
                key: rule.key.to_owned(),
                name: format!("{} {}", self.prefix, rule.name),
                source: rule.source,
                unit: rule.unit,
                icon: rule.icon,
                value: snapshot.and_then(|snap| evaluate(rule, snap)),
                attributes: Attributes::new(),
            })
            .collect()
    }

    /// Base readings followed by derived readings.
    pub fn readings(&self, snapshot: Option<&Snapshot>) -> Vec<SensorReading> {
        let mut all = self.base_readings(snapshot);
        all.extend(self.derived_readings(snapshot));
        all
    }
}

/// Run one rule against its source view. Errors are logged and contained.
pub fn evaluate(rule: &DerivationRule, snapshot: &Snapshot) -> Option<SensorValue> {
    let alerts;
    let attrs = match rule.source.subsystem() {
        Some(subsystem) => &snapshot.subsystem(subsystem)?.fields,
        None if rule.source == Condition::Alerts => {
            alerts = alerts_attributes(snapshot);
            &alerts
        }
        None => return None,
    };

    match (rule.extract)(attrs) {
        Ok(value) => Some(value),
        Err(e) => {
            trace!(rule = rule.key, error = %e, "derivation yielded no value");
            None
        }
    }
}

fn base_state(snapshot: &Snapshot, condition: Condition) -> (Option<SensorValue>, Attributes) {
    match condition {
        Condition::Alerts => {
            let attrs = alerts_attributes(snapshot);
            (Some(SensorValue::Integer(count(attrs.len()))), attrs)
        }
        Condition::Firmware => {
            let view = firmware_view(snapshot);
            let value = SensorValue::Integer(count(view.len()));
            (Some(value), view.into_iter().collect())
        }
        _ => condition
            .subsystem()
            .and_then(|subsystem| health_view(snapshot, subsystem))
            .map(|view| (Some(SensorValue::Text(view.state)), view.attributes.clone()))
            .unwrap_or_default(),
    }
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
