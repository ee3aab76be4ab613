// ── Snapshot model ──
//
// Typed records built from one refresh cycle. Records keep their raw field
// maps next to the typed fields: derivation rules and attribute views read
// the open maps, control paths read the typed fields.

pub mod alert;
pub mod device;
pub mod health;
pub mod mac;
pub mod snapshot;

pub use alert::AlertRecord;
pub use device::{DeviceRecord, PortRecord};
pub use health::{Subsystem, SubsystemRecord};
pub use mac::MacAddress;
pub use snapshot::Snapshot;

/// Open attribute mapping carried by raw controller records.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Loose truthiness for controller flags that arrive as bools, numbers, or strings.
pub fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(a) => !a.is_empty(),
        serde_json::Value::Object(o) => !o.is_empty(),
    }
}
