use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::Attributes;

/// A functional area of the site with an aggregate health status.
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
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Subsystem {
    Vpn,
    Www,
    Wan,
    Lan,
    Wlan,
}

/// One entry of the site health list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsystemRecord {
    pub subsystem: Subsystem,
    pub status: String,
    /// Every field the controller reported, `subsystem` and `status` included.
    pub fields: Attributes,
}

impl SubsystemRecord {
    /// Look up a raw field.
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn subsystem_tags_are_lowercase() {
        let tags: Vec<String> = Subsystem::iter().map(|s| s.to_string()).collect();
        assert_eq!(tags, ["vpn", "www", "wan", "lan", "wlan"]);
        assert_eq!("wlan".parse::<Subsystem>().unwrap(), Subsystem::Wlan);
        assert!("gw".parse::<Subsystem>().is_err());
    }
}
