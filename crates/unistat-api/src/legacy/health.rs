// Legacy API site health
//
// `stat/health` returns one loosely-typed record per subsystem
// (wan, www, lan, wlan, vpn). Field sets differ per subsystem and per
// firmware, so records are handed back as raw JSON objects.

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;

impl LegacyClient {
    /// Fetch per-subsystem health records.
    ///
    /// `GET /api/s/{site}/stat/health`
    pub async fn get_health(&self) -> Result<Vec<serde_json::Value>, Error> {
        let url = self.site_url("stat/health")?;
        debug!("fetching site health");
        self.get(url).await
    }
}
