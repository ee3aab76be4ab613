use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::LegacyAlarm;

impl LegacyClient {
    /// List alarms, archived ones included.
    ///
    /// `GET /api/s/{site}/stat/alarm`
    pub async fn list_alarms(&self) -> Result<Vec<LegacyAlarm>, Error> {
        let url = self.site_url("stat/alarm")?;
        debug!("listing alarms");
        self.get(url).await
    }
}
