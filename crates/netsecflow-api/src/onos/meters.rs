// Meter and flow-rule endpoints
//
// Meters and the flow rules that reference them are device-scoped:
// `/meters/{deviceId}` and `/flows/{deviceId}`.

use reqwest::header::{HeaderMap, LOCATION};
use tracing::{debug, warn};

use crate::error::Error;
use crate::onos::client::OnosClient;
use crate::onos::types::{FlowRule, MeterEntry, MeterRequest, MetersResponse};

impl OnosClient {
    /// Create a meter and return the id the controller assigned to it.
    ///
    /// `POST /meters/{deviceId}` (expects 201). The id is read from the
    /// `Location` header; when that is missing the device's meters are
    /// listed and the new one is found by requested id, then by band rate.
    pub async fn create_meter(&self, meter: &MeterRequest) -> Result<String, Error> {
        let url = self.endpoint(&["meters", &meter.device_id]);
        let resp = self.post_created(url, meter).await?;

        if let Some(id) = location_tail(resp.headers()) {
            debug!(device_id = %meter.device_id, meter_id = %id, "meter created");
            return Ok(id);
        }

        warn!(device_id = %meter.device_id, "meter created without Location header, listing meters");
        let installed = self.list_meters(&meter.device_id).await?;
        let rate = meter.bands.first().map(|b| b.rate);
        installed
            .iter()
            .find(|m| m.id == meter.meter_id)
            .or_else(|| {
                installed
                    .iter()
                    .find(|m| m.bands.first().map(|b| b.rate) == rate)
            })
            .map(|m| m.id.clone())
            .ok_or_else(|| Error::MeterNotConfirmed {
                device_id: meter.device_id.clone(),
            })
    }

    /// `GET /meters/{deviceId}`
    pub async fn list_meters(&self, device_id: &str) -> Result<Vec<MeterEntry>, Error> {
        let resp: MetersResponse = self.get(self.endpoint(&["meters", device_id])).await?;
        Ok(resp.meters)
    }

    /// Install a flow rule on its device.
    ///
    /// `POST /flows/{deviceId}` (expects 201)
    pub async fn create_flow_rule(&self, flow: &FlowRule) -> Result<(), Error> {
        debug!(device_id = %flow.device_id, priority = flow.priority, "creating flow rule");
        self.post_created(self.endpoint(&["flows", &flow.device_id]), flow)
            .await
            .map(|_| ())
    }
}

/// Last non-empty path segment of the `Location` header.
fn location_tail(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(LOCATION)?.to_str().ok()?;
    value
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(String::from)
}
