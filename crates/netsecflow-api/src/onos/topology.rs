// Topology endpoints
//
// Devices, links, and hosts are separate resources; `topology()` fetches all
// three back to back so routing decisions see one coherent snapshot.

use tracing::debug;

use crate::error::Error;
use crate::onos::client::OnosClient;
use crate::onos::types::{
    Device, DevicesResponse, Host, HostsResponse, Link, LinksResponse, TopologySnapshot,
};

impl OnosClient {
    /// `GET /devices`
    pub async fn list_devices(&self) -> Result<Vec<Device>, Error> {
        let resp: DevicesResponse = self.get(self.endpoint(&["devices"])).await?;
        Ok(resp.devices)
    }

    /// `GET /links`
    pub async fn list_links(&self) -> Result<Vec<Link>, Error> {
        let resp: LinksResponse = self.get(self.endpoint(&["links"])).await?;
        Ok(resp.links)
    }

    /// `GET /hosts`
    pub async fn list_hosts(&self) -> Result<Vec<Host>, Error> {
        let resp: HostsResponse = self.get(self.endpoint(&["hosts"])).await?;
        Ok(resp.hosts)
    }

    /// Fetch devices, links, and hosts. Any failing call fails the snapshot.
    pub async fn topology(&self) -> Result<TopologySnapshot, Error> {
        let devices = self.list_devices().await?;
        let links = self.list_links().await?;
        let hosts = self.list_hosts().await?;
        debug!(
            devices = devices.len(),
            links = links.len(),
            hosts = hosts.len(),
            "fetched topology"
        );
        Ok(TopologySnapshot {
            devices,
            links,
            hosts,
        })
    }
}
