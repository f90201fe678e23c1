// ── Topology graph ──
//
// Weighted view of a controller topology snapshot. Every reported link
// contributes a forward and a reverse edge weighted by its `latency`
// annotation, so routing treats the fabric as undirected. The raw links
// stay available for directional lookups (`direct_link`).
//
// Built fresh from each snapshot; nothing here is cached between routing
// decisions.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use netsecflow_api::types::{Device, Host, Link, TopologySnapshot};
use serde_json::Value;

use crate::error::CoreError;

/// Weight used when a link carries no usable latency.
pub const DEFAULT_LINK_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone)]
struct Edge {
    to: String,
    weight: f64,
}

/// Where a host plugs into the fabric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAttachment {
    pub device_id: String,
    pub port: String,
    pub mac: Option<String>,
}

/// A path and its summed edge weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub devices: Vec<String>,
    pub cost: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    devices: HashMap<String, Device>,
    links: Vec<Link>,
    hosts: Vec<Host>,
    adjacency: HashMap<String, Vec<Edge>>,
}

/// Latency annotation as a weight; absent, non-numeric, negative or
/// non-finite values fall back to the default.
fn link_weight(link: &Link) -> f64 {
    let parsed = match link.annotations.get("latency") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|w| w.is_finite() && *w >= 0.0)
        .unwrap_or(DEFAULT_LINK_WEIGHT)
}

impl TopologyGraph {
    pub fn from_snapshot(snapshot: TopologySnapshot) -> Self {
        let mut adjacency: HashMap<String, Vec<Edge>> = HashMap::new();
        for link in &snapshot.links {
            let weight = link_weight(link);
            adjacency.entry(link.src.device.clone()).or_default().push(Edge {
                to: link.dst.device.clone(),
                weight,
            });
            adjacency.entry(link.dst.device.clone()).or_default().push(Edge {
                to: link.src.device.clone(),
                weight,
            });
        }

        let devices = snapshot
            .devices
            .into_iter()
            .map(|d| (d.id.clone(), d))
            .collect();

        Self {
            devices,
            links: snapshot.links,
            hosts: snapshot.hosts,
            adjacency,
        }
    }

    pub fn device(&self, id: &str) -> Option<&Device> {
        self.devices.get(id)
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// First link reported as going from `from` to `to` (direction matters).
    pub fn direct_link(&self, from: &str, to: &str) -> Option<&Link> {
        self.links
            .iter()
            .find(|l| l.src.device == from && l.dst.device == to)
    }

    /// Locate a host by IP. Hosts are treated as single-homed: only the
    /// first reported location is used.
    pub fn resolve_host(&self, ip: &str) -> Result<HostAttachment, CoreError> {
        let host = self
            .hosts
            .iter()
            .find(|h| h.ip_addresses.iter().any(|a| a == ip))
            .ok_or_else(|| CoreError::HostNotFound { ip: ip.to_owned() })?;

        let unlocated = || CoreError::HostUnlocated { ip: ip.to_owned() };
        let location = host.locations.first().ok_or_else(unlocated)?;
        if location.element_id.is_empty() || location.port.is_empty() {
            return Err(unlocated());
        }

        Ok(HostAttachment {
            device_id: location.element_id.clone(),
            port: location.port.clone(),
            mac: host.mac.clone().filter(|m| !m.is_empty()),
        })
    }

    /// Device ids from `src` to `dst` inclusive; empty when unreachable.
    pub fn shortest_path(&self, src: &str, dst: &str) -> Vec<String> {
        self.shortest_path_with_cost(src, dst)
            .map(|r| r.devices)
            .unwrap_or_default()
    }

    /// Dijkstra over cumulative weight.
    pub fn shortest_path_with_cost(&self, src: &str, dst: &str) -> Option<Route> {
        if src == dst {
            return Some(Route {
                devices: vec![src.to_owned()],
                cost: 0.0,
            });
        }

        let mut best: HashMap<&str, f64> = HashMap::new();
        let mut previous: HashMap<&str, &str> = HashMap::new();
        let mut settled: HashSet<&str> = HashSet::new();
        let mut queue = BinaryHeap::new();

        best.insert(src, 0.0);
        queue.push(Candidate { cost: 0.0, device: src });

        while let Some(Candidate { cost, device }) = queue.pop() {
            if !settled.insert(device) {
                continue;
            }
            if device == dst {
                return Some(Route {
                    devices: Self::unwind(&previous, src, dst),
                    cost,
                });
            }

            let Some(edges) = self.adjacency.get(device) else {
                continue;
            };
            for edge in edges {
                let next = edge.to.as_str();
                if settled.contains(next) {
                    continue;
                }
                let candidate = cost + edge.weight;
                if best.get(next).is_none_or(|known| candidate < *known) {
                    best.insert(next, candidate);
                    previous.insert(next, device);
                    queue.push(Candidate {
                        cost: candidate,
                        device: next,
                    });
                }
            }
        }

        None
    }

    fn unwind<'a>(previous: &HashMap<&'a str, &'a str>, src: &str, dst: &'a str) -> Vec<String> {
        let mut path = vec![dst.to_owned()];
        let mut cursor = dst;
        while cursor != src {
            match previous.get(cursor) {
                Some(&prev) => {
                    path.push(prev.to_owned());
                    cursor = prev;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}

/// Min-heap entry: `BinaryHeap` is a max-heap, so ordering is reversed.
/// Ties break on device id to keep results stable.
#[derive(Debug)]
struct Candidate<'a> {
    cost: f64,
    device: &'a str,
}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.device.cmp(self.device))
    }
}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}
