// netsecflow-api: Async Rust client for the ONOS controller REST API

pub mod error;
pub mod onos;
pub mod transport;

pub use error::Error;
pub use onos::client::{BasicAuth, OnosClient};
pub use onos::types;
pub use transport::{TlsMode, TransportConfig};
