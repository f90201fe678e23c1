// ONOS northbound REST API
//
// `OnosClient` carries transport mechanics; endpoint groups are inherent
// methods split across the sibling modules.

pub mod acl;
pub mod client;
pub mod intents;
pub mod meters;
pub mod topology;
pub mod types;
