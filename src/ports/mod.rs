//! Port traits: the seams between the journal core and its collaborators.

pub mod config_port;
pub mod storage_port;
