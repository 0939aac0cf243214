//! Host-side setup shared by the demos

pub mod network;

pub use network::*;
