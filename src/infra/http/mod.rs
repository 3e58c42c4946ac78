pub mod client;
pub mod remote;
