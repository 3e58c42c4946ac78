pub mod data_source;
pub mod http;
pub mod notifier;
pub mod session;
