pub mod controller;
pub mod local_processor;
pub mod query_builder;
