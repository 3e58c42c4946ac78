pub mod components;
pub mod hooks;
pub mod layout;
pub mod state;
