//! Data models for the portal session layer.

pub mod session;

pub use session::Session;
