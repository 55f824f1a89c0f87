//! Services for the portal session layer.

pub mod session;
