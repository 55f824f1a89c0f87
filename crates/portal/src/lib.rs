//! Newsstand Portal - session layer library.
//!
//! This crate owns the portal's client-side session: the access token, the
//! identity derived from it, and the decision whether a navigation may
//! render or must redirect. Rendering, routing tables, and the CRUD screens
//! are external collaborators; the only protocol this crate speaks is the
//! auth backend's token-refresh and role endpoints.
//!
//! # Architecture
//!
//! - [`store::SessionStore`] - the single mutable session, persisted across
//!   runs
//! - [`backend::HttpAuthBackend`] - reqwest client for the auth endpoints,
//!   with a cookie store carrying the HTTP-only refresh cookie
//! - [`services::session::SessionGuard`] - the per-navigation check:
//!   decode, refresh, role fetch, gate
//!
//! The guard never verifies token signatures. Claims are read purely for
//! UX gating (expiry, user id); authorization is enforced server-side on
//! every protected endpoint.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod claims;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;
