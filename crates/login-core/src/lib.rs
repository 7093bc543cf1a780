//! Core types and trait definitions for the ACM/IDM login service.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! graph store and the identity provider are reached through the
//! [`store::GraphStore`] and [`provider::IdentityProvider`] traits; the
//! find-or-create reconciliation and the session lifecycle live here.

pub mod claims;
pub mod entity;
pub mod error;
pub mod partition;
pub mod provider;
pub mod reconcile;
pub mod resource;
pub mod session;
pub mod store;

pub use error::{AuthFailure, Claim, Error, Result};
