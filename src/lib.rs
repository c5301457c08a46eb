//! Freightline Core
//!
//! Shipment lifecycle, permission, and reconciliation core for the
//! Freightline tracking frontend. The crate owns the status state machine,
//! the role-based edit guard, the derived-total invariant between line
//! items and shipping cost, and the optimistic merge protocol that keeps a
//! slow or inconsistent persistence backend from erasing items or
//! documents after a write. Rendering, routing, mapping, and session
//! handling are external collaborators.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod client;
pub mod config;
pub mod dto;
pub mod errors;
pub mod logging;
pub mod models;
pub mod queries;
pub mod services;
pub mod store;

pub use client::{CollaboratorApi, HttpCollaborator};
pub use config::AppConfig;
pub use errors::ServiceError;
pub use models::{Actor, Document, DriverAssignment, Item, Role, Shipment, ShipmentStatus};
pub use services::shipments::ShipmentService;
pub use store::ShipmentStore;
