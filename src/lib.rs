//! Fleet maintenance administration service.
//!
//! The interesting subsystem lives in [`inspections`]: role-scoped checklist
//! templates, the per-session answer engine, the completion gate, persisted
//! inspection records, and the report renderers. Vehicles, roles, and evidence
//! uploads are external collaborators consumed through the traits in
//! [`directory`].

pub mod config;
pub mod directory;
pub mod error;
pub mod inspections;
pub mod telemetry;
