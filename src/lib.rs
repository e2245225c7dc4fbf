//! Qualification and staffing core for the volunteer ATC event portal.
//!
//! The portal's CRUD surfaces (signup forms, notification wiring, roster
//! pages) live elsewhere. This crate owns the rule system deciding what a
//! controller is authorized to work at an airport, plus the staffing
//! feasibility checks built on top of it.

pub mod cache;
pub mod config;
pub mod error;
pub mod qualification;
pub mod staffing;
pub mod telemetry;
