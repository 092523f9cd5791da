//! Airlock controller library.
//!
//! Dual-gate airlock interlock control: a safety-critical state machine
//! that sequences two physically separate gates so a mobile agent can
//! pass through the chamber without both gates ever being open at once,
//! while independent safety-obstruction sensors can override any
//! in-progress motion.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection; hardware stays behind the port traits in [`app::ports`],
//! with the in-memory simulation in [`adapters::sim`] as the reference
//! collaborator.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fsm;
pub mod gateway;
pub mod safety;
pub mod sensors;
pub mod status;

pub mod adapters;
pub mod drivers;
