//! Reasoning engine use-cases.
//!
//! # Responsibility
//! - Orchestrate atom ingestion, verification, decomposition and termination
//!   over one in-memory session.
//! - Keep tool/transport layers decoupled from graph bookkeeping.
//!
//! # Invariants
//! - Every public operation returns `EngineResult`; nothing panics on bad
//!   input.
//! - Engine state is owned by one `ReasoningEngine` value and never shared.

pub mod command;
pub mod decomposition;
pub mod engine;
pub mod error;
pub mod termination;
pub mod verification;
