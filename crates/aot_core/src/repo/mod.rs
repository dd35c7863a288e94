//! Session storage for reasoning atoms.
//!
//! # Responsibility
//! - Hold atoms for the lifetime of one engine instance.
//! - Keep graph queries next to the data they scan.
//!
//! # Invariants
//! - Nothing is persisted; a fresh engine starts from an empty store.
//! - Writes happen only after the caller validated the atom and its
//!   dependencies.

pub mod atom_store;
