//! Conference domain model and column types.
//!
//! # Responsibility
//! - Define the raw (persisted) and public (external) conference shapes.
//! - Provide the JSON property bag used for schemaless attributes.
//!
//! # Invariants
//! - Every conference is identified by a store-assigned `ConfId`.
//! - The public shape is a one-way projection of the raw shape.

pub mod conf;
pub mod property_bag;
