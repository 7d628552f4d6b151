//! simulado-core: Exam sessions, question generation and scoring.
//!
//! This crate defines the data model, the provider trait, the question
//! generation client, the exam session state machine and the local stores
//! that the rest of simulado builds on.

pub mod clock;
pub mod error;
pub mod generator;
pub mod model;
pub mod parser;
pub mod profile;
pub mod prompt;
pub mod report;
pub mod session;
pub mod statistics;
pub mod store;
pub mod traits;
