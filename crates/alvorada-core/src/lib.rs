//! alvorada-core: Core evaluation pipeline for the Alvorada exam benchmark.
//!
//! This crate defines the question and result data model, the prompt
//! template store, question formatting, the model client adapter, response
//! scoring, the batch runner and accuracy aggregation.

pub mod client;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod model;
pub mod report;
pub mod scorer;
pub mod statistics;
pub mod template;
pub mod traits;
