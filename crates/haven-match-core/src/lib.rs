//! # Haven Match Core
//!
//! Shared, I/O-free logic for Haven Match: mentor models, the corpus
//! builder, ranking prompts, response parsing, result resolution, vector
//! utilities, and the store and model traits.
//!
//! This crate contains no tokio, sqlx, reqwest, or filesystem I/O.

pub mod corpus;
pub mod embedding;
pub mod matching;
pub mod model;
pub mod models;
pub mod outcome;
pub mod prompt;
pub mod response;
pub mod store;
