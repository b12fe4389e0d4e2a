//! # Haven Match
//!
//! Mentor matching for the campus peer-support app: given a student's
//! free-text description of what they need, pick the mentors best placed
//! to help.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │  Mentors    │──▶│   Corpus    │──▶│   Gemini     │
//! │  (SQLite)   │   │   builder   │   │ embed/rank   │
//! └──────┬──────┘   └─────────────┘   └──────┬───────┘
//!        │                                   │
//!        │◀──────── mentor_embeddings ───────┤
//!        │                                   ▼
//!        │                            ┌──────────────┐
//!        └───────────────────────────▶│   Matcher    │
//!                                     └──────┬───────┘
//!                              ┌─────────────┴─────┐
//!                              ▼                   ▼
//!                         ┌──────────┐       ┌──────────┐
//!                         │   CLI    │       │   HTTP   │
//!                         │ (haven)  │       │  (axum)  │
//!                         └──────────┘       └──────────┘
//! ```
//!
//! Pure logic (models, corpus, prompts, response parsing, the store and
//! model traits) lives in the `haven-match-core` crate; this crate wires it
//! to SQLite, the Gemini API, the CLI, and the HTTP server.
//!
//! ## Quick Start
//!
//! ```bash
//! haven init                         # create database
//! haven import mentors.json          # load mentor profiles
//! haven embed all                    # embed every mentor
//! haven match "I need help with my resume for Google"
//! haven serve                        # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite `MentorStore` |
//! | [`gemini`] | Gemini embedding and generation client |
//! | [`matcher`] | Live query handling and bio summaries |
//! | [`refresh`] | Embedding refresh, single and batch |
//! | [`import`] | JSON mentor import |
//! | [`server`] | HTTP server |

pub mod config;
pub mod db;
pub mod gemini;
pub mod import;
pub mod matcher;
pub mod migrate;
pub mod refresh;
pub mod server;
pub mod sqlite_store;
