//! Stride - financial goal tracking
//!
//! This library provides the core of the Stride goal tracker: goals with an
//! append-only progress ledger, milestones that complete themselves, a small
//! lifecycle state machine, and metrics (progress, pace, required monthly
//! savings, attention flags) derived fresh on every read.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `clock`: Injected current-time source
//! - `models`: Core data models (goals, milestones, ledger, transactions) and metrics
//! - `storage`: JSON file storage layer
//! - `audit`: Audit logging system
//! - `services`: Business logic layer
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the `stride` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use stride::clock::SystemClock;
//! use stride::config::paths::StridePaths;
//! use stride::models::{Money, NewGoal};
//! use stride::services::GoalService;
//! use stride::storage::Storage;
//!
//! let mut storage = Storage::new(StridePaths::new()?)?;
//! storage.load_all()?;
//! let clock = SystemClock;
//! let goal = GoalService::new(&storage, &clock)
//!     .create(&"me".into(), NewGoal::new("Vacation", Money::from_units(2000), deadline))?;
//! ```

pub mod audit;
pub mod cli;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::StrideError;
