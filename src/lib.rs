//! Agent and sensitivity recommendations for Valorant players.
//!
//! Offline, [`services::dataset`] synthesizes labeled profiles and
//! [`services::trainer`] fits a one-hot encoder plus two random forests on
//! them. Online, [`services::Predictor`] loads those artifacts once and the
//! [`api`] router serves `POST /predict`.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod ml;
pub mod models;
pub mod services;
pub mod telemetry;
