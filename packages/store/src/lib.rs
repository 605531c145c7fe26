#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analysis data store for the ride map dashboard.
//!
//! The dashboard loads exactly one [`AnalysisDataset`] per session. The
//! [`AnalysisDataStore`] owns it and exposes the `Idle → Loading →
//! Ready | Failed` state machine; a [`DatasetFetcher`] performs the actual
//! request ([`HttpDatasetFetcher`] in production, fakes in tests).
//!
//! [`AnalysisDataset`]: ride_map_layer_models::AnalysisDataset

pub mod config;
pub mod fetch;
pub mod store;

pub use config::{ConfigError, DashboardConfig};
pub use fetch::{DatasetFetcher, FetchError, HttpDatasetFetcher};
pub use store::{AnalysisDataStore, FetchPhase, FetchState, FetchTicket};
