//! The session's analysis data store.
//!
//! One [`AnalysisDataStore`] exists per dashboard session. It is created
//! when the dashboard mounts, issues at most one fetch, and is discarded on
//! unmount. A fetch is split into [`AnalysisDataStore::begin_fetch`] and
//! [`AnalysisDataStore::complete_fetch`] so the request can run while the
//! UI keeps using the store; the [`FetchTicket`] handed out by `begin_fetch`
//! lets the store drop results that arrive after an unmount or reload.

use ride_map_layer_models::AnalysisDataset;
use strum_macros::Display;

use crate::fetch::{DatasetFetcher, FetchError};

/// State of the session's single dataset fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// The request is in flight.
    Loading,
    /// The dataset arrived and decoded.
    Ready(AnalysisDataset),
    /// The request failed; terminal until an explicit reload.
    Failed(String),
}

impl FetchState {
    /// Payload-free view of this state.
    #[must_use]
    pub const fn phase(&self) -> FetchPhase {
        match self {
            Self::Idle => FetchPhase::Idle,
            Self::Loading => FetchPhase::Loading,
            Self::Ready(_) => FetchPhase::Ready,
            Self::Failed(_) => FetchPhase::Failed,
        }
    }

    /// The dataset, only while `Ready`.
    #[must_use]
    pub const fn dataset(&self) -> Option<&AnalysisDataset> {
        match self {
            Self::Ready(dataset) => Some(dataset),
            _ => None,
        }
    }

    /// The failure message, only while `Failed`.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// [`FetchState`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FetchPhase {
    /// Nothing requested yet.
    Idle,
    /// The request is in flight.
    Loading,
    /// The dataset is available.
    Ready,
    /// The request failed.
    Failed,
}

/// Proof that a fetch was started by a particular store generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a started fetch must be completed with its ticket"]
pub struct FetchTicket {
    generation: u64,
}

/// Owner of the session's [`FetchState`].
#[derive(Debug, Default)]
pub struct AnalysisDataStore {
    state: FetchState,
    generation: u64,
    disposed: bool,
}

impl AnalysisDataStore {
    /// Creates a store in the `Idle` state (dashboard mount).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current fetch state.
    #[must_use]
    pub const fn state(&self) -> &FetchState {
        &self.state
    }

    /// Current fetch phase.
    #[must_use]
    pub const fn phase(&self) -> FetchPhase {
        self.state.phase()
    }

    /// The dataset, only while `Ready`. Every other state reports no data.
    #[must_use]
    pub const fn dataset(&self) -> Option<&AnalysisDataset> {
        self.state.dataset()
    }

    /// Bumped by every reload and unmount. Each dataset the store ever
    /// holds comes from a distinct generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the store has been unmounted.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Moves `Idle → Loading` and returns the ticket for the fetch.
    ///
    /// Returns `None` (and changes nothing) if a fetch is already in
    /// flight, has already finished, or the store is disposed. Only an
    /// explicit [`Self::reload`] makes a new fetch possible.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if self.disposed {
            log::debug!("Ignoring fetch request on a disposed store");
            return None;
        }
        if self.state != FetchState::Idle {
            log::debug!("Ignoring fetch request while {}", self.phase());
            return None;
        }

        self.state = FetchState::Loading;
        log::debug!("Analysis data fetch started (generation {})", self.generation);
        Some(FetchTicket {
            generation: self.generation,
        })
    }

    /// Applies the outcome of the fetch identified by `ticket`.
    ///
    /// Results for a ticket from an earlier generation (the store was
    /// reloaded or unmounted meanwhile) are discarded. Returns whether the
    /// result was applied.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<AnalysisDataset, FetchError>,
    ) -> bool {
        if self.disposed || ticket.generation != self.generation {
            log::debug!(
                "Discarding stale fetch result (generation {}, current {})",
                ticket.generation,
                self.generation
            );
            return false;
        }
        if self.state != FetchState::Loading {
            log::warn!("Discarding fetch result while {}", self.phase());
            return false;
        }

        self.state = match result {
            Ok(dataset) => {
                log::info!(
                    "Analysis data loaded: {} records, {} layers",
                    dataset.metadata.total_records,
                    dataset.layer_ids().count()
                );
                FetchState::Ready(dataset)
            }
            Err(e) => {
                log::error!("Analysis data fetch failed: {e}");
                FetchState::Failed(e.to_string())
            }
        };
        true
    }

    /// Runs the session's fetch to completion with `fetcher`.
    ///
    /// A no-op returning `false` if [`Self::begin_fetch`] would refuse.
    pub async fn activate(&mut self, fetcher: &dyn DatasetFetcher) -> bool {
        let Some(ticket) = self.begin_fetch() else {
            return false;
        };
        let result = fetcher.fetch().await;
        self.complete_fetch(ticket, result)
    }

    /// Explicit reload: forgets the current dataset or failure and returns
    /// to `Idle`. Any fetch still in flight becomes stale.
    pub fn reload(&mut self) {
        if self.disposed {
            log::debug!("Ignoring reload of a disposed store");
            return;
        }
        self.generation += 1;
        self.state = FetchState::Idle;
        log::info!("Analysis data store reloaded (generation {})", self.generation);
    }

    /// Dashboard unmount: drops the dataset and refuses all further
    /// fetches and results.
    pub fn unmount(&mut self) {
        self.generation += 1;
        self.state = FetchState::Idle;
        self.disposed = true;
        log::debug!("Analysis data store disposed");
    }
}
