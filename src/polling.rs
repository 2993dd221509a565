//! Periodic refetching of remote data.
//!
//! [Poller] owns the timer and triggers a fetch on every tick. [FeedState]
//! tracks what the fetches return and decides which responses are still
//! current.

use std::{future::Future, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

use crate::Error;

/// Calls a fetch function immediately and then once per interval until stopped.
///
/// The poller does not wait for a fetch to finish before starting the next
/// one. Each call is spawned as its own task, so a slow or failing fetch
/// never delays or stops the schedule.
///
/// The timer is released when the poller is stopped or dropped.
#[derive(Debug)]
pub struct Poller {
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl Poller {
    /// Start polling with `fetch` every `interval`.
    ///
    /// `fetch` is called once before this function returns.
    ///
    /// # Errors
    /// Returns [Error::InvalidRefreshInterval] if `interval` is zero.
    pub fn start<F, Fut>(fetch: F, interval: Duration) -> Result<Self, Error>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if interval.is_zero() {
            return Err(Error::InvalidRefreshInterval);
        }

        tokio::spawn(fetch());

        let first_tick = Instant::now() + interval;
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                tokio::spawn(fetch());
            }
        });

        tracing::debug!("started polling every {interval:?}");

        Ok(Self {
            handle: Some(handle),
            interval,
        })
    }

    /// Stop the current schedule and start a new one with `fetch` and `interval`.
    ///
    /// # Errors
    /// Returns [Error::InvalidRefreshInterval] if `interval` is zero, in which
    /// case the poller is left stopped.
    pub fn restart<F, Fut>(&mut self, fetch: F, interval: Duration) -> Result<(), Error>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop();
        *self = Self::start(fetch, interval)?;

        Ok(())
    }

    /// Stop triggering fetches. Calling this more than once has no further effect.
    ///
    /// Fetches that are already running are left to finish.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("stopped polling every {:?}", self.interval);
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The observable status of the most recent fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Success,
    /// The fetch failed, the message is meant for display.
    Error(String),
}

/// Identifies one fetch so that its response can be matched to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// The latest data of a polled feed and the status of its fetches.
///
/// Every fetch takes a ticket from [FeedState::begin]. Tickets increase
/// monotonically, and a response is dropped if a response with a later
/// ticket has already been applied.
#[derive(Debug, Clone)]
pub struct FeedState<T> {
    data: T,
    status: FetchStatus,
    issued: u64,
    applied: u64,
}

impl<T> FeedState<T> {
    /// A feed that has not fetched anything yet.
    pub fn new(data: T) -> Self {
        Self {
            data,
            status: FetchStatus::Idle,
            issued: 0,
            applied: 0,
        }
    }

    /// A feed whose first fetch is about to be issued.
    pub fn loading(data: T) -> Self {
        Self {
            status: FetchStatus::Loading,
            ..Self::new(data)
        }
    }

    /// Record the start of a fetch.
    pub fn begin(&mut self) -> RequestTicket {
        self.issued += 1;
        self.status = FetchStatus::Loading;

        RequestTicket(self.issued)
    }

    /// Apply the result of the fetch identified by `ticket`.
    ///
    /// Returns `false` and leaves the feed untouched if a newer response
    /// has already been applied.
    pub fn resolve(&mut self, ticket: RequestTicket, result: Result<T, String>) -> bool {
        if ticket.0 <= self.applied {
            tracing::debug!(
                "dropping stale response #{} (latest applied is #{})",
                ticket.0,
                self.applied
            );
            return false;
        }

        self.applied = ticket.0;

        match result {
            Ok(data) => {
                self.data = data;
                self.status = FetchStatus::Success;
            }
            Err(message) => self.status = FetchStatus::Error(message),
        }

        true
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }
}
