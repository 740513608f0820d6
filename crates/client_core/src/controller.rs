//! Refresh cycle: trigger a prediction run, fetch the newest record, render.

use std::{
    ops::{Deref, DerefMut},
    sync::atomic::{AtomicBool, Ordering},
};

use serde_json::Value;
use shared::protocol::PredictionRecord;
use tracing::{debug, error, info};

use crate::{
    error::FetchError,
    format::{display_value, is_truthy},
    presenter::update_ui,
    view::{DashboardView, ElementId},
    PredictionSource,
};

pub const TRIGGER_IDLE_LABEL: &str = "Refresh Now";
pub const TRIGGER_BUSY_LABEL: &str = "Updating...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The presenter ran; `records` is how many records the payload held.
    Rendered { records: usize },
    /// The payload carried an application error; nothing was rendered.
    ServerReported(String),
    Failed(String),
    /// Another cycle was already running.
    Busy,
}

/// What the realtime payload turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimePayload {
    /// Only the first record is decoded; `count` is the array length.
    Records {
        latest: Option<PredictionRecord>,
        count: usize,
    },
    ServerError(String),
}

impl RealtimePayload {
    /// Arrays whose first element has a truthy `error` field are application
    /// errors; other arrays are records and `null` means no records at all.
    /// Elements after the first are never inspected.
    pub fn interpret(payload: Value) -> Result<Self, FetchError> {
        match payload {
            Value::Null => Ok(Self::Records {
                latest: None,
                count: 0,
            }),
            Value::Array(mut items) => {
                if let Some(err) = items
                    .first()
                    .and_then(|first| first.get("error"))
                    .filter(|err| is_truthy(err))
                {
                    return Ok(Self::ServerError(display_value(err)));
                }
                let count = items.len();
                items.truncate(1);
                let latest = items.pop().map(serde_json::from_value).transpose()?;
                Ok(Self::Records { latest, count })
            }
            other => Err(FetchError::UnexpectedPayload(format!(
                "expected an array of prediction records, got {}",
                kind_of(&other)
            ))),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Runs refresh cycles against a [`PredictionSource`], allowing at most one in
/// flight per controller.
pub struct RefreshController<S> {
    source: S,
    in_flight: AtomicBool,
}

impl<S: PredictionSource> RefreshController<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// One full cycle. The trigger is disabled while the cycle runs and is
    /// restored on every exit path, including cancellation of this future.
    pub async fn refresh<V>(&self, view: &mut V) -> RefreshOutcome
    where
        V: DashboardView + Send + ?Sized,
    {
        let Some(_flight) = FlightGuard::acquire(&self.in_flight) else {
            debug!("refresh already in flight; ignoring trigger");
            return RefreshOutcome::Busy;
        };

        let mut view = TriggerGuard::engage(view);

        match self.run_cycle().await {
            Ok(RealtimePayload::Records { latest, count }) => {
                update_ui(&mut *view, latest.as_ref().map(std::slice::from_ref));
                info!(records = count, "dashboard refreshed");
                RefreshOutcome::Rendered { records: count }
            }
            Ok(RealtimePayload::ServerError(message)) => {
                view.notify(&format!("Server error: {message}"));
                RefreshOutcome::ServerReported(message)
            }
            Err(err) => {
                error!(error = %err, "failed to refresh dashboard");
                view.notify(&format!("Could not update: {err}"));
                RefreshOutcome::Failed(err.to_string())
            }
        }
    }

    async fn run_cycle(&self) -> Result<RealtimePayload, FetchError> {
        debug!("requesting prediction run");
        self.source.run_prediction().await?;
        debug!("fetching realtime record");
        let payload = self.source.fetch_realtime().await?;
        RealtimePayload::interpret(payload)
    }
}

struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Holds the trigger disabled with its busy label until dropped.
struct TriggerGuard<'a, V: DashboardView + ?Sized> {
    view: &'a mut V,
}

impl<'a, V: DashboardView + ?Sized> TriggerGuard<'a, V> {
    fn engage(view: &'a mut V) -> Self {
        view.set_disabled(ElementId::RefreshBtn, true);
        view.set_text(ElementId::RefreshBtn, TRIGGER_BUSY_LABEL);
        Self { view }
    }
}

impl<V: DashboardView + ?Sized> Deref for TriggerGuard<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        self.view
    }
}

impl<V: DashboardView + ?Sized> DerefMut for TriggerGuard<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        self.view
    }
}

impl<V: DashboardView + ?Sized> Drop for TriggerGuard<'_, V> {
    fn drop(&mut self) {
        self.view.set_disabled(ElementId::RefreshBtn, false);
        self.view.set_text(ElementId::RefreshBtn, TRIGGER_IDLE_LABEL);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
