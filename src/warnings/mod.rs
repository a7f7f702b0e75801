//! Run-scoped publication of analysis warnings.
//!
//! Linking a report against a model never fails on an unresolved column or
//! measure reference. The reference is dropped and a warning is published
//! on the [`WarningBus`] passed to the loader instead.
//!
//! Subscribers register per capability:
//!
//! - [`AnalysisWarningSubscriber`] receives every warning
//! - [`MissingMeasureSubscriber`] receives missing-measure warnings
//! - [`MissingColumnSubscriber`] receives missing-column warnings
//!
//! For a missing-measure or missing-column warning, generic subscribers are
//! notified first, then the kind-specific ones, each list in registration
//! order. A warning published from inside a subscriber callback is queued
//! and delivered once the current warning has reached every subscriber, so
//! delivery always follows publish order.

use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::warn;

use crate::semantic::GraphNode;

/// The report object whose reference could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarningSender {
    pub node: GraphNode,
    /// Display name ("Sales by Region", "Page Filter '3'").
    pub name: String,
    /// Full description including its page and report.
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingColumnWarning {
    pub column: String,
    pub table: String,
    pub sender: WarningSender,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingMeasureWarning {
    pub measure: String,
    pub table: String,
    pub sender: WarningSender,
}

/// Any warning published during an analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    MissingColumn(MissingColumnWarning),
    MissingMeasure(MissingMeasureWarning),
    Generic { message: String },
}

impl AnalysisWarning {
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn sender(&self) -> Option<&WarningSender> {
        match self {
            AnalysisWarning::MissingColumn(w) => Some(&w.sender),
            AnalysisWarning::MissingMeasure(w) => Some(&w.sender),
            AnalysisWarning::Generic { .. } => None,
        }
    }
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisWarning::MissingColumn(w) => write!(
                f,
                "The column {} from table {} used in {} doesn't exist in semantic model.",
                w.column, w.table, w.sender.name
            ),
            AnalysisWarning::MissingMeasure(w) => write!(
                f,
                "The measure {} from table {} used in {} doesn't exist in semantic model.",
                w.measure, w.table, w.sender.name
            ),
            AnalysisWarning::Generic { message } => f.write_str(message),
        }
    }
}

impl From<MissingColumnWarning> for AnalysisWarning {
    fn from(w: MissingColumnWarning) -> Self {
        AnalysisWarning::MissingColumn(w)
    }
}

impl From<MissingMeasureWarning> for AnalysisWarning {
    fn from(w: MissingMeasureWarning) -> Self {
        AnalysisWarning::MissingMeasure(w)
    }
}

// ============================================================================
// Subscribers
// ============================================================================

pub trait AnalysisWarningSubscriber: Send + Sync {
    fn on_warning(&self, warning: &AnalysisWarning);
}

pub trait MissingMeasureSubscriber: Send + Sync {
    fn on_missing_measure(&self, warning: &MissingMeasureWarning);
}

pub trait MissingColumnSubscriber: Send + Sync {
    fn on_missing_column(&self, warning: &MissingColumnWarning);
}

/// Emits every warning as a `tracing` warn event.
#[derive(Debug, Default)]
pub struct LogSubscriber;

impl AnalysisWarningSubscriber for LogSubscriber {
    fn on_warning(&self, warning: &AnalysisWarning) {
        match warning.sender() {
            Some(sender) => warn!(sender = %sender.description, "{}", warning),
            None => warn!("{}", warning),
        }
    }
}

/// Stores every warning it receives.
#[derive(Debug, Default)]
pub struct CollectingSubscriber {
    received: Mutex<Vec<AnalysisWarning>>,
}

impl CollectingSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<AnalysisWarning> {
        lock(&self.received).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.received).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AnalysisWarningSubscriber for CollectingSubscriber {
    fn on_warning(&self, warning: &AnalysisWarning) {
        lock(&self.received).push(warning.clone());
    }
}

impl MissingMeasureSubscriber for CollectingSubscriber {
    fn on_missing_measure(&self, warning: &MissingMeasureWarning) {
        lock(&self.received).push(warning.clone().into());
    }
}

impl MissingColumnSubscriber for CollectingSubscriber {
    fn on_missing_column(&self, warning: &MissingColumnWarning) {
        lock(&self.received).push(warning.clone().into());
    }
}

// ============================================================================
// Bus
// ============================================================================

#[derive(Default)]
struct BusState {
    history: Vec<AnalysisWarning>,
    pending: VecDeque<AnalysisWarning>,
    dispatching: bool,
    generic: Vec<Arc<dyn AnalysisWarningSubscriber>>,
    missing_measure: Vec<Arc<dyn MissingMeasureSubscriber>>,
    missing_column: Vec<Arc<dyn MissingColumnSubscriber>>,
}

/// Subscriber lists copied out of the lock for one delivery.
struct Subscribers {
    generic: Vec<Arc<dyn AnalysisWarningSubscriber>>,
    missing_measure: Vec<Arc<dyn MissingMeasureSubscriber>>,
    missing_column: Vec<Arc<dyn MissingColumnSubscriber>>,
}

impl Subscribers {
    fn deliver(&self, warning: &AnalysisWarning) {
        for subscriber in &self.generic {
            subscriber.on_warning(warning);
        }
        match warning {
            AnalysisWarning::MissingMeasure(w) => {
                for subscriber in &self.missing_measure {
                    subscriber.on_missing_measure(w);
                }
            }
            AnalysisWarning::MissingColumn(w) => {
                for subscriber in &self.missing_column {
                    subscriber.on_missing_column(w);
                }
            }
            AnalysisWarning::Generic { .. } => {}
        }
    }
}

/// Resets the dispatch state when a subscriber panics mid-delivery.
struct DispatchGuard<'a>(&'a Mutex<BusState>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut state = lock(self.0);
            state.dispatching = false;
            state.pending.clear();
        }
    }
}

/// Broadcasts warnings to subscribers and keeps their history.
#[derive(Default)]
pub struct WarningBus {
    state: Mutex<BusState>,
}

impl fmt::Debug for WarningBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("WarningBus")
            .field("warnings", &state.history.len())
            .field("subscribers", &state.generic.len())
            .field("missing_measure_subscribers", &state.missing_measure.len())
            .field("missing_column_subscribers", &state.missing_column.len())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn same_instance<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

fn push_unique<T: ?Sized>(list: &mut Vec<Arc<T>>, subscriber: Arc<T>) -> bool {
    if list.iter().any(|s| same_instance(s, &subscriber)) {
        return false;
    }
    list.push(subscriber);
    true
}

impl WarningBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every warning. Returns false if already subscribed.
    pub fn subscribe(&self, subscriber: Arc<dyn AnalysisWarningSubscriber>) -> bool {
        push_unique(&mut lock(&self.state).generic, subscriber)
    }

    pub fn subscribe_missing_measure(&self, subscriber: Arc<dyn MissingMeasureSubscriber>) -> bool {
        push_unique(&mut lock(&self.state).missing_measure, subscriber)
    }

    pub fn subscribe_missing_column(&self, subscriber: Arc<dyn MissingColumnSubscriber>) -> bool {
        push_unique(&mut lock(&self.state).missing_column, subscriber)
    }

    /// Record `warning` and notify subscribers synchronously.
    ///
    /// If another warning is being dispatched (a subscriber publishing from
    /// its callback, or another thread), `warning` is queued and delivered by
    /// that dispatch once everything published before it has been delivered.
    pub fn publish(&self, warning: impl Into<AnalysisWarning>) {
        let warning = warning.into();
        {
            let mut state = lock(&self.state);
            state.history.push(warning.clone());
            state.pending.push_back(warning);
            if state.dispatching {
                return;
            }
            state.dispatching = true;
        }

        let _guard = DispatchGuard(&self.state);
        // Dispatch outside the lock so subscribers may publish or subscribe.
        while let Some((warning, subscribers)) = self.next_pending() {
            subscribers.deliver(&warning);
        }
    }

    fn next_pending(&self) -> Option<(AnalysisWarning, Subscribers)> {
        let mut state = lock(&self.state);
        let Some(warning) = state.pending.pop_front() else {
            state.dispatching = false;
            return None;
        };
        let subscribers = Subscribers {
            generic: state.generic.clone(),
            missing_measure: state.missing_measure.clone(),
            missing_column: state.missing_column.clone(),
        };
        Some((warning, subscribers))
    }

    pub fn publish_message(&self, message: impl Into<String>) {
        self.publish(AnalysisWarning::Generic {
            message: message.into(),
        });
    }

    /// Every warning published so far, in order.
    pub fn warnings(&self) -> Vec<AnalysisWarning> {
        lock(&self.state).history.clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
