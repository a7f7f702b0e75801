//! Usage classification of columns and measures.
//!
//! An input is `Used` when a real consumer (a report object, a relationship
//! or a calculated table) can be reached by following dependents,
//! `UsedByUnused` when it has dependents but none of them lead to a real
//! consumer, and `Unused` when nothing depends on it at all.
//!
//! Traversal keeps a visited set, so dependency cycles terminate: an input
//! met again during one classification adds nothing beyond `UsedByUnused`.

use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use crate::model::DataInput;

use super::semantic_model::SemanticModel;

/// Usage of a data input, ordered `Unused < UsedByUnused < Used`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum UsageState {
    Unused,
    UsedByUnused,
    Used,
}

impl UsageState {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageState::Unused => "Unused",
            UsageState::UsedByUnused => "UsedByUnused",
            UsageState::Used => "Used",
        }
    }
}

impl fmt::Display for UsageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify one input against the current graph.
pub fn usage_state(model: &SemanticModel, input: DataInput) -> UsageState {
    let graph = model.graph();
    if !graph.has_dependents(input) {
        return UsageState::Unused;
    }

    let mut visited = HashSet::from([input]);
    let mut queue = VecDeque::from([input]);

    while let Some(current) = queue.pop_front() {
        for dependent in graph.dependents(current) {
            if dependent.is_real_use() {
                return UsageState::Used;
            }
            if let Some(next) = dependent.as_data_input() {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }

    UsageState::UsedByUnused
}

/// Classify every column and measure of `model`, columns first.
pub fn classify_all(model: &SemanticModel) -> Vec<(DataInput, UsageState)> {
    let mut classifier = UsageClassifier::new(model);
    classifier.classify_all()
}

/// Caching classifier for a finished graph.
///
/// Results are memoized, so the graph must not gain edges while a
/// classifier borrows the model (the borrow checker enforces this).
pub struct UsageClassifier<'m> {
    model: &'m SemanticModel,
    cache: HashMap<DataInput, UsageState>,
}

impl<'m> UsageClassifier<'m> {
    pub fn new(model: &'m SemanticModel) -> Self {
        Self {
            model,
            cache: HashMap::new(),
        }
    }

    pub fn state(&mut self, input: DataInput) -> UsageState {
        if let Some(&state) = self.cache.get(&input) {
            return state;
        }
        let state = usage_state(self.model, input);
        self.cache.insert(input, state);
        state
    }

    /// Classify every input in one pass over the graph.
    ///
    /// Inputs with a direct real consumer are seeds; every input upstream of
    /// a seed is `Used` too. The rest are split on whether they have any
    /// dependents.
    pub fn classify_all(&mut self) -> Vec<(DataInput, UsageState)> {
        let graph = self.model.graph();

        let mut used: HashSet<DataInput> = HashSet::new();
        let mut queue: VecDeque<DataInput> = self
            .model
            .data_inputs()
            .filter(|&input| graph.dependents(input).iter().any(|d| d.is_real_use()))
            .collect();
        used.extend(queue.iter().copied());

        while let Some(current) = queue.pop_front() {
            for upstream in graph.inputs_of(current.into()) {
                if used.insert(upstream) {
                    queue.push_back(upstream);
                }
            }
        }

        let states: Vec<(DataInput, UsageState)> = self
            .model
            .data_inputs()
            .map(|input| {
                let state = if used.contains(&input) {
                    UsageState::Used
                } else if graph.has_dependents(input) {
                    UsageState::UsedByUnused
                } else {
                    UsageState::Unused
                };
                (input, state)
            })
            .collect();

        self.cache.extend(states.iter().copied());
        states
    }
}
