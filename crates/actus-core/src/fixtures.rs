//! Test fixtures for Actus development and testing.
//!
//! Small helpers used across the workspace's tests: call counters, an
//! execution-order log, and ready-made schemas that accept or reject
//! everything.
//!
//! # Example
//!
//! ```
//! use actus_core::fixtures::CallCounter;
//!
//! let counter = CallCounter::new();
//! let handle = counter.clone();
//! handle.hit();
//! assert_eq!(counter.count(), 1);
//! ```

use crate::issue::{Issue, PathSegment};
use crate::schema::{schema_fn, Schema, ValidationOutcome};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared counter for asserting how often a step or handler ran.
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    hits: Arc<AtomicUsize>,
}

impl CallCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one call.
    pub fn hit(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Shared log of labels, for asserting execution order.
#[derive(Debug, Clone, Default)]
pub struct OrderLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl OrderLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a label.
    pub fn push(&self, label: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(label.into());
    }

    /// Snapshot of the labels recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

/// A `Required` issue at the given path.
#[must_use]
pub fn required_at<I, S>(path: I) -> Issue
where
    I: IntoIterator<Item = S>,
    S: Into<PathSegment>,
{
    Issue::at("Required", path)
}

/// A schema that accepts any value of type `T` unchanged.
#[must_use]
pub fn accept_all<T: Send + 'static>() -> impl Schema<Input = T, Output = T> {
    schema_fn(|value: T| ValidationOutcome::Valid(value))
}

/// A schema that rejects every value with the given issues.
#[must_use]
pub fn reject_all<T: Send + 'static>(issues: Vec<Issue>) -> impl Schema<Input = T, Output = T> {
    schema_fn(move |_: T| ValidationOutcome::<T>::Invalid(issues.clone()))
}
