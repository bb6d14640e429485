//! Call journal and fault injection shared by the in-memory services.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use plinth_services::ServiceError;

/// How an operation should misbehave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
  /// Return a [`ServiceError`].
  Error,
  /// Panic inside the call.
  Panic,
  /// Succeed but report `false` (validation and removal operations only).
  Falsy,
}

/// Faults keyed by operation name, e.g. `"vector.create_collection"`.
#[derive(Debug, Clone, Default)]
pub struct Faults {
  inner: Arc<Mutex<HashMap<String, Fault>>>,
}

impl Faults {
  pub fn set(&self, op: &str, fault: Fault) {
    if let Ok(mut faults) = self.inner.lock() {
      faults.insert(op.to_string(), fault);
    }
  }

  pub fn clear(&self, op: &str) {
    if let Ok(mut faults) = self.inner.lock() {
      faults.remove(op);
    }
  }

  pub fn get(&self, op: &str) -> Option<Fault> {
    self.inner.lock().ok().and_then(|faults| faults.get(op).copied())
  }

  /// Apply the fault configured for `op`, if any.
  ///
  /// Returns `Ok(true)` when the call should report `false`.
  pub(crate) fn apply(&self, op: &str) -> Result<bool, ServiceError> {
    match self.get(op) {
      None => Ok(false),
      Some(Fault::Falsy) => Ok(true),
      Some(Fault::Error) => Err(ServiceError::Unavailable(format!("injected failure in {}", op))),
      Some(Fault::Panic) => panic!("injected panic in {}", op),
    }
  }
}

/// Ordered record of every collaborator call.
#[derive(Debug, Clone, Default)]
pub struct Journal {
  calls: Arc<Mutex<Vec<String>>>,
}

impl Journal {
  pub(crate) fn record(&self, op: &str) {
    if let Ok(mut calls) = self.calls.lock() {
      calls.push(op.to_string());
    }
  }

  /// All calls so far, in order.
  pub fn calls(&self) -> Vec<String> {
    self
      .calls
      .lock()
      .map(|calls| calls.clone())
      .unwrap_or_default()
  }

  /// Calls belonging to one service, e.g. `"vector"`.
  pub fn calls_to(&self, service: &str) -> Vec<String> {
    let prefix = format!("{}.", service);
    self
      .calls()
      .into_iter()
      .filter(|call| call.starts_with(&prefix))
      .collect()
  }

  pub fn contains(&self, op: &str) -> bool {
    self.calls().iter().any(|call| call == op)
  }

  pub fn count(&self, op: &str) -> usize {
    self.calls().iter().filter(|call| *call == op).count()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_apply_maps_faults() {
    let faults = Faults::default();
    assert!(!faults.apply("schema.validate").unwrap());

    faults.set("schema.validate", Fault::Falsy);
    assert!(faults.apply("schema.validate").unwrap());

    faults.set("schema.validate", Fault::Error);
    assert!(faults.apply("schema.validate").is_err());

    faults.clear("schema.validate");
    assert_eq!(faults.get("schema.validate"), None);
  }

  #[test]
  fn test_journal_filters_by_service() {
    let journal = Journal::default();
    journal.record("schema.create_schema");
    journal.record("vector.create_collection");
    journal.record("schema.store_metadata");

    assert_eq!(
      journal.calls_to("schema"),
      vec!["schema.create_schema", "schema.store_metadata"]
    );
    assert_eq!(journal.count("vector.create_collection"), 1);
  }
}
