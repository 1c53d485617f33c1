use std::sync::Weak;

use crate::call::CallId;
use crate::error::MockError;
use crate::mocker::{self, Registry};
use crate::value::Value;

/// Returned by registration; addresses exactly one expectation.
///
/// Holds only the method name, the expectation id and a weak reference to the
/// store, so it stays valid while the store is mutated concurrently and never
/// keeps a dropped store alive.
#[derive(Debug, Clone)]
pub struct CallHandle {
    method: String,
    id: CallId,
    registry: Weak<Registry>,
}

impl CallHandle {
    pub(crate) fn new(method: &str, id: CallId, registry: Weak<Registry>) -> Self {
        Self {
            method: method.to_owned(),
            id,
            registry,
        }
    }

    pub fn id(&self) -> CallId {
        self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Remove this expectation from the store.
    pub fn delete(&self) {
        if let Some(registry) = self.registry.upgrade() {
            mocker::remove_call(&registry, &self.method, self.id);
        }
    }

    /// Times this expectation was selected. Zero once it has been deleted or reset.
    pub fn times_called(&self) -> usize {
        self.registry
            .upgrade()
            .and_then(|registry| mocker::find_call(&registry, &self.method, self.id))
            .map_or(0, |call| call.times_called())
    }

    /// Return values produced by the latest dispatch of this expectation.
    pub fn last_returns(&self) -> Option<Vec<Value>> {
        let registry = self.registry.upgrade()?;
        mocker::find_call(&registry, &self.method, self.id)?.last_returns()
    }

    /// Check the expected call count set at registration, if any.
    pub fn assert_expectation(&self) -> Result<(), MockError> {
        let Some(registry) = self.registry.upgrade() else {
            return Ok(());
        };
        let Some(call) = mocker::find_call(&registry, &self.method, self.id) else {
            return Ok(());
        };
        match mocker::unmet_expectation(&self.method, &call) {
            Some(unmet) => Err(MockError::UnmetExpectations(vec![unmet])),
            None => Ok(()),
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registry
            .upgrade()
            .and_then(|registry| mocker::find_call(&registry, &self.method, self.id))
            .is_some()
    }
}
