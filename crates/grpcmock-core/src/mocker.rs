//! The expectation store.
//!
//! Two-level locking: the store-wide `RwLock` guards which expectations exist
//! per method, each expectation's own mutex guards its call-tracking state.
//! Resolution scans under the shared lock; registration, deletion and reset
//! take it exclusively.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::call::{CallId, CallOptions, ExpectedCall, Returns};
use crate::error::{MockError, UnmetExpectation};
use crate::handle::CallHandle;
use crate::matcher::Arg;
use crate::value::Value;

#[derive(Debug, Default)]
pub(crate) struct MethodState {
    /// Insertion order is match priority.
    calls: Vec<Arc<ExpectedCall>>,
    default: Option<Arc<ExpectedCall>>,
    call_count: AtomicUsize,
}

impl MethodState {
    fn clear(&mut self) {
        self.calls.clear();
        self.default = None;
        self.call_count.store(0, Ordering::SeqCst);
    }

    /// First expectation whose arguments all match, else the default.
    fn select(&self, method: &str, args: &[Value]) -> Result<Option<Arc<ExpectedCall>>, MockError> {
        for call in &self.calls {
            if call.arity() != args.len() {
                return Err(MockError::ArityMismatch {
                    method: method.to_owned(),
                    expected: call.arity(),
                    got: args.len(),
                });
            }
            if call.matches(args) {
                return Ok(Some(Arc::clone(call)));
            }
        }
        Ok(self.default.clone())
    }
}

pub(crate) type Registry = RwLock<HashMap<String, MethodState>>;

/// Result of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub returns: Vec<Value>,
    pub id: CallId,
    /// Whether the method's default record was selected.
    pub is_default: bool,
}

/// Shared expectation store. Cloning yields another handle to the same store.
#[derive(Debug, Clone, Default)]
pub struct Mocker {
    registry: Arc<Registry>,
}

impl Mocker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an expectation for `method`. Earlier registrations win.
    pub fn add_expected_call(
        &self,
        method: &str,
        args: Vec<Arg>,
        returns: Vec<Value>,
    ) -> CallHandle {
        self.add_call(method, args, Returns::Static(returns), CallOptions::default())
    }

    pub fn add_expected_call_with_generator<F>(
        &self,
        method: &str,
        args: Vec<Arg>,
        generator: F,
    ) -> CallHandle
    where
        F: Fn() -> Vec<Value> + Send + Sync + 'static,
    {
        self.add_call(method, args, Returns::generator(generator), CallOptions::default())
    }

    /// General form of the registration operations.
    pub fn add_call(
        &self,
        method: &str,
        args: Vec<Arg>,
        returns: Returns,
        options: CallOptions,
    ) -> CallHandle {
        let call = Arc::new(ExpectedCall::new(args, returns, options));
        let id = call.id();
        let arity = call.arity();
        self.write()
            .entry(method.to_owned())
            .or_default()
            .calls
            .push(call);
        debug!(method, call_id = %id, arity, "expected call added");
        CallHandle::new(method, id, Arc::downgrade(&self.registry))
    }

    /// Replace the default record of `method`.
    pub fn set_default_call(&self, method: &str, returns: Vec<Value>) {
        self.set_default(method, Returns::Static(returns));
    }

    pub fn set_default_call_with_generator<F>(&self, method: &str, generator: F)
    where
        F: Fn() -> Vec<Value> + Send + Sync + 'static,
    {
        self.set_default(method, Returns::generator(generator));
    }

    pub fn set_default(&self, method: &str, returns: Returns) {
        let call = Arc::new(ExpectedCall::new_default(returns));
        self.write().entry(method.to_owned()).or_default().default = Some(call);
        debug!(method, "default call set");
    }

    pub fn unset_default_call(&self, method: &str) {
        if let Some(state) = self.write().get_mut(method) {
            state.default = None;
        }
        debug!(method, "default call unset");
    }

    /// Resolve a call to its return values.
    pub fn resolve(&self, method: &str, args: &[Value]) -> Result<Vec<Value>, MockError> {
        self.dispatch(method, args).map(|d| d.returns)
    }

    /// Resolve a call and report which record served it.
    ///
    /// An expectation declaring a different number of arguments than supplied
    /// aborts the scan with [`MockError::ArityMismatch`], even if a later
    /// expectation would match. Nothing is counted on failure.
    pub fn dispatch(&self, method: &str, args: &[Value]) -> Result<Dispatch, MockError> {
        let selected = {
            let registry = self.read();
            let no_match = || MockError::NoMatchingCall {
                method: method.to_owned(),
            };
            let state = registry.get(method).ok_or_else(no_match)?;
            let call = state.select(method, args)?.ok_or_else(no_match)?;
            state.call_count.fetch_add(1, Ordering::SeqCst);
            call
        };

        // Store lock released: generators may touch the store.
        let returns = selected.record_call();
        debug!(
            method,
            call_id = %selected.id(),
            is_default = selected.is_default(),
            "call resolved"
        );
        Ok(Dispatch {
            returns,
            id: selected.id(),
            is_default: selected.is_default(),
        })
    }

    /// Remove one expectation by id. No-op if it is already gone.
    pub fn delete_call(&self, method: &str, id: CallId) {
        remove_call(&self.registry, method, id);
    }

    /// Clear a method's expectations, default and call counter.
    pub fn reset_call(&self, method: &str) {
        if let Some(state) = self.write().get_mut(method) {
            state.clear();
        }
        debug!(method, "method reset");
    }

    pub fn reset_all(&self) {
        self.write().clear();
        debug!("all methods reset");
    }

    /// Selections of `method` since the last reset, default included.
    pub fn get_call_count(&self, method: &str) -> usize {
        self.read()
            .get(method)
            .map_or(0, |state| state.call_count.load(Ordering::SeqCst))
    }

    /// Methods with at least one registered expectation or default.
    pub fn methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self
            .read()
            .iter()
            .filter(|(_, state)| !state.calls.is_empty() || state.default.is_some())
            .map(|(method, _)| method.clone())
            .collect();
        methods.sort();
        methods
    }

    /// Check every expectation registered with an expected call count.
    pub fn assert_expectations(&self) -> Result<(), MockError> {
        let registry = self.read();
        let mut unmet: Vec<UnmetExpectation> = registry
            .iter()
            .flat_map(|(method, state)| {
                state
                    .calls
                    .iter()
                    .filter_map(move |call| unmet_expectation(method, call))
            })
            .collect();
        if unmet.is_empty() {
            return Ok(());
        }
        unmet.sort_by(|a, b| a.method.cmp(&b.method));
        Err(MockError::UnmetExpectations(unmet))
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, MethodState>> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, MethodState>> {
        write_registry(&self.registry)
    }
}

fn write_registry(registry: &Registry) -> RwLockWriteGuard<'_, HashMap<String, MethodState>> {
    registry.write().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn remove_call(registry: &Registry, method: &str, id: CallId) {
    let mut registry = write_registry(registry);
    let Some(state) = registry.get_mut(method) else {
        return;
    };
    if let Some(index) = state.calls.iter().position(|call| call.id() == id) {
        state.calls.remove(index);
        debug!(method, call_id = %id, "expected call deleted");
    }
}

pub(crate) fn find_call(registry: &Registry, method: &str, id: CallId) -> Option<Arc<ExpectedCall>> {
    registry
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(method)?
        .calls
        .iter()
        .find(|call| call.id() == id)
        .cloned()
}

pub(crate) fn unmet_expectation(method: &str, call: &ExpectedCall) -> Option<UnmetExpectation> {
    let expected = call.expected_times().filter(|n| *n > 0)?;
    let actual = call.times_called();
    (expected != actual).then(|| UnmetExpectation {
        method: method.to_owned(),
        id: call.id(),
        expected,
        actual,
    })
}
