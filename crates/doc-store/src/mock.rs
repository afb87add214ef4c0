//! # Mock Store & Testing Guide
//!
//! `MockStore<T>` implements [`DocumentStore<T>`](crate::DocumentStore) without any actor
//! behind it. Each call pops the next queued expectation and returns its canned response,
//! which makes failure injection trivial.
//!
//! ## When to use the Mock vs the Real Store
//!
//! | Feature | MockStore | StoreActor |
//! |---------|-----------|------------|
//! | **State** | None (canned responses) | Real documents |
//! | **Determinism** | 100% deterministic | Sequential per store |
//! | **Error Injection** | Easy (`return_err`) | Only `Unavailable`, by dropping the actor |
//! | **Use Case** | Error paths of callers | Behaviour under real data and races |
//!
//! ## Example
//!
//! ```rust
//! use doc_store::mock::MockStore;
//! use doc_store::{Document, DocumentStore, StoreError};
//!
//! #[derive(Clone, Debug, PartialEq)] struct Note { id: u32 }
//! #[derive(Debug, thiserror::Error)] #[error("note")] struct NoteError;
//! impl Document for Note {
//!     type Id = u32; type Create = (); type Filter = (); type Patch = ();
//!     type Error = NoteError;
//!     fn from_create_params(id: u32, _: ()) -> Result<Self, NoteError> { Ok(Self { id }) }
//!     fn id(&self) -> &u32 { &self.id }
//!     fn matches(&self, _: &()) -> bool { true }
//!     fn apply(&mut self, _: ()) -> Result<(), NoteError> { Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockStore::<Note>::new();
//!     mock.expect_find().return_err(StoreError::Unavailable);
//!
//!     let result = mock.find((), Some(25)).await;
//!     assert!(matches!(result, Err(StoreError::Unavailable)));
//!     mock.verify();
//! }
//! ```

use crate::{Document, DocumentStore, StoreError, UpdateOutcome};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A queued response, matched against the kind of the next call.
enum Expectation<T: Document> {
    Insert { response: Result<T, StoreError> },
    Get { response: Result<Option<T>, StoreError> },
    Find { response: Result<Vec<T>, StoreError> },
    Update { response: Result<UpdateOutcome, StoreError> },
}

impl<T: Document> Expectation<T> {
    fn kind(&self) -> &'static str {
        match self {
            Expectation::Insert { .. } => "insert",
            Expectation::Get { .. } => "get",
            Expectation::Find { .. } => "find",
            Expectation::Update { .. } => "update_one",
        }
    }
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A store double with expectation tracking.
///
/// Calls that arrive with no matching expectation return `StoreError::Unexpected` and are
/// remembered, so [`MockStore::verify`] fails the test even if the caller swallowed the
/// error.
pub struct MockStore<T: Document> {
    expectations: Queue<T>,
    mismatches: Arc<Mutex<Vec<String>>>,
}

impl<T: Document> Clone for MockStore<T> {
    fn clone(&self) -> Self {
        Self {
            expectations: self.expectations.clone(),
            mismatches: self.mismatches.clone(),
        }
    }
}

impl<T: Document> Default for MockStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Document> MockStore<T> {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        Self {
            expectations: Arc::new(Mutex::new(VecDeque::new())),
            mismatches: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn expect_insert(&mut self) -> ExpectationBuilder<T, T> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Insert {
            response,
        })
    }

    pub fn expect_get(&mut self) -> ExpectationBuilder<T, Option<T>> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Get {
            response,
        })
    }

    pub fn expect_find(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Find {
            response,
        })
    }

    pub fn expect_update(&mut self) -> ExpectationBuilder<T, UpdateOutcome> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Update {
            response,
        })
    }

    /// Verifies that every expectation was consumed and no unexpected call arrived.
    pub fn verify(&self) {
        let mismatches = self.mismatches.lock().unwrap();
        if !mismatches.is_empty() {
            panic!("Unexpected store calls: {:?}", *mismatches);
        }
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            let pending: Vec<&str> = exps.iter().map(Expectation::kind).collect();
            panic!("Not all expectations were met. Remaining: {:?}", pending);
        }
    }

    fn next(&self, call: &'static str) -> Option<Expectation<T>> {
        let mut exps = self.expectations.lock().unwrap();
        let matches_call = exps.front().map(|e| e.kind() == call).unwrap_or(false);
        if matches_call {
            return exps.pop_front();
        }
        let expected = exps.front().map(Expectation::kind).unwrap_or("nothing");
        drop(exps);
        self.mismatches
            .lock()
            .unwrap()
            .push(format!("got {call}, expected {expected}"));
        None
    }

    fn unexpected(call: &str) -> StoreError {
        StoreError::Unexpected(call.to_string())
    }
}

#[async_trait]
impl<T: Document> DocumentStore<T> for MockStore<T> {
    async fn insert(&self, _params: T::Create) -> Result<T, StoreError> {
        match self.next("insert") {
            Some(Expectation::Insert { response }) => response,
            _ => Err(Self::unexpected("insert")),
        }
    }

    async fn get(&self, _id: T::Id) -> Result<Option<T>, StoreError> {
        match self.next("get") {
            Some(Expectation::Get { response }) => response,
            _ => Err(Self::unexpected("get")),
        }
    }

    async fn find(&self, _filter: T::Filter, _limit: Option<usize>) -> Result<Vec<T>, StoreError> {
        match self.next("find") {
            Some(Expectation::Find { response }) => response,
            _ => Err(Self::unexpected("find")),
        }
    }

    async fn update_one(
        &self,
        _filter: T::Filter,
        _patch: T::Patch,
    ) -> Result<UpdateOutcome, StoreError> {
        match self.next("update_one") {
            Some(Expectation::Update { response }) => response,
            _ => Err(Self::unexpected("update_one")),
        }
    }
}

/// Builder that queues one expectation returning `R`.
pub struct ExpectationBuilder<T: Document, R> {
    expectations: Queue<T>,
    wrap: fn(Result<R, StoreError>) -> Expectation<T>,
}

impl<T: Document, R> ExpectationBuilder<T, R> {
    fn new(expectations: Queue<T>, wrap: fn(Result<R, StoreError>) -> Expectation<T>) -> Self {
        Self { expectations, wrap }
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back((self.wrap)(Ok(value)));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back((self.wrap)(Err(error)));
    }
}
