//! Routing-key extraction.
//!
//! Requests may carry an affinity key (a user id, a session id, ...). When
//! they do, all requests with that key reach the same backend. When they do
//! not, a random key spreads them evenly instead of piling them onto the
//! backend that owns the empty string.

use std::collections::{BTreeMap, HashMap};

use rand::distr::Alphanumeric;
use rand::Rng;

use crate::config::DEFAULT_METADATA_KEY;

/// Random alphanumeric key of `len` characters.
pub fn random_key(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Pulls a routing key out of a request.
///
/// Any `Fn(&R) -> Option<String>` is an extractor.
pub trait KeyExtractor<R: ?Sized> {
    fn extract(&self, request: &R) -> Option<String>;
}

impl<R: ?Sized, F> KeyExtractor<R> for F
where
    F: Fn(&R) -> Option<String>,
{
    fn extract(&self, request: &R) -> Option<String> {
        self(request)
    }
}

/// String-keyed request metadata (headers, RPC metadata, ...).
pub trait Metadata {
    fn get_value(&self, key: &str) -> Option<&str>;
}

impl Metadata for HashMap<String, String> {
    fn get_value(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl Metadata for BTreeMap<String, String> {
    fn get_value(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl Metadata for [(String, String)] {
    fn get_value(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

/// Reads the routing key from one named metadata entry.
///
/// Empty values count as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataKey {
    field: String,
}

impl MetadataKey {
    pub fn new(field: impl Into<String>) -> Self {
        Self { field: field.into() }
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl Default for MetadataKey {
    fn default() -> Self {
        Self::new(DEFAULT_METADATA_KEY)
    }
}

impl<M: Metadata + ?Sized> KeyExtractor<M> for MetadataKey {
    fn extract(&self, request: &M) -> Option<String> {
        request
            .get_value(&self.field)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}
