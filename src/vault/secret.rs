//! Secret values and path selectors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, SafeError};

/// Key/value data stored at one path.
///
/// Values are always strings; non-string JSON values returned by the
/// backend are kept as their JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret {
    data: BTreeMap<String, String>,
}

impl Secret {
    /// Create an empty secret
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a secret from the `data` object of a backend response.
    ///
    /// With `key` set, only that key is retained.
    pub fn from_data(data: &Map<String, Value>, key: Option<&str>) -> Result<Self> {
        let mut secret = Self::new();
        for (k, v) in data {
            if key.is_some_and(|wanted| wanted != k) {
                continue;
            }
            let value = match v {
                Value::String(s) => s.clone(),
                other => serde_json::to_string(other)?,
            };
            secret.data.insert(k.clone(), value);
        }
        Ok(secret)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.data.insert(key.into(), value.into());
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn delete(&mut self, key: &str) -> Option<String> {
        self.data.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// JSON request body for a write; empty secrets are refused
    pub fn to_json(&self) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Err(SafeError::NothingToWrite);
        }
        Ok(serde_json::to_vec(&self.data)?)
    }

    /// YAML rendering for display
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.data)?)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Secret {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { data: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// A path with an optional `:key` selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretPath<'a> {
    pub path: &'a str,
    pub key: Option<&'a str>,
}

impl<'a> SecretPath<'a> {
    /// Split `secret/db:password` into path and key; the last colon wins
    pub fn parse(raw: &'a str) -> Self {
        match raw.rsplit_once(':') {
            Some((path, key)) => Self { path, key: Some(key) },
            None => Self { path: raw, key: None },
        }
    }
}
