//! Layered text asset store
//!
//! # Core Concepts
//!
//! - **Layer**: a named set of records (base defaults, a recension, an
//!   external override directory)
//! - **Precedence**: layers are merged in the order they are added; a later
//!   layer overwrites any key an earlier one defined
//! - **Flat alias**: a key with three or more dot segments is also reachable
//!   as `first.last`, unless a real record already uses that key. When two
//!   keys share an alias, the one merged first keeps it.
//!
//! The store is built once and only read afterwards.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{AssetError, AssetResult};
use crate::record::{TextRecord, UnresolvedReference};

/// Named set of records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetLayer {
    name: String,
    records: IndexMap<String, TextRecord>,
}

impl AssetLayer {
    /// Empty layer
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: IndexMap::new(),
        }
    }

    /// Add a record
    #[must_use]
    pub fn with_record(mut self, key: impl Into<String>, record: TextRecord) -> Self {
        self.insert(key, record);
        self
    }

    /// Add or replace a record, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, record: TextRecord) -> Option<TextRecord> {
        self.records.insert(key.into(), record)
    }

    /// Parse a JSON document
    ///
    /// # Errors
    ///
    /// [`AssetError::Parse`] or [`AssetError::InvalidShape`].
    pub fn from_json_str(name: impl Into<String>, json: &str) -> AssetResult<Self> {
        let name = name.into();
        let value: Value =
            serde_json::from_str(json).map_err(|e| AssetError::parse_error(&name, e))?;
        Self::from_value(name, value)
    }

    /// Build a layer from a parsed document
    ///
    /// The document is either one asset (`{"id": .., "content": ..}`) or a
    /// map of key to record. A bare string stands for a record with only a
    /// body.
    ///
    /// # Errors
    ///
    /// [`AssetError::InvalidShape`] when a value is neither a string nor a
    /// record, [`AssetError::Parse`] when a record is missing its body.
    pub fn from_value(name: impl Into<String>, value: Value) -> AssetResult<Self> {
        let name = name.into();
        let mut layer = Self::new(name.clone());
        layer.merge_value(value, &name)?;
        Ok(layer)
    }

    /// Merge a parsed document into this layer
    ///
    /// # Errors
    ///
    /// As [`AssetLayer::from_value`]; `origin` names the document in errors.
    pub fn merge_value(&mut self, value: Value, origin: &str) -> AssetResult<usize> {
        let Value::Object(mut map) = value else {
            return Err(AssetError::invalid_shape(origin, "<root>"));
        };

        if let Some(Value::String(id)) = map.get("id").cloned() {
            if map.contains_key("content") || map.contains_key("body") {
                map.remove("id");
                let record = parse_record(&id, Value::Object(map), origin)?;
                self.insert(id, record);
                return Ok(1);
            }
        }

        let mut count = 0;
        for (key, value) in map {
            let record = parse_record(&key, value, origin)?;
            if self.insert(key.clone(), record).is_some() {
                debug!(layer = %self.name, key = %key, origin, "record redefined within layer");
            }
            count += 1;
        }
        Ok(count)
    }

    /// Layer name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record by exact key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TextRecord> {
        self.records.get(key)
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the layer is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_record(key: &str, value: Value, origin: &str) -> AssetResult<TextRecord> {
    match value {
        Value::String(body) => Ok(TextRecord::new(body)),
        Value::Object(_) => serde_json::from_value(value)
            .map_err(|e| AssetError::parse_error(origin, format!("{key}: {e}"))),
        _ => Err(AssetError::invalid_shape(origin, key)),
    }
}

/// Builder merging layers in precedence order
#[derive(Debug, Clone, Default)]
pub struct AssetStoreBuilder {
    layers: Vec<AssetLayer>,
}

impl AssetStoreBuilder {
    /// Create builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the next layer; it overrides every layer added before it
    #[must_use]
    pub fn layer(mut self, layer: AssetLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Add the next layer in place
    pub fn push(&mut self, layer: AssetLayer) {
        self.layers.push(layer);
    }

    /// Merge all layers
    #[must_use]
    pub fn build(self) -> TextAssetStore {
        let mut records = IndexMap::new();
        let mut layer_names = Vec::with_capacity(self.layers.len());

        for layer in self.layers {
            let mut overwritten = 0usize;
            let added = layer.records.len();
            for (key, record) in layer.records {
                if records.insert(key, record).is_some() {
                    overwritten += 1;
                }
            }
            info!(layer = %layer.name, added, overwritten, "asset layer merged");
            layer_names.push(layer.name);
        }

        let mut aliases = HashMap::new();
        for key in records.keys() {
            let Some(alias) = flat_alias(key) else {
                continue;
            };
            if !records.contains_key(&alias) {
                aliases.entry(alias).or_insert_with(|| key.clone());
            }
        }
        debug!(records = records.len(), aliases = aliases.len(), "asset store built");

        TextAssetStore {
            records,
            aliases,
            layers: layer_names,
        }
    }
}

/// `first.last` for keys with at least three segments
fn flat_alias(key: &str) -> Option<String> {
    let mut segments = key.split('.');
    let first = segments.next()?;
    let rest: Vec<&str> = segments.collect();
    if rest.len() < 2 {
        return None;
    }
    rest.last().map(|last| format!("{first}.{last}"))
}

/// Read-only merged asset store
#[derive(Debug, Clone, Default)]
pub struct TextAssetStore {
    records: IndexMap<String, TextRecord>,
    aliases: HashMap<String, String>,
    layers: Vec<String>,
}

impl TextAssetStore {
    /// Start a layered build
    #[inline]
    #[must_use]
    pub fn builder() -> AssetStoreBuilder {
        AssetStoreBuilder::new()
    }

    /// Record by key, falling back to the flat alias
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TextRecord> {
        self.records.get(key).or_else(|| {
            self.aliases
                .get(key)
                .and_then(|full| self.records.get(full))
        })
    }

    /// Whether a key (or alias) resolves
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Record by key, or the reference that could not be satisfied
    ///
    /// # Errors
    ///
    /// [`UnresolvedReference`] naming `key` and `required_by`.
    pub fn lookup(&self, key: &str, required_by: &str) -> Result<&TextRecord, UnresolvedReference> {
        self.get(key)
            .ok_or_else(|| UnresolvedReference::new(key, required_by))
    }

    /// Number of records (aliases excluded)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Layer names in merge order
    #[must_use]
    pub fn layers(&self) -> &[String] {
        &self.layers
    }
}
