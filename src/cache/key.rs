//! Cache key derivation.
//!
//! A key is `<category>:<hash>` where the hash covers a canonical encoding of
//! the request parameters, or a literal `<category>:<id>` for resources with
//! a single natural identifier.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};

use crate::cache::Category;

/// Hex characters kept from the parameter digest.
pub const HASH_WIDTH: usize = 16;

// == Param Value ==
/// A single typed request parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ParamValue {
    fn to_json(&self) -> Value {
        match self {
            ParamValue::Str(s) => Value::String(s.clone()),
            ParamValue::Int(n) => Value::Number((*n).into()),
            ParamValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            ParamValue::Bool(b) => Value::Bool(*b),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

// == Key Params ==
/// Named parameters of a cached request, ordered by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyParams(BTreeMap<String, ParamValue>);

impl KeyParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compact JSON object with keys in lexicographic order.
    pub fn canonical(&self) -> String {
        let object: Map<String, Value> = self
            .0
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        Value::Object(object).to_string()
    }
}

impl<K, V> FromIterator<(K, V)> for KeyParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = KeyParams::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

// == Cache Key ==
/// Opaque identifier of a cached item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Literal key for a resource with one natural identifier.
    pub fn literal(category: Category, id: impl fmt::Display) -> Self {
        Self(format!("{}:{}", category.prefix(), id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The category prefix (everything before the first `:`).
    pub fn category(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(prefix, _)| prefix)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Build Key ==
/// Derives the hashed key for `category` and `params`.
///
/// Parameter insertion order never changes the result.
pub fn build_key(category: Category, params: &KeyParams) -> CacheKey {
    CacheKey(format!("{}:{}", category.prefix(), params_hash(params)))
}

fn params_hash(params: &KeyParams) -> String {
    let digest = Sha256::digest(params.canonical().as_bytes());
    let mut hash = hex::encode(digest);
    hash.truncate(HASH_WIDTH);
    hash
}

/// `genres:all`
pub fn genres_key() -> CacheKey {
    CacheKey::literal(Category::Genres, "all")
}

/// `movie_details:<movie_id>`, literal so a single movie can be purged.
pub fn movie_details_key(movie_id: i64) -> CacheKey {
    CacheKey::literal(Category::MovieDetails, movie_id)
}

/// `user_favorites:<user_id>`
pub fn user_favorites_key(user_id: i64) -> CacheKey {
    CacheKey::literal(Category::UserFavorites, user_id)
}
