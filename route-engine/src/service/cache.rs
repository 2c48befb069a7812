//! Memoized route queries.

use std::collections::HashMap;

use crate::domain::Route;
use crate::planner::RoutePreferences;

/// The preference fields that change a query's answer.
///
/// Only set fields take part. Preferences with every flag off and no
/// walking limit share a key with "no preferences". The default
/// preferences carry a walking limit, so they get a key of their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreferenceKey {
    avoid_walking: bool,
    prefer_direct: bool,
    avoid_london: bool,
    /// Bit pattern of a positive walking limit
    max_walking_distance: Option<u64>,
}

impl PreferenceKey {
    pub fn from_preferences(preferences: &RoutePreferences) -> Option<Self> {
        let max_walking_distance = (preferences.max_walking_distance_km > 0.0)
            .then(|| preferences.max_walking_distance_km.to_bits());
        let key = Self {
            avoid_walking: preferences.avoid_walking,
            prefer_direct: preferences.prefer_direct,
            avoid_london: preferences.avoid_london,
            max_walking_distance,
        };

        (key.avoid_walking || key.prefer_direct || key.avoid_london || key.max_walking_distance.is_some())
            .then_some(key)
    }
}

/// A query's identity: its endpoints plus any preferences.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    from: String,
    to: String,
    preferences: Option<PreferenceKey>,
}

impl CacheKey {
    pub fn new(from: &str, to: &str, preferences: Option<&RoutePreferences>) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            preferences: preferences.and_then(PreferenceKey::from_preferences),
        }
    }
}

/// Routes found per query, kept until cleared.
#[derive(Debug, Clone)]
pub struct RouteCache {
    routes: HashMap<CacheKey, Vec<Route>>,
    max_routes_per_key: usize,
}

impl RouteCache {
    pub fn new(max_routes_per_key: usize) -> Self {
        Self {
            routes: HashMap::new(),
            max_routes_per_key,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<&[Route]> {
        self.routes.get(key).map(Vec::as_slice)
    }

    /// Store a query's answer, replacing any earlier one. Empty answers are
    /// not stored.
    pub fn insert(&mut self, key: CacheKey, mut routes: Vec<Route>) {
        if routes.is_empty() {
            return;
        }
        routes.truncate(self.max_routes_per_key);
        self.routes.insert(key, routes);
    }

    pub fn clear(&mut self) {
        self.routes.clear();
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
