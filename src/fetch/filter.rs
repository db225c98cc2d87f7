//! Client-side attribute filtering for list screens.

use std::collections::BTreeMap;

/// Items that expose named string attributes to a [`FilterSet`].
pub trait Filterable {
    /// Value of the attribute called `key`, if the item has one.
    fn attribute(&self, key: &str) -> Option<&str>;
}

/// Accepted values per attribute key.
///
/// An item passes when, for every key, its attribute equals one of the
/// accepted values ignoring case. An item without the attribute fails, and
/// so does every item when a key has no accepted values. An empty set
/// accepts everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    criteria: BTreeMap<String, Vec<String>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.insert(key, values);
        self
    }

    /// Add accepted values for `key`, merging with any already present.
    pub fn insert<I, V>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.criteria
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.criteria.keys().map(String::as_str)
    }

    pub fn matches<T: Filterable>(&self, item: &T) -> bool {
        self.criteria.iter().all(|(key, accepted)| {
            item.attribute(key).is_some_and(|value| {
                let value = value.to_lowercase();
                accepted
                    .iter()
                    .any(|candidate| candidate.to_lowercase() == value)
            })
        })
    }

    pub fn apply<T: Filterable>(&self, items: Vec<T>) -> Vec<T> {
        if self.is_empty() {
            return items;
        }
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}

impl<K, V> FromIterator<(K, V)> for FilterSet
where
    K: Into<String>,
    V: IntoIterator,
    V::Item: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = FilterSet::new();
        for (key, values) in iter {
            set.insert(key, values);
        }
        set
    }
}
