//! Materialized key -> elements index.
//!
//! A [`Lookup`] groups elements by a key under an [`EqualityComparer`]. Groups
//! are kept in the order their key was first seen and each group keeps its
//! elements in original relative order. The join engine builds one over its
//! inner sequence; `group_by` and `to_lookup` expose it directly.

use std::collections::HashMap;
use std::hash::{BuildHasher, Hasher};

use ahash::RandomState;
use tracing::debug;

use crate::comparer::{EqualityComparer, Natural};

/// A key and every element that shares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping<K, V> {
    key: K,
    items: Vec<V>,
}

impl<K, V> Grouping<K, V> {
    /// Returns the shared key.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Returns the elements, in original relative order.
    pub fn items(&self) -> &[V] {
        &self.items
    }

    /// Returns the number of elements in the group.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the group has no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Splits the group into its key and elements.
    pub fn into_parts(self) -> (K, Vec<V>) {
        (self.key, self.items)
    }
}

impl<K, V> IntoIterator for Grouping<K, V> {
    type Item = V;
    type IntoIter = std::vec::IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a Grouping<K, V> {
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Elements grouped by key.
pub struct Lookup<K, V, C = Natural> {
    groups: Vec<Grouping<K, V>>,
    // key hash -> positions in `groups` whose key has that hash
    buckets: HashMap<u64, Vec<usize>, RandomState>,
    hasher: RandomState,
    comparer: C,
    elements: usize,
}

impl<K, V> Lookup<K, V>
where
    K: Eq + std::hash::Hash,
{
    /// Creates an empty lookup using the key's natural equality.
    pub fn new() -> Self {
        Lookup::with_comparer(Natural)
    }
}

impl<K, V> Default for Lookup<K, V>
where
    K: Eq + std::hash::Hash,
{
    fn default() -> Self {
        Lookup::new()
    }
}

impl<K, V, C> Lookup<K, V, C>
where
    C: EqualityComparer<K>,
{
    /// Creates an empty lookup comparing keys with `comparer`.
    pub fn with_comparer(comparer: C) -> Self {
        Lookup {
            groups: Vec::new(),
            buckets: HashMap::default(),
            hasher: RandomState::new(),
            comparer,
            elements: 0,
        }
    }

    /// Builds a lookup from a sequence, keying each element with `key`.
    pub fn build<I, F>(source: I, mut key: F, comparer: C) -> Self
    where
        I: IntoIterator<Item = V>,
        F: FnMut(&V) -> K,
    {
        let mut lookup = Lookup::with_comparer(comparer);
        for item in source {
            let k = key(&item);
            lookup.insert(k, item);
        }
        debug!(
            elements = lookup.elements,
            groups = lookup.groups.len(),
            "materialized lookup"
        );
        lookup
    }

    /// Appends `value` to the group for `key`, creating the group if needed.
    pub fn insert(&mut self, key: K, value: V) {
        self.elements += 1;
        let hash = self.hash(&key);
        if let Some(position) = self.position_hashed(hash, &key) {
            self.groups[position].items.push(value);
            return;
        }

        self.buckets.entry(hash).or_default().push(self.groups.len());
        self.groups.push(Grouping {
            key,
            items: vec![value],
        });
    }

    /// Returns the elements sharing `key`, or an empty slice.
    pub fn get(&self, key: &K) -> &[V] {
        match self.position(key) {
            Some(position) => &self.groups[position].items,
            None => &[],
        }
    }

    /// Returns `true` if some element has `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if the lookup holds no elements.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns the total number of elements across all groups.
    pub fn element_count(&self) -> usize {
        self.elements
    }

    /// Iterates over the groups in first-seen key order.
    pub fn iter(&self) -> std::slice::Iter<'_, Grouping<K, V>> {
        self.groups.iter()
    }

    /// Returns the position of the group for `key`.
    ///
    /// Lets callers resolve a key once and then walk its group by position.
    pub(crate) fn group_index(&self, key: &K) -> Option<usize> {
        self.position(key)
    }

    /// Returns the elements of the group at `index`, or an empty slice.
    pub(crate) fn group_items(&self, index: usize) -> &[V] {
        match self.groups.get(index) {
            Some(group) => &group.items,
            None => &[],
        }
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.position_hashed(self.hash(key), key)
    }

    fn position_hashed(&self, hash: u64, key: &K) -> Option<usize> {
        let candidates = self.buckets.get(&hash)?;
        candidates
            .iter()
            .copied()
            .find(|&position| self.comparer.equals(&self.groups[position].key, key))
    }

    fn hash(&self, key: &K) -> u64 {
        let mut state = self.hasher.build_hasher();
        self.comparer.hash_key(key, &mut state);
        state.finish()
    }
}

impl<K, V, C> IntoIterator for Lookup<K, V, C> {
    type Item = Grouping<K, V>;
    type IntoIter = std::vec::IntoIter<Grouping<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a Lookup<K, V, C> {
    type Item = &'a Grouping<K, V>;
    type IntoIter = std::slice::Iter<'a, Grouping<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug, C> std::fmt::Debug for Lookup<K, V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.groups.iter()).finish()
    }
}

/// Lazily groups a sequence by key.
///
/// The source is drained into a [`Lookup`] on the first pull; groups are then
/// yielded in first-seen key order.
pub struct GroupBy<I, F, K, C = Natural>
where
    I: Iterator,
{
    pending: Option<(I, F, C)>,
    groups: std::vec::IntoIter<Grouping<K, I::Item>>,
}

impl<I, F, K, C> GroupBy<I, F, K, C>
where
    I: Iterator,
    F: FnMut(&I::Item) -> K,
    C: EqualityComparer<K>,
{
    pub(crate) fn new(source: I, key: F, comparer: C) -> Self {
        GroupBy {
            pending: Some((source, key, comparer)),
            groups: Vec::new().into_iter(),
        }
    }
}

impl<I, F, K, C> Iterator for GroupBy<I, F, K, C>
where
    I: Iterator,
    F: FnMut(&I::Item) -> K,
    C: EqualityComparer<K>,
{
    type Item = Grouping<K, I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((source, key, comparer)) = self.pending.take() {
            self.groups = Lookup::build(source, key, comparer).into_iter();
        }
        self.groups.next()
    }
}

/// Groups `source` by `key` using the key's natural equality.
pub fn group_by<I, F, K>(source: I, key: F) -> GroupBy<I::IntoIter, F, K>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> K,
    K: Eq + std::hash::Hash,
{
    GroupBy::new(source.into_iter(), key, Natural)
}

/// Groups `source` by `key`, comparing keys with `comparer`.
pub fn group_by_with<I, F, K, C>(source: I, key: F, comparer: C) -> GroupBy<I::IntoIter, F, K, C>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> K,
    C: EqualityComparer<K>,
{
    GroupBy::new(source.into_iter(), key, comparer)
}

/// Eagerly builds a [`Lookup`] of `source` keyed by `key`.
pub fn to_lookup<I, F, K>(source: I, key: F) -> Lookup<K, I::Item>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> K,
    K: Eq + std::hash::Hash,
{
    Lookup::build(source, key, Natural)
}

/// Eagerly builds a [`Lookup`] of `source`, comparing keys with `comparer`.
pub fn to_lookup_with<I, F, K, C>(source: I, key: F, comparer: C) -> Lookup<K, I::Item, C>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> K,
    C: EqualityComparer<K>,
{
    Lookup::build(source, key, comparer)
}
