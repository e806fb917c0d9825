//! Equi-joins over two sequences.
//!
//! All three joins share one strategy: on the first pull the inner sequence
//! is drained once into a [`Lookup`] keyed by `inner_key`, then the outer
//! sequence is pulled lazily and each outer element is matched against the
//! index by `outer_key`.
//!
//! | join | outer element with matches | outer element without |
//! |------|----------------------------|-----------------------|
//! | [`InnerJoin`] | one row per match | no row |
//! | [`GroupJoin`] | one row with the group | one row with `&[]` |
//! | [`LeftJoin`]  | one row per match | one row with `None` |

use tracing::debug;

use crate::comparer::{EqualityComparer, Natural};
use crate::lookup::Lookup;

/// The inner side of a join: pending until first pull, then indexed.
struct JoinIndex<J, G, K, C>
where
    J: Iterator,
{
    pending: Option<(J, G)>,
    lookup: Lookup<K, J::Item, C>,
}

impl<J, G, K, C> JoinIndex<J, G, K, C>
where
    J: Iterator,
    G: FnMut(&J::Item) -> K,
    C: EqualityComparer<K>,
{
    fn new(inner: J, inner_key: G, comparer: C) -> Self {
        JoinIndex {
            pending: Some((inner, inner_key)),
            lookup: Lookup::with_comparer(comparer),
        }
    }

    fn lookup(&mut self) -> &Lookup<K, J::Item, C> {
        if let Some((inner, mut inner_key)) = self.pending.take() {
            for item in inner {
                let key = inner_key(&item);
                self.lookup.insert(key, item);
            }
            debug!(
                elements = self.lookup.element_count(),
                groups = self.lookup.len(),
                "materialized join index"
            );
        }
        &self.lookup
    }
}

/// An outer element being expanded against its matching group.
///
/// The group is resolved once per outer element and then walked by position.
struct Cursor<T> {
    outer: T,
    group: usize,
    next: usize,
}

/// Inner equi-join, created by [`inner_join`] and [`inner_join_with`].
pub struct InnerJoin<O, J, F, G, R, K, C = Natural>
where
    O: Iterator,
    J: Iterator,
{
    outer: O,
    outer_key: F,
    index: JoinIndex<J, G, K, C>,
    result: R,
    cursor: Option<Cursor<O::Item>>,
}

impl<O, J, F, G, R, K, C, T> Iterator for InnerJoin<O, J, F, G, R, K, C>
where
    O: Iterator,
    J: Iterator,
    F: FnMut(&O::Item) -> K,
    G: FnMut(&J::Item) -> K,
    R: FnMut(&O::Item, &J::Item) -> T,
    C: EqualityComparer<K>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let lookup = self.index.lookup();
        loop {
            if let Some(cursor) = &mut self.cursor {
                if let Some(inner) = lookup.group_items(cursor.group).get(cursor.next) {
                    cursor.next += 1;
                    return Some((self.result)(&cursor.outer, inner));
                }
                self.cursor = None;
            }

            let outer = self.outer.next()?;
            let key = (self.outer_key)(&outer);
            if let Some(group) = lookup.group_index(&key) {
                self.cursor = Some(Cursor {
                    outer,
                    group,
                    next: 0,
                });
            }
        }
    }
}

/// Group-join, created by [`group_join`] and [`group_join_with`].
pub struct GroupJoin<O, J, F, G, R, K, C = Natural>
where
    J: Iterator,
{
    outer: O,
    outer_key: F,
    index: JoinIndex<J, G, K, C>,
    result: R,
}

impl<O, J, F, G, R, K, C, T> Iterator for GroupJoin<O, J, F, G, R, K, C>
where
    O: Iterator,
    J: Iterator,
    F: FnMut(&O::Item) -> K,
    G: FnMut(&J::Item) -> K,
    R: FnMut(O::Item, &[J::Item]) -> T,
    C: EqualityComparer<K>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let lookup = self.index.lookup();
        let outer = self.outer.next()?;
        let key = (self.outer_key)(&outer);
        Some((self.result)(outer, lookup.get(&key)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.outer.size_hint()
    }
}

/// Left outer join, created by [`left_join`] and [`left_join_with`].
pub struct LeftJoin<O, J, F, G, R, K, C = Natural>
where
    O: Iterator,
    J: Iterator,
{
    outer: O,
    outer_key: F,
    index: JoinIndex<J, G, K, C>,
    result: R,
    cursor: Option<Cursor<O::Item>>,
}

impl<O, J, F, G, R, K, C, T> Iterator for LeftJoin<O, J, F, G, R, K, C>
where
    O: Iterator,
    J: Iterator,
    F: FnMut(&O::Item) -> K,
    G: FnMut(&J::Item) -> K,
    R: FnMut(&O::Item, Option<&J::Item>) -> T,
    C: EqualityComparer<K>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let lookup = self.index.lookup();
        loop {
            if let Some(cursor) = &mut self.cursor {
                if let Some(inner) = lookup.group_items(cursor.group).get(cursor.next) {
                    cursor.next += 1;
                    return Some((self.result)(&cursor.outer, Some(inner)));
                }
                self.cursor = None;
            }

            let outer = self.outer.next()?;
            let key = (self.outer_key)(&outer);
            match lookup.group_index(&key) {
                Some(group) => {
                    self.cursor = Some(Cursor {
                        outer,
                        group,
                        next: 0,
                    })
                }
                None => return Some((self.result)(&outer, None)),
            }
        }
    }
}

/// Correlates `outer` and `inner` on equal keys.
///
/// Yields `result(&outer, &inner)` once per matching pair, outer elements in
/// their original order and, for each, matches in their original inner order.
/// Outer elements without a match produce nothing.
///
/// # Example
///
/// ```
/// use standout_query::inner_join;
///
/// let outer = ["X", "Y"];
/// let inner = [("X", 1), ("X", 2)];
/// let rows: Vec<_> = inner_join(outer, inner, |o| *o, |i| i.0, |o, i| (*o, i.1)).collect();
///
/// assert_eq!(rows, [("X", 1), ("X", 2)]);
/// ```
pub fn inner_join<O, J, F, G, R, K, T>(
    outer: O,
    inner: J,
    outer_key: F,
    inner_key: G,
    result: R,
) -> InnerJoin<O::IntoIter, J::IntoIter, F, G, R, K>
where
    O: IntoIterator,
    J: IntoIterator,
    F: FnMut(&O::Item) -> K,
    G: FnMut(&J::Item) -> K,
    R: FnMut(&O::Item, &J::Item) -> T,
    K: Eq + std::hash::Hash,
{
    inner_join_with(outer, inner, outer_key, inner_key, result, Natural)
}

/// [`inner_join`] with keys compared by `comparer`.
pub fn inner_join_with<O, J, F, G, R, K, C, T>(
    outer: O,
    inner: J,
    outer_key: F,
    inner_key: G,
    result: R,
    comparer: C,
) -> InnerJoin<O::IntoIter, J::IntoIter, F, G, R, K, C>
where
    O: IntoIterator,
    J: IntoIterator,
    F: FnMut(&O::Item) -> K,
    G: FnMut(&J::Item) -> K,
    R: FnMut(&O::Item, &J::Item) -> T,
    C: EqualityComparer<K>,
{
    InnerJoin {
        outer: outer.into_iter(),
        outer_key,
        index: JoinIndex::new(inner.into_iter(), inner_key, comparer),
        result,
        cursor: None,
    }
}

/// Pairs every outer element with the group of inner elements sharing its key.
///
/// Yields exactly one `result(outer, group)` per outer element; `group` is
/// empty when nothing matched.
///
/// # Example
///
/// ```
/// use standout_query::group_join;
///
/// let outer = ["X", "Y"];
/// let inner = [("X", 1), ("X", 2)];
/// let rows: Vec<(&str, Vec<i32>)> = group_join(outer, inner, |o| *o, |i| i.0, |o, group| {
///     (o, group.iter().map(|i| i.1).collect())
/// })
/// .collect();
///
/// assert_eq!(rows, [("X", vec![1, 2]), ("Y", vec![])]);
/// ```
pub fn group_join<O, J, F, G, R, K, T>(
    outer: O,
    inner: J,
    outer_key: F,
    inner_key: G,
    result: R,
) -> GroupJoin<O::IntoIter, J::IntoIter, F, G, R, K>
where
    O: IntoIterator,
    J: IntoIterator,
    F: FnMut(&O::Item) -> K,
    G: FnMut(&J::Item) -> K,
    R: FnMut(O::Item, &[J::Item]) -> T,
    K: Eq + std::hash::Hash,
{
    group_join_with(outer, inner, outer_key, inner_key, result, Natural)
}

/// [`group_join`] with keys compared by `comparer`.
pub fn group_join_with<O, J, F, G, R, K, C, T>(
    outer: O,
    inner: J,
    outer_key: F,
    inner_key: G,
    result: R,
    comparer: C,
) -> GroupJoin<O::IntoIter, J::IntoIter, F, G, R, K, C>
where
    O: IntoIterator,
    J: IntoIterator,
    F: FnMut(&O::Item) -> K,
    G: FnMut(&J::Item) -> K,
    R: FnMut(O::Item, &[J::Item]) -> T,
    C: EqualityComparer<K>,
{
    GroupJoin {
        outer: outer.into_iter(),
        outer_key,
        index: JoinIndex::new(inner.into_iter(), inner_key, comparer),
        result,
    }
}

/// Left outer join: like [`inner_join`], but an outer element without
/// matches still yields one `result(&outer, None)` row.
///
/// This is a group-join flattened with a per-row default, so callers can
/// substitute a placeholder for the missing side.
pub fn left_join<O, J, F, G, R, K, T>(
    outer: O,
    inner: J,
    outer_key: F,
    inner_key: G,
    result: R,
) -> LeftJoin<O::IntoIter, J::IntoIter, F, G, R, K>
where
    O: IntoIterator,
    J: IntoIterator,
    F: FnMut(&O::Item) -> K,
    G: FnMut(&J::Item) -> K,
    R: FnMut(&O::Item, Option<&J::Item>) -> T,
    K: Eq + std::hash::Hash,
{
    left_join_with(outer, inner, outer_key, inner_key, result, Natural)
}

/// [`left_join`] with keys compared by `comparer`.
pub fn left_join_with<O, J, F, G, R, K, C, T>(
    outer: O,
    inner: J,
    outer_key: F,
    inner_key: G,
    result: R,
    comparer: C,
) -> LeftJoin<O::IntoIter, J::IntoIter, F, G, R, K, C>
where
    O: IntoIterator,
    J: IntoIterator,
    F: FnMut(&O::Item) -> K,
    G: FnMut(&J::Item) -> K,
    R: FnMut(&O::Item, Option<&J::Item>) -> T,
    C: EqualityComparer<K>,
{
    LeftJoin {
        outer: outer.into_iter(),
        outer_key,
        index: JoinIndex::new(inner.into_iter(), inner_key, comparer),
        result,
        cursor: None,
    }
}
