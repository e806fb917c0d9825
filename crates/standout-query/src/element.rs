//! Element selection: first, last, single and positional access.
//!
//! Every selector comes in three flavours:
//!
//! - the plain form returns [`Result`] and fails with a [`QueryError`],
//! - the `_or_default` form substitutes `T::default()`,
//! - the `_or` form substitutes a caller-supplied value.
//!
//! Each flavour also has a `_where` form taking a predicate, so
//! `first_or_where(seq, pred, value)` picks the first match or `value`.
//!
//! | matches | `first` | `first_or_default` | `single` | `single_or_default` |
//! |---------|---------|--------------------|----------|---------------------|
//! | 0 | `NoMatch` | default | `NoMatch` | `Ok(default)` |
//! | 1 | value | value | value | `Ok(value)` |
//! | 2+ | first match | first match | `MultipleMatch` | `MultipleMatch` |
//!
//! A default never hides ambiguity: the `single` family reports
//! [`QueryError::MultipleMatch`] in every flavour.

use crate::error::{QueryError, Result};

/// Returns the first element.
pub fn first<I: IntoIterator>(source: I) -> Result<I::Item> {
    source.into_iter().next().ok_or(QueryError::NoMatch)
}

/// Returns the first element satisfying `predicate`.
///
/// Stops pulling at the first match.
pub fn first_where<I, P>(source: I, mut predicate: P) -> Result<I::Item>
where
    I: IntoIterator,
    P: FnMut(&I::Item) -> bool,
{
    source
        .into_iter()
        .find(|item| predicate(item))
        .ok_or(QueryError::NoMatch)
}

/// Returns the first element, or `T::default()` if there is none.
pub fn first_or_default<I>(source: I) -> I::Item
where
    I: IntoIterator,
    I::Item: Default,
{
    first(source).unwrap_or_default()
}

/// Returns the first element satisfying `predicate`, or `T::default()`.
pub fn first_or_default_where<I, P>(source: I, predicate: P) -> I::Item
where
    I: IntoIterator,
    I::Item: Default,
    P: FnMut(&I::Item) -> bool,
{
    first_where(source, predicate).unwrap_or_default()
}

/// Returns the first element, or `default` if there is none.
pub fn first_or<I: IntoIterator>(source: I, default: I::Item) -> I::Item {
    first(source).unwrap_or(default)
}

/// Returns the first element satisfying `predicate`, or `default`.
pub fn first_or_where<I, P>(source: I, predicate: P, default: I::Item) -> I::Item
where
    I: IntoIterator,
    P: FnMut(&I::Item) -> bool,
{
    first_where(source, predicate).unwrap_or(default)
}

/// Returns the last element.
///
/// Consumes the whole sequence.
pub fn last<I: IntoIterator>(source: I) -> Result<I::Item> {
    source.into_iter().last().ok_or(QueryError::NoMatch)
}

/// Returns the last element satisfying `predicate`.
pub fn last_where<I, P>(source: I, mut predicate: P) -> Result<I::Item>
where
    I: IntoIterator,
    P: FnMut(&I::Item) -> bool,
{
    source
        .into_iter()
        .filter(|item| predicate(item))
        .last()
        .ok_or(QueryError::NoMatch)
}

/// Returns the last element, or `T::default()` if there is none.
pub fn last_or_default<I>(source: I) -> I::Item
where
    I: IntoIterator,
    I::Item: Default,
{
    last(source).unwrap_or_default()
}

/// Returns the last element satisfying `predicate`, or `T::default()`.
pub fn last_or_default_where<I, P>(source: I, predicate: P) -> I::Item
where
    I: IntoIterator,
    I::Item: Default,
    P: FnMut(&I::Item) -> bool,
{
    last_where(source, predicate).unwrap_or_default()
}

/// Returns the last element, or `default` if there is none.
pub fn last_or<I: IntoIterator>(source: I, default: I::Item) -> I::Item {
    last(source).unwrap_or(default)
}

/// Returns the last element satisfying `predicate`, or `default`.
pub fn last_or_where<I, P>(source: I, predicate: P, default: I::Item) -> I::Item
where
    I: IntoIterator,
    P: FnMut(&I::Item) -> bool,
{
    last_where(source, predicate).unwrap_or(default)
}

/// Returns the only element of the sequence.
pub fn single<I: IntoIterator>(source: I) -> Result<I::Item> {
    single_where(source, |_| true)
}

/// Returns the only element satisfying `predicate`.
///
/// Scanning continues past the first match until a second match is found or
/// the sequence ends.
pub fn single_where<I, P>(source: I, predicate: P) -> Result<I::Item>
where
    I: IntoIterator,
    P: FnMut(&I::Item) -> bool,
{
    find_single(source, predicate)?.ok_or(QueryError::NoMatch)
}

/// Returns the only element, `T::default()` if there is none, and
/// [`QueryError::MultipleMatch`] if there is more than one.
pub fn single_or_default<I>(source: I) -> Result<I::Item>
where
    I: IntoIterator,
    I::Item: Default,
{
    single_or_default_where(source, |_| true)
}

/// Returns the only element satisfying `predicate`, `T::default()` if none
/// does, and [`QueryError::MultipleMatch`] if more than one does.
pub fn single_or_default_where<I, P>(source: I, predicate: P) -> Result<I::Item>
where
    I: IntoIterator,
    I::Item: Default,
    P: FnMut(&I::Item) -> bool,
{
    Ok(find_single(source, predicate)?.unwrap_or_default())
}

/// Returns the only element, `default` if there is none, and
/// [`QueryError::MultipleMatch`] if there is more than one.
pub fn single_or<I: IntoIterator>(source: I, default: I::Item) -> Result<I::Item> {
    Ok(find_single(source, |_| true)?.unwrap_or(default))
}

/// Returns the only element satisfying `predicate`, `default` if none does,
/// and [`QueryError::MultipleMatch`] if more than one does.
pub fn single_or_where<I, P>(source: I, predicate: P, default: I::Item) -> Result<I::Item>
where
    I: IntoIterator,
    P: FnMut(&I::Item) -> bool,
{
    Ok(find_single(source, predicate)?.unwrap_or(default))
}

/// Returns the element at 0-based `index`.
///
/// Pulls at most `index + 1` elements. Fails with
/// [`QueryError::IndexOutOfRange`] carrying the sequence length when the
/// sequence is shorter.
pub fn element_at<I: IntoIterator>(source: I, index: usize) -> Result<I::Item> {
    let mut len = 0;
    for item in source {
        if len == index {
            return Ok(item);
        }
        len += 1;
    }
    Err(QueryError::IndexOutOfRange { index, len })
}

/// Returns the element at `index`, or `T::default()` when out of range.
pub fn element_at_or_default<I>(source: I, index: usize) -> I::Item
where
    I: IntoIterator,
    I::Item: Default,
{
    source.into_iter().nth(index).unwrap_or_default()
}

/// Returns the element at `index`, or `default` when out of range.
pub fn element_at_or<I: IntoIterator>(source: I, index: usize, default: I::Item) -> I::Item {
    source.into_iter().nth(index).unwrap_or(default)
}

/// Finds at most one match; a second match is an error.
fn find_single<I, P>(source: I, mut predicate: P) -> Result<Option<I::Item>>
where
    I: IntoIterator,
    P: FnMut(&I::Item) -> bool,
{
    let mut matches = source.into_iter().filter(|item| predicate(item));
    let found = matches.next();
    if found.is_some() && matches.next().is_some() {
        return Err(QueryError::MultipleMatch);
    }
    Ok(found)
}
