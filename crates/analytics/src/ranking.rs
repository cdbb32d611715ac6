//! Grouping and top-N helpers.
//!
//! All rankings here are stable: entries with equal metrics keep the order in
//! which their keys were first seen.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::warn;

/// Validate a caller-supplied top-N size.
///
/// Negative sizes are rejected with a warning; the query then reports
/// nothing instead of failing.
pub fn checked_limit(n: i64, query: &str) -> Option<usize> {
    match usize::try_from(n) {
        Ok(limit) => Some(limit),
        Err(_) => {
            warn!("{}: n must be >= 0, got {}", query, n);
            None
        }
    }
}

/// Sort descending by value (stable), then keep the first `n`
pub fn top_n<K, V: PartialOrd>(mut items: Vec<(K, V)>, n: usize) -> Vec<(K, V)> {
    items.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    items.truncate(n);
    items
}

/// Values grouped by key, groups kept in first-seen key order.
pub(crate) struct OrderedGroups<K, V> {
    index: HashMap<K, usize>,
    groups: Vec<(K, Vec<V>)>,
}

impl<K: Hash + Eq + Clone, V> OrderedGroups<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, key: K, value: V) {
        let idx = *self.index.entry(key.clone()).or_insert_with(|| {
            self.groups.push((key, Vec::new()));
            self.groups.len() - 1
        });
        self.groups[idx].1.push(value);
    }

    pub(crate) fn into_vec(self) -> Vec<(K, Vec<V>)> {
        self.groups
    }
}

impl<K: Hash + Eq + Clone, V> FromIterator<(K, V)> for OrderedGroups<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut groups = Self::new();
        for (key, value) in iter {
            groups.push(key, value);
        }
        groups
    }
}

/// Occurrences of each key, in first-seen order
pub fn count_in_order<K, I>(keys: I) -> Vec<(K, usize)>
where
    K: Hash + Eq + Clone,
    I: IntoIterator<Item = K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();
    for key in keys {
        match index.get(&key) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_limit() {
        assert_eq!(checked_limit(3, "test"), Some(3));
        assert_eq!(checked_limit(0, "test"), Some(0));
        assert_eq!(checked_limit(-2, "test"), None);
    }

    #[test]
    fn test_top_n_is_stable() {
        let items = vec![("a", 1), ("b", 3), ("c", 3), ("d", 2), ("e", 3)];
        assert_eq!(top_n(items, 4), vec![("b", 3), ("c", 3), ("e", 3), ("d", 2)]);
    }

    #[test]
    fn test_ordered_groups() {
        let groups: OrderedGroups<u32, f64> =
            [(7, 1.0), (3, 2.0), (7, 3.0)].into_iter().collect();
        assert_eq!(groups.into_vec(), vec![(7, vec![1.0, 3.0]), (3, vec![2.0])]);
    }

    #[test]
    fn test_count_in_order() {
        let counts = count_in_order(["x", "y", "x", "z", "y", "x"]);
        assert_eq!(counts, vec![("x", 3), ("y", 2), ("z", 1)]);
    }
}
