//! Favorites toggle rule and partition
//!
//! Both are pure: they never look at the network and never fail.

use std::collections::BTreeSet;

use crate::domain::Keyed;

/// Flip membership of `key`; returns whether it is now a favorite
pub fn toggle(favorites: &mut BTreeSet<String>, key: &str) -> bool {
    if favorites.remove(key) {
        false
    } else {
        favorites.insert(key.to_string());
        true
    }
}

/// Records split by favorite membership, each half in `data` order
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<T> {
    pub favorited: Vec<T>,
    pub others: Vec<T>,
}

impl<T> Partition<T> {
    pub fn len(&self) -> usize {
        self.favorited.len() + self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split `data` into favorited and other records
pub fn partition<T: Keyed + Clone>(data: &[T], favorites: &BTreeSet<String>) -> Partition<T> {
    let (favorited, others) = data
        .iter()
        .cloned()
        .partition(|record| favorites.contains(record.key()));

    Partition { favorited, others }
}
