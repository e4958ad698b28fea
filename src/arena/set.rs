//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::arena::{ArenaKey, ArenaMap};
use smallbitvec::SmallBitVec;
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;

/// A dense set of keys from a primary [`ArenaMap`], stored as one bit per key.
///
/// Mark-style algorithms (reachability, visited sets) use this instead of a
/// hash set since graph keys are small dense integers.
///
/// ```
/// # use quartz::arena_key;
/// # use quartz::arena::*;
/// arena_key! { struct Key; }
///
/// let mut primary = ArenaMap::new();
/// let a: Key = primary.insert(1);
/// let b = primary.insert(2);
///
/// let mut set = SecondarySet::with_primary(&primary);
///
/// assert!(set.insert(a));
/// assert!(!set.insert(a));
/// assert!(set.contains(a));
/// assert!(!set.contains(b));
/// ```
#[derive(Clone)]
pub struct SecondarySet<K: ArenaKey> {
    bits: SmallBitVec,
    len: usize,
    _unused: PhantomData<fn() -> K>,
}

impl<K: ArenaKey> SecondarySet<K> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            bits: SmallBitVec::new(),
            len: 0,
            _unused: PhantomData,
        }
    }

    /// Creates an empty set sized for every key `primary` has handed out so far.
    pub fn with_primary<T>(primary: &ArenaMap<K, T>) -> Self {
        Self {
            bits: SmallBitVec::from_elem(primary.capacity_hint(), false),
            len: 0,
            _unused: PhantomData,
        }
    }

    /// Adds `key` to the set. Returns `true` if it was not already present.
    pub fn insert(&mut self, key: K) -> bool {
        let index = key.index();

        if index >= self.bits.len() {
            self.bits.resize(index + 1, false);
        }

        if self.bits.get(index) == Some(true) {
            return false;
        }

        self.bits.set(index, true);
        self.len += 1;

        true
    }

    /// Removes `key` from the set. Returns `true` if it was present.
    pub fn remove(&mut self, key: K) -> bool {
        if !self.contains(key) {
            return false;
        }

        self.bits.set(key.index(), false);
        self.len -= 1;

        true
    }

    /// Checks whether `key` is in the set.
    #[inline]
    pub fn contains(&self, key: K) -> bool {
        self.bits.get(key.index()).unwrap_or(false)
    }

    /// Number of keys in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over the keys in the set, in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, bit)| *bit)
            .map(|(i, _)| K::new(i))
    }
}

impl<K: ArenaKey> Default for SecondarySet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ArenaKey> Debug for SecondarySet<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "SecondarySet ")?;

        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena_key;

    arena_key! { struct Key; }

    #[test]
    fn grows_past_primary_size() {
        let mut set = SecondarySet::<Key>::new();

        assert!(set.insert(Key::new(100)));
        assert!(set.contains(Key::new(100)));
        assert!(!set.contains(Key::new(99)));
        assert!(!set.contains(Key::new(1000)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_and_iterate() {
        let mut set = SecondarySet::<Key>::new();

        for i in [5, 1, 3] {
            set.insert(Key::new(i));
        }

        assert!(set.remove(Key::new(3)));
        assert!(!set.remove(Key::new(3)));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Key::new(1), Key::new(5)]);
    }
}
