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
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A secondary mapping `K -> V` for keys handed out by a primary [`ArenaMap`].
///
/// This is how passes attach temporary per-node data (hashes, renaming tables,
/// export names) without touching the graph itself. The map grows on demand,
/// so keys created after the map was made can still be inserted.
///
/// ```
/// # use quartz::arena_key;
/// # use quartz::arena::*;
/// arena_key! { struct Player; }
///
/// let mut players = ArenaMap::new();
/// let p1: Player = players.insert("John");
/// let p2 = players.insert("Bob");
///
/// let mut health = SecondaryMap::with_primary(&players);
/// health.insert(p1, 200);
///
/// assert_eq!(health.get(p1), Some(&200));
/// assert_eq!(health.get(p2), None);
/// ```
#[derive(Clone)]
pub struct SecondaryMap<K: ArenaKey, V> {
    slots: Vec<Option<V>>,
    len: usize,
    _unused: PhantomData<fn() -> K>,
}

impl<K: ArenaKey, V> SecondaryMap<K, V> {
    /// Creates an empty map.
    #[inline]
    pub fn new() -> Self {
        Self {
            slots: Vec::default(),
            len: 0,
            _unused: PhantomData,
        }
    }

    /// Creates an empty map sized for every key `primary` has handed out so far.
    pub fn with_primary<T>(primary: &ArenaMap<K, T>) -> Self {
        let mut slots = Vec::with_capacity(primary.capacity_hint());

        slots.resize_with(primary.capacity_hint(), || None);

        Self {
            slots,
            len: 0,
            _unused: PhantomData,
        }
    }

    /// Maps `key` to `value`, returning the previous mapping if there was one.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let index = key.index();

        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }

        let old = self.slots[index].replace(value);

        if old.is_none() {
            self.len += 1;
        }

        old
    }

    /// Removes the mapping for `key`.
    pub fn remove(&mut self, key: K) -> Option<V> {
        let old = self.slots.get_mut(key.index())?.take();

        if old.is_some() {
            self.len -= 1;
        }

        old
    }

    /// Checks whether `key` has a mapping.
    #[inline]
    pub fn contains(&self, key: K) -> bool {
        matches!(self.slots.get(key.index()), Some(Some(_)))
    }

    /// Gets the mapping for `key`, if any.
    #[inline]
    pub fn get(&self, key: K) -> Option<&V> {
        self.slots.get(key.index())?.as_ref()
    }

    /// Mutable version of [`Self::get`].
    #[inline]
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.slots.get_mut(key.index())?.as_mut()
    }

    /// Number of keys with a mapping.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no key has a mapping.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over `(key, value)` pairs in increasing key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (K::new(i), v)))
    }
}

impl<K: ArenaKey, V> Default for SecondaryMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ArenaKey, V> Index<K> for SecondaryMap<K, V> {
    type Output = V;

    fn index(&self, key: K) -> &Self::Output {
        match self.get(key) {
            Some(v) => v,
            None => panic!("{key:?} has no mapping in secondary map"),
        }
    }
}

impl<K: ArenaKey, V> IndexMut<K> for SecondaryMap<K, V> {
    fn index_mut(&mut self, key: K) -> &mut Self::Output {
        match self.get_mut(key) {
            Some(v) => v,
            None => panic!("{key:?} has no mapping in secondary map"),
        }
    }
}

impl<K: ArenaKey, V: Debug> Debug for SecondaryMap<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "SecondaryMap ")?;

        f.debug_map().entries(self.iter()).finish()
    }
}
