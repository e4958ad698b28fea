//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::arena::ArenaKey;
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// The primary mapping of `K -> V`, where `K` is some key type and `V` is
/// the value being stored.
///
/// Unlike a plain `Vec<V>`, slots can be *vacant*: a value can be removed
/// (pruning a dead node) or a key can be handed out before its value exists
/// (reserving a lambda that is still being built). Keys are never reused, so
/// a stale key will never silently refer to a different entity.
///
/// ```
/// # use quartz::arena_key;
/// # use quartz::arena::ArenaMap;
/// arena_key! {
///     struct Name;
/// }
///
/// let mut names = ArenaMap::new();
/// let a: Name = names.insert("a");
/// let b = names.insert("b");
///
/// names.remove(a);
///
/// assert!(!names.contains(a));
/// assert_eq!(names[b], "b");
/// assert_eq!(names.keys().collect::<Vec<_>>(), vec![b]);
/// ```
#[derive(Clone)]
pub struct ArenaMap<K: ArenaKey, V> {
    slots: Vec<Option<V>>,
    len: usize,
    _unused: PhantomData<fn() -> K>,
}

impl<K: ArenaKey, V> ArenaMap<K, V> {
    /// Creates a new, empty arena.
    #[inline]
    pub fn new() -> Self {
        Self {
            slots: Vec::default(),
            len: 0,
            _unused: PhantomData,
        }
    }

    /// Checks if the arena has a live value for `key`.
    #[inline]
    pub fn contains(&self, key: K) -> bool {
        matches!(self.slots.get(key.index()), Some(Some(_)))
    }

    /// Gets the value associated with `key`, or `None` if the slot is vacant
    /// or was never handed out.
    #[inline]
    pub fn get(&self, key: K) -> Option<&V> {
        self.slots.get(key.index())?.as_ref()
    }

    /// Mutable version of [`Self::get`].
    #[inline]
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.slots.get_mut(key.index())?.as_mut()
    }

    /// Adds an item into the arena, and returns a key that can be used to
    /// access that data later.
    #[inline]
    pub fn insert(&mut self, value: V) -> K {
        self.slots.push(Some(value));
        self.len += 1;

        K::new(self.slots.len() - 1)
    }

    /// Hands out a key whose slot starts vacant. The value can be provided
    /// later with [`Self::fill`].
    ///
    /// ```
    /// # use quartz::arena_key;
    /// # use quartz::arena::ArenaMap;
    /// # arena_key! { struct Key; }
    /// let mut map = ArenaMap::new();
    /// let k: Key = map.reserve();
    /// assert!(!map.contains(k));
    ///
    /// map.fill(k, 42);
    /// assert_eq!(map[k], 42);
    /// ```
    #[inline]
    pub fn reserve(&mut self) -> K {
        self.slots.push(None);

        K::new(self.slots.len() - 1)
    }

    /// Stores `value` in a vacant slot, returning whatever was there before.
    ///
    /// Panics if `key` was never handed out by this arena.
    pub fn fill(&mut self, key: K, value: V) -> Option<V> {
        let slot = self
            .slots
            .get_mut(key.index())
            .expect("key was not handed out by this arena");

        let old = slot.replace(value);

        if old.is_none() {
            self.len += 1;
        }

        old
    }

    /// Empties a slot and returns its value. The key stays reserved and may be
    /// filled again later.
    pub fn remove(&mut self, key: K) -> Option<V> {
        let old = self.slots.get_mut(key.index())?.take();

        if old.is_some() {
            self.len -= 1;
        }

        old
    }

    /// Gets the key that *will be* returned by the next [`Self::insert`] or
    /// [`Self::reserve`].
    #[inline]
    pub fn next_key(&self) -> K {
        K::new(self.slots.len())
    }

    /// Number of live values in the arena.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Checks if the arena has no live values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of keys ever handed out, live or not. Secondary maps use this
    /// to size themselves.
    #[inline]
    pub fn capacity_hint(&self) -> usize {
        self.slots.len()
    }

    /// Iterates over the keys of live slots, in increasing order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| K::new(i))
    }

    /// Iterates over live `(key, value)` pairs, in increasing key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (K::new(i), v)))
    }

    /// Iterates over live `(key, value)` pairs with mutable access to the values.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut V)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|v| (K::new(i), v)))
    }

    /// Iterates over the live values.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Removes every live value for which `f` returns `false`, returning how
    /// many were removed.
    pub fn retain<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(K, &V) -> bool,
    {
        let mut removed = 0;

        for (i, slot) in self.slots.iter_mut().enumerate() {
            let keep = match slot {
                Some(v) => f(K::new(i), v),
                None => continue,
            };

            if !keep {
                *slot = None;
                removed += 1;
            }
        }

        self.len -= removed;

        removed
    }
}

impl<K: ArenaKey, V> Default for ArenaMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ArenaKey, V> Index<K> for ArenaMap<K, V> {
    type Output = V;

    fn index(&self, key: K) -> &Self::Output {
        match self.get(key) {
            Some(v) => v,
            None => panic!("{key:?} refers to a vacant slot"),
        }
    }
}

impl<K: ArenaKey, V> IndexMut<K> for ArenaMap<K, V> {
    fn index_mut(&mut self, key: K) -> &mut Self::Output {
        match self.get_mut(key) {
            Some(v) => v,
            None => panic!("{key:?} refers to a vacant slot"),
        }
    }
}

impl<K: ArenaKey, V: Debug> Debug for ArenaMap<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ArenaMap ")?;

        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena_key;

    arena_key! { struct Key; }

    #[test]
    fn removed_slots_are_not_reused() {
        let mut map = ArenaMap::new();
        let a: Key = map.insert('a');
        let b = map.insert('b');

        assert_eq!(map.remove(a), Some('a'));
        assert_eq!(map.len(), 1);

        let c = map.insert('c');

        assert_ne!(a, c);
        assert_eq!(map.get(a), None);
        assert_eq!(map[b], 'b');
        assert_eq!(map[c], 'c');
    }

    #[test]
    fn reserved_keys_can_be_filled_later() {
        let mut map = ArenaMap::new();
        let a: Key = map.reserve();
        let b = map.insert(2);

        assert_eq!(map.len(), 1);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec![b]);
        assert_eq!(map.fill(a, 1), None);
        assert_eq!(map.len(), 2);
        assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn retain_counts_removals() {
        let mut map = ArenaMap::<Key, i32>::new();

        for i in 0..10 {
            map.insert(i);
        }

        assert_eq!(map.retain(|_, v| v % 2 == 0), 5);
        assert_eq!(map.len(), 5);
        assert!(map.values().all(|v| v % 2 == 0));
    }

    #[test]
    #[should_panic]
    fn indexing_vacant_slot_panics() {
        let mut map = ArenaMap::<Key, i32>::new();
        let k = map.reserve();

        let _ = map[k];
    }
}
