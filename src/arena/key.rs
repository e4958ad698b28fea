//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use std::fmt::Debug;
use std::hash::Hash;

/// Models a type that can act as a key for the arena map types.
///
/// Keys are plain indices wrapped in a distinct type, so a [`Node`](crate::ir::Node)
/// can never be used to index the lambda table of a [`Universe`](crate::ir::Universe)
/// and vice versa.
///
/// Note that in most cases this trait should not be implemented directly,
/// prefer to use the [`arena_key`](crate::arena_key) macro that provides the
/// implementation for you.
pub trait ArenaKey: Copy + Eq + Hash + Debug {
    /// Creates a new key from a given arena index.
    ///
    /// Panics if the index is not representable with the key's storage type.
    fn new(index: usize) -> Self;

    /// Converts the key back into the `usize` index it was created from.
    fn index(self) -> usize;
}

/// Creates a type-safe key for a [`ArenaMap`](crate::arena::ArenaMap) and the
/// associated secondary data structures.
///
/// Keys are stored as a [`u32`], which is plenty for a single function's graph
/// and keeps node lists compact.
///
/// ```
/// # use quartz::arena_key;
/// # use quartz::arena::ArenaMap;
/// arena_key! {
///     /// We can have doc comments!
///     pub struct EntityRef;
/// }
///
/// let mut map = ArenaMap::new();
/// let e: EntityRef = map.insert("entity");
///
/// assert_eq!(map[e], "entity");
/// ```
#[macro_export(local_inner_macros)]
macro_rules! arena_key {
    ( $(#[$outer:meta])* $vis:vis struct $name:ident; $($rest:tt)* ) => {
        $(#[$outer])*
        #[repr(transparent)]
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(u32);

        impl $crate::arena::ArenaKey for $name {
            #[inline]
            fn new(index: usize) -> Self {
                use std::convert::TryInto;

                Self(index.try_into().expect("index is not representable with key type"))
            }

            #[inline]
            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
                std::write!(f, "{}({})", std::stringify!($name), self.0)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
                std::write!(f, "{}", self.0)
            }
        }

        arena_key!($($rest)*);
    };

    () => {}
}
