//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Small shared helpers that don't belong to any particular IR.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// A [`HashMap`] using `ahash` instead of SipHash.
pub type SaHashMap<K, V> = HashMap<K, V, ahash::RandomState>;

/// A [`HashSet`] using `ahash` instead of SipHash.
pub type SaHashSet<V> = HashSet<V, ahash::RandomState>;

/// Hashes values into `u64` digests that are only comparable with other
/// digests from the same [`StructuralHasher`].
///
/// Used for bottom-up structural hashing, where a node's digest is built from
/// the digests of its operands.
#[derive(Clone, Default)]
pub struct StructuralHasher {
    state: ahash::RandomState,
}

impl StructuralHasher {
    /// Creates a hasher with fresh random keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hashes a single value.
    pub fn one<T: Hash>(&self, value: T) -> u64 {
        self.state.hash_one(value)
    }
}
