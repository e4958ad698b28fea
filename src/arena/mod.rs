//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! A simple typed arena module.
//!
//! Graph IR nodes and lambdas live in these arenas and are referred to by
//! small copyable keys. Keys give nodes a stable identity: rewriting a node's
//! producer never changes its key, so every other node holding that key stays
//! valid. Slots may be vacated (pruning) but keys are never handed out twice.
//!
//! ```
//! # use quartz::arena_key;
//! # use quartz::arena::*;
//! arena_key! {
//!     pub struct Node;
//! }
//!
//! enum Expr {
//!     Immediate(u64),
//!     Add(Node, Node),
//! }
//!
//! let mut arena = ArenaMap::new();
//!
//! let e1: Node = arena.insert(Expr::Immediate(16));
//! let e2 = arena.insert(Expr::Immediate(3));
//! let e3 = arena.insert(Expr::Add(e1, e2));
//!
//! let mut seen = SecondarySet::with_primary(&arena);
//! seen.insert(e3);
//! ```

mod key;
mod map;
mod secondary;
mod set;

pub use key::ArenaKey;
pub use map::ArenaMap;
pub use secondary::SecondaryMap;
pub use set::SecondarySet;
