//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Whole-lambda transformations that aren't pattern rewrites.
//!
//! These work on one [`Lambda`](crate::ir::Lambda) at a time and report
//! how much they changed, so the optimizer can tell when it has reached
//! a fixpoint. The verifier lives here too, even though it never changes
//! anything.

mod cse;
mod prune;
mod verify;

pub use cse::*;
pub use prune::*;
pub use verify::*;
