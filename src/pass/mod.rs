//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! The pass infrastructure that drives optimization.
//!
//! Every pass works on one detached [`Lambda`](crate::ir::Lambda) at a
//! time, with the rest of the [`Universe`](crate::ir::Universe) available
//! for lookups (inlining needs other lambdas, folding needs the
//! evaluator). Passes report how many changes they made:
//!
//! ```
//! # use quartz::error::Result;
//! # use quartz::ir::{Lambda, Universe};
//! # use quartz::pass::LambdaTransformPass;
//! struct CountNodes;
//!
//! impl LambdaTransformPass for CountNodes {
//!     fn name(&self) -> &'static str {
//!         "count-nodes"
//!     }
//!
//!     fn run(&mut self, lambda: &mut Lambda, _: &mut Universe) -> Result<usize> {
//!         println!("{} has {} nodes", lambda.name(), lambda.graph().len());
//!
//!         Ok(0)
//!     }
//! }
//! ```
//!
//! The [`Optimizer`] repeats simplification and CSE until a round changes
//! nothing, pruning dead nodes after every round.

mod manager;
mod transform;

pub use manager::*;
pub use transform::*;
