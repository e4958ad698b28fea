//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::error::Result;
use crate::ir::{Lambda, Universe};
use crate::rewrite::{simplify, RewriteContext, RuleSet};
use crate::transforms::{cse, prune, verify_lambda_strict};

/// Defines a transformation over a single lambda.
///
/// The lambda is detached from `universe` while the pass runs, so the pass
/// can mutate it while still reading (or adding) other lambdas.
pub trait LambdaTransformPass {
    /// A short name, used for logging.
    fn name(&self) -> &'static str;

    /// Runs the pass, returning how many changes it made.
    ///
    /// This is expected to act as-if it was pure: running the pass again on
    /// its own output should eventually report zero changes.
    fn run(&mut self, lambda: &mut Lambda, universe: &mut Universe) -> Result<usize>;
}

/// Applies a [`RuleSet`] once to every node. See [`simplify`].
pub struct SimplifyPass {
    rules: RuleSet,
}

impl SimplifyPass {
    /// Creates a pass that applies `rules`.
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }
}

impl LambdaTransformPass for SimplifyPass {
    fn name(&self) -> &'static str {
        "simplify"
    }

    fn run(&mut self, lambda: &mut Lambda, universe: &mut Universe) -> Result<usize> {
        simplify(&mut RewriteContext::new(universe, lambda), &self.rules)
    }
}

/// Merges duplicate nodes. See [`cse`].
pub struct CsePass;

impl LambdaTransformPass for CsePass {
    fn name(&self) -> &'static str {
        "cse"
    }

    fn run(&mut self, lambda: &mut Lambda, _: &mut Universe) -> Result<usize> {
        Ok(cse(lambda))
    }
}

/// Removes nodes the output doesn't depend on. See [`prune`].
pub struct PrunePass;

impl LambdaTransformPass for PrunePass {
    fn name(&self) -> &'static str {
        "prune"
    }

    fn run(&mut self, lambda: &mut Lambda, _: &mut Universe) -> Result<usize> {
        Ok(prune(lambda))
    }
}

/// Fails with [`Error::CorruptedNode`](crate::Error::CorruptedNode) if
/// the lambda is malformed. Never changes anything.
pub struct VerifyPass;

impl LambdaTransformPass for VerifyPass {
    fn name(&self) -> &'static str {
        "verify"
    }

    fn run(&mut self, lambda: &mut Lambda, universe: &mut Universe) -> Result<usize> {
        verify_lambda_strict(universe, lambda)?;

        Ok(0)
    }
}
