//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::anf::Symbol;
use crate::error::Result;
use crate::ir::*;
use crate::rewrite::{Rewrite, RuleSet};

/// Everything a rule handler may touch while rewriting one lambda.
///
/// The lambda being rewritten is detached from the universe for the
/// duration, so [`Universe::lambda`] returns `None` for it.
pub struct RewriteContext<'a> {
    /// The universe the lambda belongs to.
    pub universe: &'a mut Universe,
    /// The lambda being rewritten.
    pub lambda: &'a mut Lambda,
}

impl<'a> RewriteContext<'a> {
    /// Bundles a detached lambda with its universe.
    pub fn new(universe: &'a mut Universe, lambda: &'a mut Lambda) -> Self {
        Self { universe, lambda }
    }

    /// The graph being rewritten.
    pub fn graph(&self) -> &Graph {
        self.lambda.graph()
    }

    /// Creates a computation whose tag is a fresh variant of `base`.
    pub fn computation(&mut self, base: &Symbol, op: Operation) -> Node {
        let tag = self.lambda.fresh(base);

        self.lambda.graph_mut().create_computation_with(tag, op)
    }

    /// Creates a value node with a tag derived from `base`.
    pub fn value(&mut self, base: &Symbol, value: Constant) -> Node {
        let tag = self.lambda.fresh(base);

        self.lambda.graph_mut().create_value(tag, value)
    }
}

/// Runs one pass of the rules over every computation in the lambda.
///
/// Nodes created during the pass are not visited until the next pass. For
/// each node, the first rule that both matches and fires wins. Returns how
/// many nodes were changed.
pub fn simplify(cx: &mut RewriteContext<'_>, rules: &RuleSet) -> Result<usize> {
    let snapshot: Vec<Node> = cx.graph().nodes().collect();
    let mut changes = 0;

    for node in snapshot {
        if !matches!(cx.graph().kind(node), NodeKind::Computation(Some(_))) {
            continue;
        }

        for rule in rules.iter() {
            let Some(captures) = rule.pattern().matches(cx.graph(), node) else {
                continue;
            };

            let fired = match (rule.handler())(cx, node, &captures)? {
                Rewrite::Skip => false,
                Rewrite::Replace(new) if new == node => false,
                Rewrite::Replace(new) => {
                    cx.lambda.replace(node, new);

                    true
                }
                Rewrite::Install(op) => {
                    cx.lambda.graph_mut().install(node, op)?;

                    true
                }
            };

            if fired {
                tracing::debug!(
                    rule = rule.name(),
                    node = %cx.graph().tag(node),
                    lambda = %cx.lambda.name(),
                    "rewrote node"
                );

                changes += 1;

                break;
            }
        }
    }

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anf::*;
    use crate::rewrite::{Captures, Pattern, Rule};
    use std::rc::Rc;

    fn swap_operands(cx: &mut RewriteContext<'_>, _: Node, captures: &Captures) -> Result<Rewrite> {
        let sub = cx.value(&Symbol::local("sub"), Constant::from(Primitive::Subtract));

        Ok(Rewrite::Install(Operation::apply(
            sub,
            [captures.node("Y"), captures.node("X")],
        )))
    }

    fn never(_: &mut RewriteContext<'_>, _: Node, _: &Captures) -> Result<Rewrite> {
        Ok(Rewrite::Skip)
    }

    #[test]
    fn first_firing_rule_wins_once_per_pass() {
        let f = FunctionBuilder::new("f")
            .params(&["a", "b"])
            .apply("y", builtin("add"), [local("a"), local("b")])
            .build(local("y"));
        let mut universe = Universe::new(Rc::new(GlobalEnv::new()));
        let id = universe.acquire(&f).unwrap();
        let mut lambda = universe.detach(id).unwrap();
        let pattern = Pattern::apply([
            Pattern::prim(Primitive::Add),
            Pattern::var("X"),
            Pattern::var("Y"),
        ]);
        let rules = RuleSet::empty()
            .with(Rule::new("never", pattern.clone(), never))
            .with(Rule::new("swap", pattern, swap_operands));

        let mut cx = RewriteContext::new(&mut universe, &mut lambda);

        assert_eq!(simplify(&mut cx, &rules).unwrap(), 1);
        assert_eq!(simplify(&mut cx, &rules).unwrap(), 0);

        let Some(Operation::Apply { func, args }) = lambda.graph().operation(lambda.output()) else {
            panic!("output should still be a call");
        };

        assert_eq!(lambda.graph().primitive(*func), Some(Primitive::Subtract));
        assert_eq!(args.as_slice(), &[lambda.params()[1], lambda.params()[0]]);
    }
}
