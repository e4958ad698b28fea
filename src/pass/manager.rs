//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::error::{NoFixpointSnafu, Result};
use crate::ir::{Lambda, LambdaId, Universe};
use crate::pass::*;
use crate::rewrite::RuleSet;

/// Settings for an [`Optimizer`].
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
    max_rounds: usize,
    verify: bool,
    rules: RuleSet,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_rounds: 64,
            verify: false,
            rules: RuleSet::builtin(),
        }
    }
}

impl OptimizerConfig {
    /// The default configuration: 64 rounds, no verification, the
    /// built-in rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many rounds may run before giving up with
    /// [`Error::NoFixpoint`](crate::Error::NoFixpoint).
    pub fn with_max_rounds(self, max_rounds: usize) -> Self {
        Self { max_rounds, ..self }
    }

    /// Sets whether the lambda is verified before the first round and
    /// after every round.
    pub fn with_verify(self, verify: bool) -> Self {
        Self { verify, ..self }
    }

    /// Sets the rules used for simplification.
    pub fn with_rules(self, rules: RuleSet) -> Self {
        Self { rules, ..self }
    }

    /// The round limit.
    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// Whether verification is on.
    pub fn verify(&self) -> bool {
        self.verify
    }

    /// The simplification rules.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

/// What an optimizer run did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct OptimizeReport {
    /// Rounds run, including the final one that changed nothing.
    pub rounds: usize,
    /// Nodes changed by rewrite rules.
    pub rewrites: usize,
    /// Nodes merged away by CSE.
    pub merges: usize,
    /// Nodes removed by pruning.
    pub pruned: usize,
}

/// Runs simplification and CSE over a lambda until neither changes
/// anything, pruning after every round.
pub struct Optimizer {
    config: OptimizerConfig,
}

impl Optimizer {
    /// Creates an optimizer with the given settings.
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    /// The settings this optimizer runs with.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Optimizes the lambda `id` in place.
    ///
    /// The lambda is detached while the passes run and is always put back,
    /// even if a pass fails. If the round limit is reached the lambda keeps
    /// whatever was done so far and [`Error::NoFixpoint`](crate::Error::NoFixpoint)
    /// is returned.
    pub fn run(&self, universe: &mut Universe, id: LambdaId) -> Result<OptimizeReport> {
        let mut lambda = universe.detach(id)?;
        let result = self.run_detached(universe, &mut lambda);

        universe.attach(lambda);

        result
    }

    fn run_detached(&self, universe: &mut Universe, lambda: &mut Lambda) -> Result<OptimizeReport> {
        let span = tracing::debug_span!("optimize", lambda = %lambda.name());
        let _guard = span.enter();

        let mut simplify = SimplifyPass::new(self.config.rules.clone());
        let mut verify = self.config.verify.then_some(VerifyPass);
        let mut report = OptimizeReport::default();

        if let Some(pass) = &mut verify {
            pass.run(lambda, universe)?;
        }

        while report.rounds < self.config.max_rounds {
            let rewrites = simplify.run(lambda, universe)?;
            let merges = CsePass.run(lambda, universe)?;
            let pruned = PrunePass.run(lambda, universe)?;

            if let Some(pass) = &mut verify {
                pass.run(lambda, universe)?;
            }

            report.rounds += 1;
            report.rewrites += rewrites;
            report.merges += merges;
            report.pruned += pruned;

            tracing::debug!(round = report.rounds, rewrites, merges, pruned, "finished round");

            if rewrites + merges == 0 {
                return Ok(report);
            }
        }

        NoFixpointSnafu {
            function: lambda.name().clone(),
            rounds: self.config.max_rounds,
        }
        .fail()
    }
}

impl Universe {
    /// Optimizes one lambda with `config`. See [`Optimizer::run`].
    pub fn optimize(&mut self, id: LambdaId, config: &OptimizerConfig) -> Result<OptimizeReport> {
        Optimizer::new(config.clone()).run(self, id)
    }

    /// Optimizes every lambda in the universe, in acquisition order.
    ///
    /// Lambdas acquired while optimizing (by folding to a new function
    /// value) are optimized too.
    pub fn optimize_all(
        &mut self,
        config: &OptimizerConfig,
    ) -> Result<Vec<(LambdaId, OptimizeReport)>> {
        let optimizer = Optimizer::new(config.clone());
        let mut reports = Vec::default();

        loop {
            let Some(id) = self.lambdas().nth(reports.len()) else {
                break;
            };

            reports.push((id, optimizer.run(self, id)?));
        }

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anf::*;
    use crate::error::Error;
    use crate::eval::{Interpreter, Value};
    use crate::fixtures;
    use crate::ir::*;
    use proptest::prelude::*;
    use std::rc::Rc;

    fn optimized(env: GlobalEnv, f: &Rc<AnfFunction>) -> (Universe, LambdaId, OptimizeReport) {
        let mut universe = Universe::new(Rc::new(env));
        let id = universe.acquire(f).unwrap();
        let config = OptimizerConfig::new().with_verify(true);
        let report = universe.optimize(id, &config).unwrap();

        (universe, id, report)
    }

    #[test]
    fn constant_calls_fold_to_a_literal() {
        let f = FunctionBuilder::new("f")
            .apply("a", builtin("add"), [int(1), int(2)])
            .build(local("a"));
        let (universe, id, report) = optimized(GlobalEnv::new(), &f);
        let exported = universe.export(id).unwrap();

        assert!(exported.bindings.is_empty());
        assert_eq!(exported.result, int(3));
        assert_eq!(report.rewrites, 1);
        assert_eq!(universe.lambda(id).unwrap().graph().len(), 1);
    }

    #[test]
    fn projections_of_constant_tuples_fold_away() {
        let f = FunctionBuilder::new("f")
            .tuple("t", [int(2), int(3), int(4)])
            .apply("g", builtin("index"), [local("t"), int(1)])
            .apply("m", builtin("multiply"), [float(1.0), local("g")])
            .build(local("m"));
        let (universe, id, report) = optimized(GlobalEnv::new(), &f);
        let exported = universe.export(id).unwrap();

        assert!(exported.bindings.is_empty());
        assert_eq!(exported.result, int(3));
        assert_eq!(report.rewrites, 2);
    }

    #[test]
    fn tuple_addition_is_distributed() {
        let f = FunctionBuilder::new("f")
            .params(&["a", "b", "c", "d"])
            .tuple("l", [local("a"), local("b")])
            .tuple("r", [local("c"), local("d")])
            .apply("s", builtin("add"), [local("l"), local("r")])
            .build(local("s"));
        let (universe, id, _) = optimized(GlobalEnv::new(), &f);
        let exported = universe.export(id).unwrap();

        assert_eq!(exported.bindings.len(), 3);
        assert!(matches!(exported.bindings[2].value, Rhs::Tuple(ref elems) if elems.len() == 2));
        assert!(exported.bindings[..2].iter().all(|b| matches!(
            &b.value,
            Rhs::Apply { func, .. } if *func == builtin("add")
        )));
    }

    #[test]
    fn j_jinv_cancel_and_the_rest_is_pruned() {
        let f = FunctionBuilder::new("f")
            .param("x")
            .apply("a", builtin("J"), [local("x")])
            .apply("b", builtin("Jinv"), [local("a")])
            .build(local("b"));
        let (universe, id, report) = optimized(GlobalEnv::new(), &f);
        let lambda = universe.lambda(id).unwrap();

        assert_eq!(lambda.output(), lambda.params()[0]);
        assert_eq!(lambda.graph().len(), 1);
        assert!(report.pruned >= 4);
    }

    #[test]
    fn calls_to_known_functions_are_inlined() {
        let f = FunctionBuilder::new("f")
            .param("x")
            .apply("y", global("double"), [local("x")])
            .apply("z", global("double"), [local("y")])
            .build(local("z"));
        let (universe, id, _) = optimized(fixtures::env(), &f);
        let exported = Rc::new(universe.export(id).unwrap());
        let calls_double = exported.bindings.iter().any(|b| {
            matches!(&b.value, Rhs::Apply { func, .. } if *func == global("double"))
        });
        let interpreter = Interpreter::new(Rc::new(fixtures::env()));

        assert!(!calls_double);
        assert_eq!(exported.bindings.len(), 4);
        assert_eq!(
            interpreter.run(&exported, &[Value::Int(5)]),
            Ok(Value::Int(23))
        );
    }

    #[test]
    fn recursive_functions_reach_a_fixpoint() {
        let f = FunctionBuilder::new("f")
            .param("n")
            .apply("m", builtin("subtract"), [local("n"), int(1)])
            .apply("r", global("f"), [local("m")])
            .build(local("r"));
        let env = GlobalEnv::new().with_function(f.clone());
        let (universe, id, report) = optimized(env, &f);

        assert_eq!(report.rewrites, 0);
        assert_eq!(universe.export(id).unwrap().bindings.len(), 2);
    }

    #[test]
    fn round_limit_is_enforced() {
        let f = FunctionBuilder::new("f")
            .apply("a", builtin("add"), [int(1), int(2)])
            .build(local("a"));
        let mut universe = Universe::new(Rc::new(GlobalEnv::new()));
        let id = universe.acquire(&f).unwrap();
        let config = OptimizerConfig::new().with_max_rounds(1);

        assert_eq!(
            universe.optimize(id, &config),
            Err(Error::NoFixpoint {
                function: Symbol::global("f"),
                rounds: 1
            })
        );
        assert!(universe.lambda(id).is_some());
        assert_eq!(universe.optimize(id, &OptimizerConfig::new()).unwrap().rounds, 1);
    }

    #[test]
    fn empty_rules_only_clean_up() {
        let f = FunctionBuilder::new("f")
            .param("x")
            .apply("a", builtin("add"), [local("x"), int(1)])
            .apply("b", builtin("add"), [local("x"), int(1)])
            .apply("c", builtin("multiply"), [local("a"), local("b")])
            .build(local("c"));
        let mut universe = Universe::new(Rc::new(GlobalEnv::new()));
        let id = universe.acquire(&f).unwrap();
        let config = OptimizerConfig::new().with_rules(RuleSet::empty());
        let report = universe.optimize(id, &config).unwrap();

        assert_eq!(report.rewrites, 0);
        assert_eq!(report.merges, 2);
        assert_eq!(universe.export(id).unwrap().bindings.len(), 2);
    }

    #[test]
    fn optimize_all_covers_every_lambda() {
        let f = FunctionBuilder::new("f")
            .param("x")
            .apply("y", global("double"), [local("x")])
            .build(local("y"));
        let mut universe = Universe::new(Rc::new(fixtures::env()));

        universe.acquire(&f).unwrap();

        let reports = universe.optimize_all(&OptimizerConfig::new()).unwrap();

        assert_eq!(reports.len(), 2);
    }

    proptest! {
        #[test]
        fn optimization_reaches_a_fixpoint(f in fixtures::program()) {
            let mut universe = Universe::new(Rc::new(fixtures::env()));
            let id = universe.acquire(&f).unwrap();
            let config = OptimizerConfig::new().with_verify(true);
            let report = universe.optimize(id, &config).unwrap();

            prop_assert!(report.rounds <= config.max_rounds());
        }

        #[test]
        fn export_without_rules_round_trips(f in fixtures::program()) {
            let mut universe = Universe::new(Rc::new(fixtures::env()));
            let id = universe.acquire(&f).unwrap();
            let exported = universe.export(id).unwrap();
            let copies = f.bindings.iter().filter(|b| matches!(b.value, Rhs::Atom(_))).count();

            prop_assert_eq!(exported.params.len(), f.params.len());
            prop_assert_eq!(exported.bindings.len(), f.bindings.len() - copies);
        }

        #[test]
        fn optimization_preserves_meaning(
            f in fixtures::program(),
            p in -20i64..20,
            q in -20i64..20,
        ) {
            let env = Rc::new(fixtures::env());
            let interpreter = Interpreter::new(env.clone());
            let args = [Value::Int(p), Value::Int(q)];
            let mut universe = Universe::new(env);
            let id = universe.acquire(&f).unwrap();

            universe.optimize(id, &OptimizerConfig::new()).unwrap();

            let optimized = Rc::new(universe.export(id).unwrap());

            if let Ok(expected) = interpreter.run(&f, &args) {
                prop_assert_eq!(interpreter.run(&optimized, &args), Ok(expected));
            }
        }
    }
}
