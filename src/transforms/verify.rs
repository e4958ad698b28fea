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
use crate::arena::SecondarySet;
use crate::error::{Error, Result};
use crate::ir::*;

/// Verifies that a lambda's graph is well-formed.
///
/// This checks that the parameters are inputs, that every operand still
/// exists, that everything reachable from the output has a producer, that
/// the graph is acyclic, that constructor calls were normalized, and that
/// every lambda constant is known to the universe.
///
/// If it isn't, this function returns a list of errors and the tag of the
/// node that caused each one.
pub fn verify_lambda(universe: &Universe, lambda: &Lambda) -> Result<(), Vec<(String, Symbol)>> {
    let mut verifier = Verifier {
        universe,
        lambda,
        errors: Vec::default(),
    };

    verifier.walk();

    if verifier.errors.is_empty() {
        Ok(())
    } else {
        Err(verifier.errors)
    }
}

/// This is [`verify_lambda`], except that the first problem is turned into
/// an [`Error::CorruptedNode`].
pub fn verify_lambda_strict(universe: &Universe, lambda: &Lambda) -> Result<()> {
    match verify_lambda(universe, lambda) {
        Ok(()) => Ok(()),
        Err(mut errors) => {
            let (reason, tag) = errors.swap_remove(0);

            Err(Error::CorruptedNode { tag, reason })
        }
    }
}

macro_rules! verify_assert {
    ($self:expr, $tag:expr, $cond:expr, $explanation:expr) => {
        if !($cond) {
            $self.errors.push((($explanation).to_string(), ($tag).clone()));
        }
    };
}

struct Verifier<'a> {
    universe: &'a Universe,
    lambda: &'a Lambda,
    errors: Vec<(String, Symbol)>,
}

impl<'a> Verifier<'a> {
    fn walk(&mut self) {
        let lambda = self.lambda;
        let graph = lambda.graph();
        let name = lambda.name();

        for (i, &param) in lambda.params().iter().enumerate() {
            verify_assert!(self, name, graph.contains(param), "parameter was removed");

            if graph.contains(param) {
                verify_assert!(
                    self,
                    graph.tag(param),
                    graph.is_input(param),
                    "parameter is not an input node"
                );
                verify_assert!(
                    self,
                    graph.tag(param),
                    !lambda.params()[..i].contains(&param),
                    "node is used as more than one parameter"
                );
            }
        }

        verify_assert!(
            self,
            name,
            graph.contains(lambda.output()),
            "output refers to a removed node"
        );

        for node in graph.nodes() {
            self.node(node);
        }

        if self.errors.is_empty() {
            self.reachable_defined();
        }
    }

    fn node(&mut self, node: Node) {
        let lambda = self.lambda;
        let graph = lambda.graph();
        let tag = graph.tag(node);

        match graph.kind(node) {
            NodeKind::Value(Constant::Lambda(id)) => {
                verify_assert!(
                    self,
                    tag,
                    self.universe.source(*id).is_some(),
                    "value refers to an unknown lambda"
                );
            }
            NodeKind::Computation(Some(op)) => {
                for operand in op.operands() {
                    verify_assert!(
                        self,
                        tag,
                        graph.contains(operand),
                        "operand refers to a removed node"
                    );
                }

                if let Operation::Apply { func, args } = op {
                    if graph.contains(*func) {
                        let normalizable = match graph.primitive(*func) {
                            Some(Primitive::MakeTuple) => true,
                            Some(Primitive::Partial) => !args.is_empty(),
                            Some(Primitive::Index) => args.len() == 2,
                            Some(Primitive::Identity) => args.len() == 1,
                            _ => false,
                        };

                        verify_assert!(
                            self,
                            tag,
                            !normalizable,
                            "constructor call was not normalized"
                        );
                    }
                }
            }
            _ => {}
        }
    }

    // same walk as `Graph::postorder`, but cycles are reported, not fatal
    fn reachable_defined(&mut self) {
        let lambda = self.lambda;
        let graph = lambda.graph();
        let mut done = SecondarySet::with_primary(graph.arena());
        let mut active = SecondarySet::with_primary(graph.arena());
        let mut stack = vec![(lambda.output(), false)];

        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                active.remove(node);
                done.insert(node);
                continue;
            }

            if done.contains(node) {
                continue;
            }

            if !active.insert(node) {
                self.errors
                    .push(("node depends on itself".to_owned(), graph.tag(node).clone()));

                return;
            }

            stack.push((node, true));

            match graph.kind(node) {
                NodeKind::Computation(Some(op)) => {
                    stack.extend(op.operands().filter(|n| !done.contains(*n)).map(|n| (n, false)));
                }
                NodeKind::Computation(None) => {
                    self.errors.push((
                        "reachable node has no producer".to_owned(),
                        graph.tag(node).clone(),
                    ));
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anf::*;
    use std::rc::Rc;

    fn lifted() -> (Universe, LambdaId) {
        let f = FunctionBuilder::new("f")
            .param("x")
            .tuple("t", [local("x"), int(1)])
            .destructure(&["a", "b"], local("t"))
            .apply("y", builtin("add"), [local("a"), local("b")])
            .build(local("y"));
        let mut universe = Universe::new(Rc::new(GlobalEnv::new()));
        let id = universe.acquire(&f).unwrap();

        (universe, id)
    }

    #[test]
    fn freshly_built_lambdas_verify() {
        let (universe, id) = lifted();

        assert_eq!(verify_lambda(&universe, universe.lambda(id).unwrap()), Ok(()));
    }

    #[test]
    fn detects_missing_producers() {
        let (mut universe, id) = lifted();
        let mut lambda = universe.detach(id).unwrap();
        let hole = lambda.graph_mut().create_computation(Symbol::local("hole"));

        lambda.set_output(hole);

        let errors = verify_lambda(&universe, &lambda).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].1, Symbol::local("hole"));
        assert!(matches!(
            verify_lambda_strict(&universe, &lambda),
            Err(Error::CorruptedNode { .. })
        ));
    }

    #[test]
    fn detects_cycles() {
        let (mut universe, id) = lifted();
        let mut lambda = universe.detach(id).unwrap();
        let output = lambda.output();
        let a = lambda.graph_mut().create_computation(Symbol::local("a"));

        lambda.graph_mut().install(a, Operation::Copy(output)).unwrap();
        lambda.graph_mut().install(output, Operation::Copy(a)).unwrap();

        let errors = verify_lambda(&universe, &lambda).unwrap_err();

        assert!(errors.iter().any(|(msg, _)| msg.contains("itself")));
    }

    #[test]
    fn detects_dangling_operands() {
        let (mut universe, id) = lifted();
        let mut lambda = universe.detach(id).unwrap();
        let x = lambda.params()[0];
        let t = lambda
            .graph_mut()
            .create_computation_with(Symbol::local("t"), Operation::tuple([x]));

        lambda.graph_mut().retain(|node, _| node != x);
        lambda.set_output(t);

        assert!(verify_lambda(&universe, &lambda).is_err());
    }
}
