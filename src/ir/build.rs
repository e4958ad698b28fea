//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::anf::*;
use crate::error::{MalformedBindingSnafu, Result, UnsupportedValueSnafu};
use crate::ir::*;
use crate::utility::SaHashMap;
use snafu::ensure;
use std::rc::Rc;

/// Lifts one ANF function into a [`Lambda`].
///
/// Locals map to nodes through `assoc`. Free symbols are looked up through
/// the universe and cached in `assoc` too, so every reference to the same
/// global inside one lambda shares a single value node.
pub(crate) struct LambdaBuilder<'u> {
    universe: &'u mut Universe,
    id: LambdaId,
    source: Rc<AnfFunction>,
    graph: Graph,
    names: NameGen,
    assoc: SaHashMap<Symbol, Node>,
}

impl<'u> LambdaBuilder<'u> {
    pub(crate) fn new(universe: &'u mut Universe, id: LambdaId, source: Rc<AnfFunction>) -> Self {
        Self {
            universe,
            id,
            names: NameGen::for_function(&source),
            source,
            graph: Graph::new(),
            assoc: SaHashMap::default(),
        }
    }

    pub(crate) fn build(mut self) -> Result<Lambda> {
        let source = self.source.clone();
        let mut params = Vec::with_capacity(source.params.len());

        for param in source.params.iter() {
            ensure!(
                param.is_local(),
                MalformedBindingSnafu {
                    function: source.name.clone(),
                    reason: format!("parameter `{param}` is not a local name"),
                }
            );
            ensure!(
                !self.assoc.contains_key(param),
                MalformedBindingSnafu {
                    function: source.name.clone(),
                    reason: format!("duplicate parameter `{param}`"),
                }
            );

            let node = self.graph.create_input(param.clone());

            self.assoc.insert(param.clone(), node);
            params.push(node);
        }

        for binding in source.bindings.iter() {
            self.lower_binding(binding)?;
        }

        let output = self.atom(&source.result)?;

        Ok(Lambda::new(
            self.id, source, params, output, self.graph, self.names,
        ))
    }

    fn lower_binding(&mut self, binding: &Binding) -> Result<()> {
        match &binding.target {
            Target::Name(name) => {
                let op = self.rhs(&binding.value)?;
                let node = self.define(name)?;

                self.graph.install(node, op)
            }
            Target::Tuple(_) => {
                let op = self.rhs(&binding.value)?;
                let tmp = self
                    .graph
                    .create_computation_with(self.names.fresh_named("tmp"), op);

                self.destructure(&binding.target, tmp)
            }
        }
    }

    fn destructure(&mut self, target: &Target, value: Node) -> Result<()> {
        let Target::Tuple(targets) = target else {
            unreachable!("only tuple targets are destructured")
        };

        for (i, target) in targets.iter().enumerate() {
            let index = self
                .graph
                .create_value(self.names.fresh_named("i"), Constant::from(i as i64));
            let get = Operation::Get { base: value, index };

            match target {
                Target::Name(name) => {
                    let node = self.define(name)?;

                    self.graph.install(node, get)?;
                }
                Target::Tuple(_) => {
                    let tmp = self
                        .graph
                        .create_computation_with(self.names.fresh_named("tmp"), get);

                    self.destructure(target, tmp)?;
                }
            }
        }

        Ok(())
    }

    fn define(&mut self, name: &Symbol) -> Result<Node> {
        ensure!(
            name.is_local(),
            MalformedBindingSnafu {
                function: self.source.name.clone(),
                reason: format!("cannot bind non-local `{name}`"),
            }
        );
        ensure!(
            !self.assoc.contains_key(name),
            MalformedBindingSnafu {
                function: self.source.name.clone(),
                reason: format!("`{name}` is bound more than once"),
            }
        );

        let node = self.graph.create_computation(name.clone());

        self.assoc.insert(name.clone(), node);

        Ok(node)
    }

    fn rhs(&mut self, rhs: &Rhs) -> Result<Operation> {
        Ok(match rhs {
            Rhs::Atom(atom) => Operation::Copy(self.atom(atom)?),
            Rhs::Apply { func, args } => Operation::Apply {
                func: self.atom(func)?,
                args: self.atoms(args)?,
            },
            Rhs::Closure { func, args } => Operation::Closure {
                func: self.atom(func)?,
                args: self.atoms(args)?,
            },
            Rhs::Tuple(elems) => Operation::Tuple(self.atoms(elems)?),
        })
    }

    fn atoms(&mut self, atoms: &[Atom]) -> Result<NodeList> {
        atoms.iter().map(|atom| self.atom(atom)).collect()
    }

    fn atom(&mut self, atom: &Atom) -> Result<Node> {
        match atom {
            Atom::Literal(lit) => {
                let tag = self.names.fresh_named("lit");

                Ok(self.graph.create_value(tag, Constant::Literal(lit.clone())))
            }
            Atom::Symbol(sym) => self.symbol(sym),
        }
    }

    fn symbol(&mut self, sym: &Symbol) -> Result<Node> {
        if let Some(node) = self.assoc.get(sym) {
            return Ok(*node);
        }

        ensure!(
            !sym.is_local(),
            MalformedBindingSnafu {
                function: self.source.name.clone(),
                reason: format!("`{sym}` is used before it is bound"),
            }
        );

        let constant = match self.universe.resolve(sym)? {
            Global::Primitive(prim) => Constant::Primitive(prim),
            Global::Constant(lit) => Constant::Literal(lit),
            Global::Function(func) => {
                let target = self.universe.acquire(&func)?;

                self.universe.record_import(self.id, target);

                Constant::Lambda(target)
            }
            Global::Opaque(what) => {
                return UnsupportedValueSnafu {
                    what: format!("`{sym}` is {what}"),
                }
                .fail()
            }
        };

        let node = self.graph.create_value(sym.clone(), constant);

        self.assoc.insert(sym.clone(), node);

        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use crate::anf::*;
    use crate::error::Error;
    use crate::ir::*;
    use std::rc::Rc;

    fn lift(env: GlobalEnv, f: &Rc<AnfFunction>) -> Result<(Universe, LambdaId), Error> {
        let mut universe = Universe::new(Rc::new(env));
        let id = universe.acquire(f)?;

        Ok((universe, id))
    }

    fn malformed(f: Rc<AnfFunction>) -> bool {
        matches!(
            lift(GlobalEnv::new(), &f),
            Err(Error::MalformedBinding { .. })
        )
    }

    #[test]
    fn lowers_calls_and_literals() {
        let f = FunctionBuilder::new("f")
            .param("x")
            .apply("y", builtin("add"), [local("x"), int(1)])
            .build(local("y"));
        let (universe, id) = lift(GlobalEnv::new(), &f).unwrap();
        let lambda = universe.lambda(id).unwrap();
        let graph = lambda.graph();

        let Some(Operation::Apply { func, args }) = graph.operation(lambda.output()) else {
            panic!("output should be a call");
        };

        assert_eq!(graph.primitive(*func), Some(Primitive::Add));
        assert_eq!(args[0], lambda.params()[0]);
        assert_eq!(graph.value(args[1]), Some(&Constant::from(1i64)));
        assert_eq!(graph.tag(lambda.output()), &Symbol::local("y"));
    }

    #[test]
    fn globals_share_one_value_node() {
        let f = FunctionBuilder::new("f")
            .param("x")
            .apply("a", builtin("add"), [local("x"), local("x")])
            .apply("b", builtin("add"), [local("a"), local("a")])
            .build(local("b"));
        let (universe, id) = lift(GlobalEnv::new(), &f).unwrap();
        let graph = universe.lambda(id).unwrap().graph();

        let adds = graph
            .nodes()
            .filter(|n| graph.primitive(*n) == Some(Primitive::Add))
            .count();

        assert_eq!(adds, 1);
    }

    #[test]
    fn tuple_targets_become_gets() {
        let f = FunctionBuilder::new("f")
            .param("p")
            .bind(
                Target::Tuple(vec![
                    Target::from("a"),
                    Target::Tuple(vec![Target::from("b"), Target::from("c")]),
                ]),
                Rhs::Atom(local("p")),
            )
            .tuple("r", [local("a"), local("c")])
            .build(local("r"));
        let (universe, id) = lift(GlobalEnv::new(), &f).unwrap();
        let lambda = universe.lambda(id).unwrap();
        let graph = lambda.graph();

        let Some(Operation::Tuple(elems)) = graph.operation(lambda.output()) else {
            panic!("output should be a tuple");
        };
        let Some(Operation::Get { base: inner, index }) = graph.operation(elems[1]) else {
            panic!("`c` should be a get");
        };

        assert_eq!(graph.value(*index), Some(&Constant::from(1i64)));

        let Some(Operation::Get { base: tmp, .. }) = graph.operation(*inner) else {
            panic!("nested target should read the outer tuple");
        };

        assert_eq!(graph.operation(*tmp), Some(&Operation::Copy(lambda.params()[0])));
    }

    #[test]
    fn malformed_functions_are_rejected() {
        assert!(malformed(
            FunctionBuilder::new("f").params(&["x", "x"]).build(local("x"))
        ));
        assert!(malformed(
            FunctionBuilder::new("f")
                .param("x")
                .copy("y", local("x"))
                .copy("y", local("x"))
                .build(local("y"))
        ));
        assert!(malformed(
            FunctionBuilder::new("f").copy("y", local("z")).build(local("y"))
        ));
        assert!(malformed(
            FunctionBuilder::new("f")
                .copy(Symbol::global("g"), int(1))
                .build(int(1))
        ));
    }

    #[test]
    fn unresolvable_and_opaque_globals() {
        let f = FunctionBuilder::new("f")
            .copy("y", global("m"))
            .build(local("y"));

        assert!(matches!(
            lift(GlobalEnv::new(), &f),
            Err(Error::UnresolvableSymbol { .. })
        ));
        assert!(matches!(
            lift(GlobalEnv::new().with_opaque("m", "a module"), &f),
            Err(Error::UnsupportedValue { .. })
        ));
    }

    #[test]
    fn global_functions_become_lambda_values() {
        let g = FunctionBuilder::new("g").param("x").build(local("x"));
        let f = FunctionBuilder::new("f")
            .param("x")
            .apply("y", global("g"), [local("x")])
            .build(local("y"));
        let (universe, id) = lift(GlobalEnv::new().with_function(g.clone()), &f).unwrap();
        let lambda = universe.lambda(id).unwrap();

        let Some(Operation::Apply { func, .. }) = lambda.graph().operation(lambda.output()) else {
            panic!("output should be a call");
        };
        let callee = lambda.graph().lambda(*func).unwrap();

        assert!(Rc::ptr_eq(universe.source(callee).unwrap(), &g));
        assert_eq!(universe.imports(id), &[callee]);
        assert!(!universe.is_recursive(id));
    }
}
