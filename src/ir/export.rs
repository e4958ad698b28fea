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
use crate::arena::SecondaryMap;
use crate::error::{CorruptedNodeSnafu, LambdaUnavailableSnafu, Result};
use crate::ir::*;
use crate::utility::SaHashSet;
use snafu::OptionExt;

impl Universe {
    /// Converts a lambda back into ANF.
    ///
    /// Only nodes reachable from the output are emitted, operands first.
    /// Copies don't produce bindings of their own: every use of a copy is
    /// written as a use of its source. Reads from tuples are written as calls
    /// to `#index`. Names come from node tags, with fresh versions where two
    /// nodes would otherwise share a name.
    pub fn export(&self, id: LambdaId) -> Result<AnfFunction> {
        let lambda = self.lambda(id).context(LambdaUnavailableSnafu { id })?;

        Exporter::new(self, lambda).run()
    }

    /// Exports every attached lambda, in acquisition order.
    pub fn export_all(&self) -> Result<Vec<(LambdaId, AnfFunction)>> {
        self.lambdas()
            .map(|id| Ok((id, self.export(id)?)))
            .collect()
    }
}

struct Exporter<'a> {
    universe: &'a Universe,
    lambda: &'a Lambda,
    atoms: SecondaryMap<Node, Atom>,
    taken: SaHashSet<Symbol>,
    names: NameGen,
    bindings: Vec<Binding>,
}

impl<'a> Exporter<'a> {
    fn new(universe: &'a Universe, lambda: &'a Lambda) -> Self {
        Self {
            universe,
            lambda,
            atoms: SecondaryMap::with_primary(lambda.graph().arena()),
            taken: SaHashSet::default(),
            names: lambda.names().clone(),
            bindings: Vec::default(),
        }
    }

    fn run(mut self) -> Result<AnfFunction> {
        let lambda = self.lambda;
        let graph = lambda.graph();
        let mut params = Vec::with_capacity(lambda.params().len());

        for &param in lambda.params() {
            let name = self.unique(graph.tag(param));

            self.atoms.insert(param, Atom::Symbol(name.clone()));
            params.push(name);
        }

        for node in graph.postorder([lambda.output()]) {
            if self.atoms.contains(node) {
                continue;
            }

            let atom = self.emit(node)?;

            self.atoms.insert(node, atom);
        }

        Ok(AnfFunction {
            name: lambda.name().clone(),
            params,
            result: self.atoms[lambda.output()].clone(),
            bindings: self.bindings,
        })
    }

    fn emit(&mut self, node: Node) -> Result<Atom> {
        let lambda = self.lambda;
        let graph = lambda.graph();
        let tag = graph.tag(node);

        let op = match graph.kind(node) {
            NodeKind::Input => return Ok(Atom::Symbol(self.unique(tag))),
            NodeKind::Value(constant) => return self.constant(constant),
            NodeKind::Computation(Some(op)) => op,
            NodeKind::Computation(None) => {
                return CorruptedNodeSnafu {
                    tag: tag.clone(),
                    reason: "reachable node has no producer",
                }
                .fail()
            }
        };

        let rhs = match op {
            Operation::Copy(source) => return Ok(self.atoms[*source].clone()),
            Operation::Apply { func, args } => Rhs::Apply {
                func: self.atoms[*func].clone(),
                args: self.list(args),
            },
            Operation::Closure { func, args } => Rhs::Closure {
                func: self.atoms[*func].clone(),
                args: self.list(args),
            },
            Operation::Tuple(elems) => Rhs::Tuple(self.list(elems)),
            Operation::Get { base, index } => Rhs::Apply {
                func: Atom::Symbol(Symbol::builtin(Primitive::Index.name())),
                args: vec![self.atoms[*base].clone(), self.atoms[*index].clone()],
            },
        };

        let name = self.unique(tag);

        self.bindings.push(Binding {
            target: Target::Name(name.clone()),
            value: rhs,
        });

        Ok(Atom::Symbol(name))
    }

    fn list(&self, nodes: &[Node]) -> Vec<Atom> {
        nodes.iter().map(|n| self.atoms[*n].clone()).collect()
    }

    fn constant(&self, constant: &Constant) -> Result<Atom> {
        Ok(match constant {
            Constant::Literal(lit) => Atom::Literal(lit.clone()),
            Constant::Primitive(prim) => Atom::Symbol(Symbol::builtin(prim.name())),
            Constant::Lambda(id) => {
                let source = self
                    .universe
                    .source(*id)
                    .context(LambdaUnavailableSnafu { id: *id })?;

                Atom::Symbol(source.name.clone())
            }
        })
    }

    fn unique(&mut self, tag: &Symbol) -> Symbol {
        let mut name = Symbol::local(tag.name()).with_version(tag.version());

        while !self.taken.insert(name.clone()) {
            name = self.names.fresh(tag);
        }

        name
    }
}
