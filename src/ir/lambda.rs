//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::anf::{AnfFunction, Symbol};
use crate::arena_key;
use crate::ir::{Graph, Node};
use std::rc::Rc;

arena_key! {
    /// A reference to a [`Lambda`] owned by a [`Universe`](crate::ir::Universe).
    pub struct LambdaId;
}

/// Hands out fresh versions of local names.
///
/// Generated names reuse the base text of whatever they were derived from
/// and only differ in their version, so exported code stays readable.
#[derive(Clone, Debug)]
pub struct NameGen {
    next: u32,
}

impl NameGen {
    /// Creates a generator whose first fresh version is `first`.
    pub fn new(first: u32) -> Self {
        Self { next: first.max(1) }
    }

    /// Creates a generator that never collides with a name defined in `func`.
    pub fn for_function(func: &AnfFunction) -> Self {
        Self::new(func.max_local_version() + 1)
    }

    /// A fresh local with the same base name as `base`.
    pub fn fresh(&mut self, base: &Symbol) -> Symbol {
        self.fresh_named(base.name())
    }

    /// A fresh local with base name `name`.
    pub fn fresh_named(&mut self, name: &str) -> Symbol {
        let version = self.next;

        self.next += 1;

        Symbol::local(name).with_version(version)
    }
}

/// A function lifted into graph form.
///
/// The lambda owns its [`Graph`]. Its parameters are input nodes in that
/// graph and its result is whatever node `output` currently points to.
#[derive(Clone, Debug)]
pub struct Lambda {
    id: LambdaId,
    name: Symbol,
    params: Vec<Node>,
    output: Node,
    graph: Graph,
    names: NameGen,
    source: Rc<AnfFunction>,
}

impl Lambda {
    pub(crate) fn new(
        id: LambdaId,
        source: Rc<AnfFunction>,
        params: Vec<Node>,
        output: Node,
        graph: Graph,
        names: NameGen,
    ) -> Self {
        Self {
            id,
            name: source.name.clone(),
            names,
            params,
            output,
            graph,
            source,
        }
    }

    /// The identity of this lambda inside its universe.
    pub fn id(&self) -> LambdaId {
        self.id
    }

    /// The global name of the source function.
    pub fn name(&self) -> &Symbol {
        &self.name
    }

    /// Parameter nodes, in order.
    pub fn params(&self) -> &[Node] {
        &self.params
    }

    /// The node whose value the lambda returns.
    pub fn output(&self) -> Node {
        self.output
    }

    /// Points the lambda's result at a different node.
    pub fn set_output(&mut self, output: Node) {
        self.output = output;
    }

    /// The node store.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable access to the node store.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// The fresh-name generator for this lambda.
    pub fn names(&self) -> &NameGen {
        &self.names
    }

    /// A fresh local with the same base name as `base`.
    pub fn fresh(&mut self, base: &Symbol) -> Symbol {
        self.names.fresh(base)
    }

    /// The ANF function this lambda was built from.
    pub fn source(&self) -> &Rc<AnfFunction> {
        &self.source
    }

    /// Redirects every use of `old` to `new`, including the output.
    ///
    /// `old` stays in the graph, possibly unreachable, until it is pruned.
    pub fn replace(&mut self, old: Node, new: Node) -> usize {
        let mut count = self.graph.replace_uses(old, new);

        if self.output == old && old != new {
            self.output = new;
            count += 1;
        }

        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anf::*;
    use crate::arena::ArenaKey;
    use crate::ir::Operation;

    #[test]
    fn fresh_names_keep_base_and_skip_source_versions() {
        let f = FunctionBuilder::new("f")
            .param("x")
            .copy(Symbol::local("y").with_version(4), local("x"))
            .build(local("x"));
        let mut names = NameGen::for_function(&f);

        let a = names.fresh(&Symbol::local("y"));
        let b = names.fresh(&Symbol::local("y"));

        assert_eq!(a.name(), "y");
        assert_eq!(a.version(), 5);
        assert_ne!(a, b);
    }

    #[test]
    fn replace_moves_the_output() {
        let f = FunctionBuilder::new("f").param("x").build(local("x"));
        let mut graph = Graph::new();
        let x = graph.create_input(Symbol::local("x"));
        let y = graph.create_computation_with(Symbol::local("y"), Operation::Copy(x));
        let z = graph.create_computation_with(Symbol::local("z"), Operation::tuple([y]));
        let names = NameGen::for_function(&f);
        let mut lambda = Lambda::new(LambdaId::new(0), f, vec![x], y, graph, names);

        assert_eq!(lambda.replace(y, x), 2);
        assert_eq!(lambda.output(), x);
        assert_eq!(lambda.graph().operation(z), Some(&Operation::tuple([x])));
    }
}
