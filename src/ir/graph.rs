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
use crate::arena::{ArenaMap, SecondarySet};
use crate::error::{CorruptedNodeSnafu, Result};
use crate::ir::*;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// What kind of node something is.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum NodeKind {
    /// A formal parameter of the enclosing lambda.
    Input,
    /// A node whose value is computed by an [`Operation`]. The producer is
    /// `None` only while a graph is being built or spliced.
    Computation(Option<Operation>),
    /// A constant: a literal, a primitive or another lambda.
    Value(Constant),
}

/// The data stored for a single node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct NodeData {
    tag: Symbol,
    kind: NodeKind,
}

impl NodeData {
    /// The name the node was created with. Only used for naming on export.
    pub fn tag(&self) -> &Symbol {
        &self.tag
    }

    /// The kind of the node.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }
}

/// The node store of a single lambda.
///
/// Every edge in the graph lives inside some computation's [`Operation`],
/// so a node's producer is exactly its installed operation and "all uses
/// of a node" is a scan over every operation.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: ArenaMap<Node, NodeData>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parameter node.
    pub fn create_input(&mut self, tag: Symbol) -> Node {
        self.nodes.insert(NodeData {
            tag,
            kind: NodeKind::Input,
        })
    }

    /// Creates a value node.
    pub fn create_value(&mut self, tag: Symbol, value: Constant) -> Node {
        self.nodes.insert(NodeData {
            tag,
            kind: NodeKind::Value(value),
        })
    }

    /// Creates a computation node without a producer yet.
    pub fn create_computation(&mut self, tag: Symbol) -> Node {
        self.nodes.insert(NodeData {
            tag,
            kind: NodeKind::Computation(None),
        })
    }

    /// Creates a computation node and installs `op` as its producer.
    pub fn create_computation_with(&mut self, tag: Symbol, op: Operation) -> Node {
        let op = self.normalize(op);

        self.nodes.insert(NodeData {
            tag,
            kind: NodeKind::Computation(Some(op)),
        })
    }

    /// Installs `op` as the producer of `node`, replacing any previous one.
    ///
    /// Calls to the constructor primitives are normalized into their sugar
    /// shapes first: `mktuple(a...)` becomes a [`Operation::Tuple`],
    /// `partial(f, a...)` a [`Operation::Closure`], `index(t, i)` a
    /// [`Operation::Get`] and `identity(x)` a [`Operation::Copy`]. This keeps
    /// a single representation for each of those shapes.
    ///
    /// Fails if `node` is an input or a value.
    pub fn install(&mut self, node: Node, op: Operation) -> Result<()> {
        let op = self.normalize(op);
        let data = &mut self.nodes[node];

        match &mut data.kind {
            NodeKind::Computation(producer) => {
                *producer = Some(op);

                Ok(())
            }
            NodeKind::Input => CorruptedNodeSnafu {
                tag: data.tag.clone(),
                reason: "cannot install a producer on an input",
            }
            .fail(),
            NodeKind::Value(_) => CorruptedNodeSnafu {
                tag: data.tag.clone(),
                reason: "cannot install a producer on a value",
            }
            .fail(),
        }
    }

    fn normalize(&self, op: Operation) -> Operation {
        let Operation::Apply { func, args } = op else {
            return op;
        };

        match self.primitive(func) {
            Some(Primitive::MakeTuple) => Operation::Tuple(args),
            Some(Primitive::Partial) if !args.is_empty() => Operation::Closure {
                func: args[0],
                args: args[1..].iter().copied().collect(),
            },
            Some(Primitive::Index) if args.len() == 2 => Operation::Get {
                base: args[0],
                index: args[1],
            },
            Some(Primitive::Identity) if args.len() == 1 => Operation::Copy(args[0]),
            _ => Operation::Apply { func, args },
        }
    }

    /// Checks if a node exists in the graph.
    #[inline]
    pub fn contains(&self, node: Node) -> bool {
        self.nodes.contains(node)
    }

    /// Gets the data for a node.
    #[inline]
    pub fn data(&self, node: Node) -> &NodeData {
        &self.nodes[node]
    }

    /// Gets the kind of a node.
    #[inline]
    pub fn kind(&self, node: Node) -> &NodeKind {
        &self.nodes[node].kind
    }

    /// Gets the tag of a node.
    #[inline]
    pub fn tag(&self, node: Node) -> &Symbol {
        &self.nodes[node].tag
    }

    /// Gets the installed producer of a computation node.
    pub fn operation(&self, node: Node) -> Option<&Operation> {
        match &self.nodes[node].kind {
            NodeKind::Computation(op) => op.as_ref(),
            _ => None,
        }
    }

    /// Gets the constant of a value node.
    pub fn value(&self, node: Node) -> Option<&Constant> {
        match &self.nodes[node].kind {
            NodeKind::Value(c) => Some(c),
            _ => None,
        }
    }

    /// Gets the primitive held by a value node.
    pub fn primitive(&self, node: Node) -> Option<Primitive> {
        self.value(node).and_then(Constant::as_primitive)
    }

    /// Gets the lambda held by a value node.
    pub fn lambda(&self, node: Node) -> Option<LambdaId> {
        self.value(node).and_then(Constant::as_lambda)
    }

    /// Whether `node` is a parameter.
    pub fn is_input(&self, node: Node) -> bool {
        matches!(self.nodes[node].kind, NodeKind::Input)
    }

    /// The producer of `node` in `(head, args...)` form, or `None` for inputs,
    /// values and undefined computations.
    pub fn productor(&self, node: Node) -> Option<Canonical> {
        self.operation(node).map(Operation::canonical)
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node currently in the graph, in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.nodes.keys()
    }

    /// The underlying arena. Used for sizing secondary maps.
    pub fn arena(&self) -> &ArenaMap<Node, NodeData> {
        &self.nodes
    }

    /// Every node whose producer uses `node`.
    pub fn users(&self, node: Node) -> Vec<Node> {
        self.nodes
            .iter()
            .filter(|(_, data)| match &data.kind {
                NodeKind::Computation(Some(op)) => op.operands().any(|n| n == node),
                _ => false,
            })
            .map(|(user, _)| user)
            .collect()
    }

    /// Redirects every use of `old` to `new`. Returns the number of producers
    /// that changed.
    pub fn replace_uses(&mut self, old: Node, new: Node) -> usize {
        if old == new {
            return 0;
        }

        let mut count = 0;

        for (_, data) in self.nodes.iter_mut() {
            if let NodeKind::Computation(Some(op)) = &mut data.kind {
                count += op.substitute(old, new) as usize;
            }
        }

        count
    }

    /// Removes every node that `keep` rejects. Returns how many were removed.
    pub fn retain(&mut self, mut keep: impl FnMut(Node, &NodeData) -> bool) -> usize {
        self.nodes.retain(|node, data| keep(node, data))
    }

    /// The set of nodes reachable from `roots` through producer edges.
    pub fn reachable(&self, roots: impl IntoIterator<Item = Node>) -> SecondarySet<Node> {
        let mut seen = SecondarySet::with_primary(&self.nodes);
        let mut worklist: Vec<Node> = roots.into_iter().collect();

        while let Some(node) = worklist.pop() {
            if !seen.insert(node) {
                continue;
            }

            if let Some(op) = self.operation(node) {
                worklist.extend(op.operands().filter(|n| !seen.contains(*n)));
            }
        }

        seen
    }

    /// Every node reachable from `roots`, operands before their users.
    ///
    /// Panics if the reachable part of the graph has a cycle.
    pub fn postorder(&self, roots: impl IntoIterator<Item = Node>) -> Vec<Node> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut done = SecondarySet::with_primary(&self.nodes);
        let mut active = SecondarySet::with_primary(&self.nodes);
        let mut stack: Vec<(Node, bool)> = Vec::default();

        for root in roots {
            stack.push((root, false));

            while let Some((node, expanded)) = stack.pop() {
                if expanded {
                    active.remove(node);
                    done.insert(node);
                    order.push(node);
                    continue;
                }

                if done.contains(node) {
                    continue;
                }

                if !active.insert(node) {
                    panic!("cycle detected through node `{}`", self.tag(node));
                }

                stack.push((node, true));

                if let Some(op) = self.operation(node) {
                    for operand in op.operands().collect::<Vec<_>>().into_iter().rev() {
                        if !done.contains(operand) {
                            stack.push((operand, false));
                        }
                    }
                }
            }
        }

        order
    }

    /// Every node in the graph, operands before their users.
    ///
    /// Panics if the graph has a cycle.
    pub fn toposort(&self) -> Vec<Node> {
        self.postorder(self.nodes.keys().collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Symbol {
        Symbol::local(name)
    }

    #[test]
    fn install_rejects_inputs_and_values() {
        let mut graph = Graph::new();
        let x = graph.create_input(sym("x"));
        let one = graph.create_value(sym("one"), Constant::from(1i64));

        assert!(graph.install(x, Operation::Copy(one)).is_err());
        assert!(graph.install(one, Operation::Copy(x)).is_err());
    }

    #[test]
    fn constructor_calls_are_normalized() {
        let mut graph = Graph::new();
        let x = graph.create_input(sym("x"));
        let mktuple = graph.create_value(sym("mktuple"), Primitive::MakeTuple.into());
        let partial = graph.create_value(sym("partial"), Primitive::Partial.into());
        let index = graph.create_value(sym("index"), Primitive::Index.into());
        let identity = graph.create_value(sym("identity"), Primitive::Identity.into());

        let t = graph.create_computation_with(sym("t"), Operation::apply(mktuple, [x, x]));
        let c = graph.create_computation_with(sym("c"), Operation::apply(partial, [x, t]));
        let g = graph.create_computation_with(sym("g"), Operation::apply(index, [t, x]));
        let y = graph.create_computation_with(sym("y"), Operation::apply(identity, [g]));

        assert_eq!(graph.operation(t), Some(&Operation::tuple([x, x])));
        assert_eq!(graph.operation(c), Some(&Operation::closure(x, [t])));
        assert_eq!(graph.operation(g), Some(&Operation::Get { base: t, index: x }));
        assert_eq!(graph.operation(y), Some(&Operation::Copy(g)));

        // wrong arity stays a plain call
        let z = graph.create_computation_with(sym("z"), Operation::apply(identity, [x, x]));

        assert_eq!(graph.operation(z), Some(&Operation::apply(identity, [x, x])));
    }

    #[test]
    fn each_computation_has_one_producer() {
        let mut graph = Graph::new();
        let x = graph.create_input(sym("x"));
        let add = graph.create_value(sym("add"), Primitive::Add.into());
        let y = graph.create_computation(sym("y"));

        assert_eq!(graph.productor(y), None);

        graph.install(y, Operation::apply(add, [x, x])).unwrap();
        graph.install(y, Operation::apply(add, [x])).unwrap();

        let canonical = graph.productor(y).unwrap();

        assert_eq!(canonical.head, Head::Node(add));
        assert_eq!(canonical.args.as_slice(), &[x]);
        assert_eq!(graph.productor(x), None);
        assert_eq!(graph.productor(add), None);
    }

    #[test]
    fn replace_uses_rewrites_every_consumer() {
        let mut graph = Graph::new();
        let x = graph.create_input(sym("x"));
        let y = graph.create_input(sym("y"));
        let t = graph.create_computation_with(sym("t"), Operation::tuple([x, x]));
        let u = graph.create_computation_with(sym("u"), Operation::Copy(x));

        assert_eq!(graph.users(x), vec![t, u]);
        assert_eq!(graph.replace_uses(x, y), 2);
        assert!(graph.users(x).is_empty());
        assert_eq!(graph.operation(t), Some(&Operation::tuple([y, y])));
    }

    #[test]
    fn postorder_puts_operands_first() {
        let mut graph = Graph::new();
        let x = graph.create_input(sym("x"));
        let b = graph.create_computation(sym("b"));
        let a = graph.create_computation_with(sym("a"), Operation::Copy(x));

        graph.install(b, Operation::tuple([a, x])).unwrap();

        let order = graph.postorder([b]);
        let pos = |n: Node| order.iter().position(|m| *m == n).unwrap();

        assert_eq!(order.len(), 3);
        assert!(pos(x) < pos(a));
        assert!(pos(a) < pos(b));
        assert_eq!(graph.toposort().len(), 3);
    }

    #[test]
    #[should_panic]
    fn postorder_panics_on_cycles() {
        let mut graph = Graph::new();
        let a = graph.create_computation(sym("a"));
        let b = graph.create_computation_with(sym("b"), Operation::Copy(a));

        graph.install(a, Operation::Copy(b)).unwrap();
        graph.toposort();
    }

    #[test]
    fn reachable_follows_producers() {
        let mut graph = Graph::new();
        let x = graph.create_input(sym("x"));
        let dead = graph.create_computation_with(sym("dead"), Operation::Copy(x));
        let live = graph.create_computation_with(sym("live"), Operation::tuple([x]));
        let seen = graph.reachable([live]);

        assert!(seen.contains(live));
        assert!(seen.contains(x));
        assert!(!seen.contains(dead));
    }
}
