//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::arena_key;
use crate::ir::Primitive;
use smallvec::SmallVec;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

arena_key! {
    /// A reference to a node in a [`Graph`](crate::ir::Graph).
    ///
    /// Keys are the identity of a node: two different keys are two different
    /// nodes even when they hold equal data.
    pub struct Node;
}

/// A short list of operands, inline for the common case.
pub type NodeList = SmallVec<[Node; 4]>;

/// The role an operand plays inside its consumer's [`Operation`].
///
/// Every role belongs to exactly one operation shape, so the set of roles on
/// a node's incoming edges determines the shape of its producer.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum Role {
    /// The callee of an [`Operation::Apply`].
    Func,
    /// The `i`th argument of an [`Operation::Apply`].
    Arg(u32),
    /// The function of an [`Operation::Closure`].
    Closure,
    /// The `i`th captured argument of an [`Operation::Closure`].
    Capture(u32),
    /// The `i`th element of an [`Operation::Tuple`].
    Elem(u32),
    /// The tuple being indexed by an [`Operation::Get`].
    Base,
    /// The index of an [`Operation::Get`].
    Index,
    /// The source of an [`Operation::Copy`].
    Source,
}

/// How a computation node produces its value.
///
/// `Apply` is the general case; the others are the sugar shapes that the
/// graph recognizes for calls to `partial`, `mktuple`, `index` and
/// `identity`. See [`Graph::install`](crate::ir::Graph::install).
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum Operation {
    /// `func(args...)`
    Apply {
        /// The callee.
        func: Node,
        /// The arguments.
        args: NodeList,
    },
    /// `partial(func, args...)`
    Closure {
        /// The function being closed over.
        func: Node,
        /// The captured arguments.
        args: NodeList,
    },
    /// `mktuple(elems...)`
    Tuple(NodeList),
    /// `index(base, index)`
    Get {
        /// The tuple.
        base: Node,
        /// The position being read.
        index: Node,
    },
    /// `identity(source)`
    Copy(Node),
}

/// The head of a canonical producer: either a real operand, or the
/// primitive implied by a sugar shape.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum Head {
    /// The callee node of an [`Operation::Apply`].
    Node(Node),
    /// The primitive a sugar shape stands for.
    Primitive(Primitive),
}

/// An operation in the uniform `(head, args...)` form that pattern matching
/// works on.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Canonical {
    /// The callee.
    pub head: Head,
    /// The arguments.
    pub args: NodeList,
}

impl Operation {
    /// Creates an `Apply` from anything iterable.
    pub fn apply(func: Node, args: impl IntoIterator<Item = Node>) -> Self {
        Operation::Apply {
            func,
            args: args.into_iter().collect(),
        }
    }

    /// Creates a `Closure` from anything iterable.
    pub fn closure(func: Node, args: impl IntoIterator<Item = Node>) -> Self {
        Operation::Closure {
            func,
            args: args.into_iter().collect(),
        }
    }

    /// Creates a `Tuple` from anything iterable.
    pub fn tuple(elems: impl IntoIterator<Item = Node>) -> Self {
        Operation::Tuple(elems.into_iter().collect())
    }

    /// Every operand together with the role it plays, in order.
    pub fn edges(&self) -> SmallVec<[(Role, Node); 8]> {
        let mut edges = SmallVec::new();

        match self {
            Operation::Apply { func, args } => {
                edges.push((Role::Func, *func));
                edges.extend(enumerate(args).map(|(i, n)| (Role::Arg(i), n)));
            }
            Operation::Closure { func, args } => {
                edges.push((Role::Closure, *func));
                edges.extend(enumerate(args).map(|(i, n)| (Role::Capture(i), n)));
            }
            Operation::Tuple(elems) => {
                edges.extend(enumerate(elems).map(|(i, n)| (Role::Elem(i), n)));
            }
            Operation::Get { base, index } => {
                edges.push((Role::Base, *base));
                edges.push((Role::Index, *index));
            }
            Operation::Copy(source) => edges.push((Role::Source, *source)),
        }

        edges
    }

    /// Every operand, in order.
    pub fn operands(&self) -> impl Iterator<Item = Node> + '_ {
        let (first, rest): (Option<Node>, &[Node]) = match self {
            Operation::Apply { func, args } | Operation::Closure { func, args } => {
                (Some(*func), args.as_slice())
            }
            Operation::Tuple(elems) => (None, elems.as_slice()),
            Operation::Get { base, index } => (Some(*base), std::slice::from_ref(index)),
            Operation::Copy(source) => (None, std::slice::from_ref(source)),
        };

        first.into_iter().chain(rest.iter().copied())
    }

    /// Creates a copy of the operation with every operand passed through `f`.
    pub fn map_operands(&self, mut f: impl FnMut(Node) -> Node) -> Self {
        match self {
            Operation::Apply { func, args } => Operation::Apply {
                func: f(*func),
                args: args.iter().map(|n| f(*n)).collect(),
            },
            Operation::Closure { func, args } => Operation::Closure {
                func: f(*func),
                args: args.iter().map(|n| f(*n)).collect(),
            },
            Operation::Tuple(elems) => Operation::Tuple(elems.iter().map(|n| f(*n)).collect()),
            Operation::Get { base, index } => Operation::Get {
                base: f(*base),
                index: f(*index),
            },
            Operation::Copy(source) => Operation::Copy(f(*source)),
        }
    }

    /// Rewrites every use of `old` to `new`. Returns whether anything changed.
    pub fn substitute(&mut self, old: Node, new: Node) -> bool {
        let mut changed = false;
        let mut swap = |n: &mut Node| {
            if *n == old {
                *n = new;
                changed = true;
            }
        };

        match self {
            Operation::Apply { func, args } | Operation::Closure { func, args } => {
                swap(func);
                args.iter_mut().for_each(&mut swap);
            }
            Operation::Tuple(elems) => elems.iter_mut().for_each(&mut swap),
            Operation::Get { base, index } => {
                swap(base);
                swap(index);
            }
            Operation::Copy(source) => swap(source),
        }

        changed
    }

    /// Converts the operation into the uniform `(head, args...)` form.
    pub fn canonical(&self) -> Canonical {
        match self {
            Operation::Apply { func, args } => Canonical {
                head: Head::Node(*func),
                args: args.clone(),
            },
            Operation::Closure { func, args } => Canonical {
                head: Head::Primitive(Primitive::Partial),
                args: std::iter::once(*func).chain(args.iter().copied()).collect(),
            },
            Operation::Tuple(elems) => Canonical {
                head: Head::Primitive(Primitive::MakeTuple),
                args: elems.clone(),
            },
            Operation::Get { base, index } => Canonical {
                head: Head::Primitive(Primitive::Index),
                args: [*base, *index].into_iter().collect(),
            },
            Operation::Copy(source) => Canonical {
                head: Head::Primitive(Primitive::Identity),
                args: std::iter::once(*source).collect(),
            },
        }
    }
}

fn enumerate(nodes: &[Node]) -> impl Iterator<Item = (u32, Node)> + '_ {
    nodes.iter().enumerate().map(|(i, n)| (i as u32, *n))
}
