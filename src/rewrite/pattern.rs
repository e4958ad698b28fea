//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::anf::Literal;
use crate::ir::*;
use smallvec::SmallVec;

/// What a pattern variable is allowed to bind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Constraint {
    /// Any node.
    Any,
    /// Only value nodes.
    Value,
    /// Only value nodes holding a lambda.
    Lambda,
}

/// A named hole in a [`Pattern`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Var {
    name: &'static str,
    constraint: Constraint,
}

impl Var {
    /// The name captures are stored under.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// What the variable may bind.
    pub fn constraint(&self) -> Constraint {
        self.constraint
    }

    fn admits(&self, graph: &Graph, node: Node) -> bool {
        match self.constraint {
            Constraint::Any => true,
            Constraint::Value => graph.value(node).is_some(),
            Constraint::Lambda => graph.lambda(node).is_some(),
        }
    }
}

/// A structural pattern over producers.
///
/// An [`Pattern::Apply`] matches a node whose producer, in `(head, args...)`
/// form, matches the sub-patterns element by element. A [`Pattern::Rest`]
/// directly after a variable makes that variable bind a (possibly empty)
/// list of nodes instead of a single node.
///
/// ```
/// # use quartz::ir::Primitive;
/// # use quartz::rewrite::Pattern;
/// // (add, (mktuple, X, ...), (mktuple, Y, ...))
/// let pattern = Pattern::apply([
///     Pattern::prim(Primitive::Add),
///     Pattern::apply([Pattern::prim(Primitive::MakeTuple), Pattern::var("X"), Pattern::rest()]),
///     Pattern::apply([Pattern::prim(Primitive::MakeTuple), Pattern::var("Y"), Pattern::rest()]),
/// ]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    /// Matches a value node holding an equal constant (numbers compare
    /// numerically), or the implied head of a sugar shape.
    Const(Constant),
    /// Binds a node, subject to its constraint.
    Var(Var),
    /// Matches a producer element by element.
    Apply(Vec<Pattern>),
    /// Turns the preceding variable into a list variable.
    Rest,
}

impl Pattern {
    /// An unconstrained variable.
    pub fn var(name: &'static str) -> Self {
        Pattern::Var(Var {
            name,
            constraint: Constraint::Any,
        })
    }

    /// A variable that only binds value nodes.
    pub fn value(name: &'static str) -> Self {
        Pattern::Var(Var {
            name,
            constraint: Constraint::Value,
        })
    }

    /// A variable that only binds lambda values.
    pub fn lambda(name: &'static str) -> Self {
        Pattern::Var(Var {
            name,
            constraint: Constraint::Lambda,
        })
    }

    /// The variadic marker.
    pub fn rest() -> Self {
        Pattern::Rest
    }

    /// A primitive constant.
    pub fn prim(prim: Primitive) -> Self {
        Pattern::Const(Constant::Primitive(prim))
    }

    /// A literal constant.
    pub fn literal(lit: impl Into<Literal>) -> Self {
        Pattern::Const(Constant::Literal(lit.into()))
    }

    /// A producer pattern.
    pub fn apply(elems: impl IntoIterator<Item = Pattern>) -> Self {
        Pattern::Apply(elems.into_iter().collect())
    }

    /// Matches `node` against the pattern, returning the bindings on success.
    pub fn matches(&self, graph: &Graph, node: Node) -> Option<Captures> {
        let mut matcher = Matcher {
            graph,
            captures: Captures::default(),
        };

        matcher.node(self, node).then_some(matcher.captures)
    }
}

impl From<Primitive> for Pattern {
    fn from(value: Primitive) -> Self {
        Pattern::prim(value)
    }
}

/// What a single variable was bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Capture {
    /// A plain variable.
    Node(Node),
    /// A variable followed by [`Pattern::Rest`].
    List(NodeList),
}

/// The bindings produced by a successful match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Captures {
    entries: SmallVec<[(&'static str, Capture); 4]>,
}

impl Captures {
    /// Gets a binding by name.
    pub fn get(&self, name: &str) -> Option<&Capture> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, capture)| capture)
    }

    /// Gets a plain variable's node.
    ///
    /// Panics if `name` isn't bound to a single node, which means the
    /// handler doesn't agree with its own pattern.
    pub fn node(&self, name: &str) -> Node {
        match self.get(name) {
            Some(Capture::Node(node)) => *node,
            other => panic!("`{name}` is not bound to a node (found {other:?})"),
        }
    }

    /// Gets a list variable's nodes.
    ///
    /// Panics if `name` isn't bound to a list.
    pub fn list(&self, name: &str) -> &[Node] {
        match self.get(name) {
            Some(Capture::List(nodes)) => nodes,
            other => panic!("`{name}` is not bound to a list (found {other:?})"),
        }
    }

    /// Number of bound variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn bind(&mut self, name: &'static str, capture: Capture) {
        self.entries.push((name, capture));
    }
}

struct Matcher<'g> {
    graph: &'g Graph,
    captures: Captures,
}

impl<'g> Matcher<'g> {
    fn node(&mut self, pattern: &Pattern, node: Node) -> bool {
        match pattern {
            Pattern::Apply(elems) => match self.graph.productor(node) {
                Some(canonical) => self.sexp(elems, &canonical),
                None => false,
            },
            Pattern::Var(var) => self.bind_node(var, node),
            Pattern::Const(expected) => self
                .graph
                .value(node)
                .map_or(false, |found| expected.matches(found)),
            Pattern::Rest => false,
        }
    }

    fn operand(&mut self, pattern: &Pattern, operand: Head) -> bool {
        match operand {
            Head::Node(node) => self.node(pattern, node),
            Head::Primitive(prim) => {
                matches!(pattern, Pattern::Const(Constant::Primitive(p)) if *p == prim)
            }
        }
    }

    fn sexp(&mut self, elems: &[Pattern], canonical: &Canonical) -> bool {
        let sexp: SmallVec<[Head; 8]> = std::iter::once(canonical.head)
            .chain(canonical.args.iter().map(|n| Head::Node(*n)))
            .collect();

        let Some(rest) = elems.iter().position(|p| matches!(p, Pattern::Rest)) else {
            return sexp.len() == elems.len() && self.all(elems, &sexp);
        };

        let Some(Pattern::Var(spliced)) = rest.checked_sub(1).map(|i| &elems[i]) else {
            return false;
        };

        let prefix = &elems[..rest - 1];
        let suffix = &elems[rest + 1..];

        if sexp.len() < prefix.len() + suffix.len() {
            return false;
        }

        let tail = sexp.len() - suffix.len();
        let mut list = NodeList::new();

        for operand in &sexp[prefix.len()..tail] {
            match operand {
                Head::Node(node) if spliced.admits(self.graph, *node) => list.push(*node),
                _ => return false,
            }
        }

        self.all(prefix, &sexp[..prefix.len()])
            && self.bind_list(spliced, list)
            && self.all(suffix, &sexp[tail..])
    }

    fn all(&mut self, patterns: &[Pattern], operands: &[Head]) -> bool {
        patterns
            .iter()
            .zip(operands)
            .all(|(pattern, operand)| self.operand(pattern, *operand))
    }

    fn same(&self, a: Node, b: Node) -> bool {
        if a == b {
            return true;
        }

        match (self.graph.value(a), self.graph.value(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    fn bind_node(&mut self, var: &Var, node: Node) -> bool {
        if !var.admits(self.graph, node) {
            return false;
        }

        match self.captures.get(var.name) {
            Some(Capture::Node(prev)) => self.same(*prev, node),
            Some(Capture::List(_)) => false,
            None => {
                self.captures.bind(var.name, Capture::Node(node));

                true
            }
        }
    }

    fn bind_list(&mut self, var: &Var, list: NodeList) -> bool {
        match self.captures.get(var.name) {
            Some(Capture::List(prev)) => {
                prev.len() == list.len()
                    && prev.iter().zip(list.iter()).all(|(a, b)| self.same(*a, *b))
            }
            Some(Capture::Node(_)) => false,
            None => {
                self.captures.bind(var.name, Capture::List(list));

                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anf::Symbol;

    struct Fixture {
        graph: Graph,
        x: Node,
        y: Node,
    }

    impl Fixture {
        fn new() -> Self {
            let mut graph = Graph::new();
            let x = graph.create_input(Symbol::local("x"));
            let y = graph.create_input(Symbol::local("y"));

            Self { graph, x, y }
        }

        fn value(&mut self, c: impl Into<Constant>) -> Node {
            self.graph.create_value(Symbol::local("v"), c.into())
        }

        fn op(&mut self, op: Operation) -> Node {
            self.graph.create_computation_with(Symbol::local("t"), op)
        }
    }

    fn tuple_of(var: &'static str) -> Pattern {
        Pattern::apply([Pattern::prim(Primitive::MakeTuple), Pattern::var(var), Pattern::rest()])
    }

    #[test]
    fn rest_binds_the_middle_of_the_producer() {
        let mut f = Fixture::new();
        let (x, y) = (f.x, f.y);
        let t = f.op(Operation::tuple([x, y, x]));

        let captures = tuple_of("X").matches(&f.graph, t).unwrap();

        assert_eq!(captures.list("X"), &[x, y, x]);

        let empty = f.op(Operation::tuple([]));

        assert!(tuple_of("X").matches(&f.graph, empty).unwrap().list("X").is_empty());
    }

    #[test]
    fn rest_with_a_suffix() {
        let mut f = Fixture::new();
        let (x, y) = (f.x, f.y);
        let add = f.value(Primitive::Add);
        let call = f.op(Operation::apply(add, [x, y, y]));
        let pattern = Pattern::apply([
            Pattern::prim(Primitive::Add),
            Pattern::var("A"),
            Pattern::rest(),
            Pattern::var("B"),
        ]);

        let captures = pattern.matches(&f.graph, call).unwrap();

        assert_eq!(captures.list("A"), &[x, y]);
        assert_eq!(captures.node("B"), y);

        let short = f.op(Operation::apply(add, []));

        assert!(pattern.matches(&f.graph, short).is_none());
    }

    #[test]
    fn repeated_variables_must_agree() {
        let mut f = Fixture::new();
        let (x, y) = (f.x, f.y);
        let add = f.value(Primitive::Add);
        let same = f.op(Operation::apply(add, [x, x]));
        let different = f.op(Operation::apply(add, [x, y]));
        let one_a = f.value(1i64);
        let one_b = f.value(1i64);
        let equal_values = f.op(Operation::apply(add, [one_a, one_b]));
        let pattern = Pattern::apply([
            Pattern::prim(Primitive::Add),
            Pattern::var("X"),
            Pattern::var("X"),
        ]);

        assert!(pattern.matches(&f.graph, same).is_some());
        assert!(pattern.matches(&f.graph, different).is_none());
        assert!(pattern.matches(&f.graph, equal_values).is_some());
    }

    #[test]
    fn constraints_filter_bindings() {
        let mut f = Fixture::new();
        let x = f.x;
        let one = f.value(1i64);
        let add = f.value(Primitive::Add);
        let folded = f.op(Operation::apply(add, [one, one]));
        let unfolded = f.op(Operation::apply(add, [one, x]));
        let pattern = Pattern::apply([Pattern::value("F"), Pattern::value("A"), Pattern::rest()]);

        assert_eq!(pattern.matches(&f.graph, folded).unwrap().list("A"), &[one, one]);
        assert!(pattern.matches(&f.graph, unfolded).is_none());
    }

    #[test]
    fn variables_never_bind_sugar_heads() {
        let mut f = Fixture::new();
        let x = f.x;
        let t = f.op(Operation::tuple([x]));
        let pattern = Pattern::apply([Pattern::var("F"), Pattern::var("X"), Pattern::rest()]);

        assert!(pattern.matches(&f.graph, t).is_none());
        assert!(tuple_of("X").matches(&f.graph, t).is_some());
    }

    #[test]
    fn literals_match_numerically() {
        let mut f = Fixture::new();
        let x = f.x;
        let mul = f.value(Primitive::Multiply);
        let one = f.value(1i64);
        let call = f.op(Operation::apply(mul, [one, x]));
        let pattern = Pattern::apply([
            Pattern::prim(Primitive::Multiply),
            Pattern::literal(1.0),
            Pattern::var("X"),
        ]);

        assert_eq!(pattern.matches(&f.graph, call).unwrap().node("X"), x);
    }

    #[test]
    fn nested_patterns_look_through_producers() {
        let mut f = Fixture::new();
        let (x, y) = (f.x, f.y);
        let j = f.value(Primitive::J);
        let jinv = f.value(Primitive::Jinv);
        let inner = f.op(Operation::apply(j, [x]));
        let outer = f.op(Operation::apply(jinv, [inner]));
        let pattern = Pattern::apply([
            Pattern::prim(Primitive::Jinv),
            Pattern::apply([Pattern::prim(Primitive::J), Pattern::var("X")]),
        ]);

        assert_eq!(pattern.matches(&f.graph, outer).unwrap().node("X"), x);
        assert!(pattern.matches(&f.graph, inner).is_none());
        assert!(pattern.matches(&f.graph, y).is_none());
    }
}
