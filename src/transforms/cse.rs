//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::arena::SecondaryMap;
use crate::ir::*;
use crate::utility::{SaHashMap, StructuralHasher};
use smallvec::SmallVec;

/// Merges structurally identical nodes in `lambda`.
///
/// Nodes are hashed operands-first: inputs and undefined computations by
/// identity, values by their constant, and computations by their
/// `(role, operand hash)` edges. Every node in a bucket is then merged into
/// the first node of that bucket, which only succeeds if the two really are
/// operand-wise identical.
///
/// Returns the number of nodes that were merged away. They stay in the
/// graph, unused, until the lambda is pruned.
pub fn cse(lambda: &mut Lambda) -> usize {
    let graph = lambda.graph();
    let hasher = StructuralHasher::new();
    let mut hashes = SecondaryMap::with_primary(graph.arena());
    let mut buckets: SaHashMap<u64, usize> = SaHashMap::default();
    let mut groups: Vec<SmallVec<[Node; 2]>> = Vec::default();

    for node in graph.toposort() {
        let hash = match graph.kind(node) {
            NodeKind::Input | NodeKind::Computation(None) => hasher.one((0u8, node)),
            NodeKind::Value(constant) => hasher.one((1u8, constant)),
            NodeKind::Computation(Some(op)) => {
                let edges: SmallVec<[(Role, u64); 8]> = op
                    .edges()
                    .into_iter()
                    .map(|(role, operand)| (role, hashes[operand]))
                    .collect();

                hasher.one((2u8, edges))
            }
        };

        hashes.insert(node, hash);

        match buckets.get(&hash) {
            Some(&group) => groups[group].push(node),
            None => {
                buckets.insert(hash, groups.len());
                groups.push(smallvec::smallvec![node]);
            }
        }
    }

    let mut merged = 0;

    for group in groups.iter().filter(|group| group.len() > 1) {
        let canonical = group[0];

        for &duplicate in &group[1..] {
            if merge(lambda, duplicate, canonical) {
                tracing::trace!(
                    from = %lambda.graph().tag(duplicate),
                    into = %lambda.graph().tag(canonical),
                    "merged nodes"
                );

                merged += 1;
            }
        }
    }

    merged
}

/// Tries to merge `a` into `b`.
///
/// Identical nodes trivially merge. Values merge if their constants are
/// equal. Computations merge if their producers have the same edge roles
/// and every pair of operands merges in turn. Inputs never merge with
/// anything but themselves. On success every use of `a` (including the
/// output) is redirected to `b`.
pub fn merge(lambda: &mut Lambda, a: Node, b: Node) -> bool {
    if a == b {
        return true;
    }

    let graph = lambda.graph();
    let (x, y) = match (graph.kind(a), graph.kind(b)) {
        (NodeKind::Value(x), NodeKind::Value(y)) => {
            let equal = x == y;

            if equal {
                lambda.replace(a, b);
            }

            return equal;
        }
        (NodeKind::Computation(Some(x)), NodeKind::Computation(Some(y))) => (x.edges(), y.edges()),
        _ => return false,
    };

    let mergeable = x.len() == y.len()
        && x.iter().zip(y.iter()).all(|(l, r)| l.0 == r.0)
        && x.iter().zip(y.iter()).all(|(l, r)| merge(lambda, l.1, r.1));

    if mergeable {
        lambda.replace(a, b);
    }

    mergeable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anf::*;
    use std::rc::Rc;

    fn lambda_for(f: &Rc<AnfFunction>) -> Lambda {
        let mut universe = Universe::new(Rc::new(GlobalEnv::new()));
        let id = universe.acquire(f).unwrap();

        universe.detach(id).unwrap()
    }

    #[test]
    fn duplicate_expressions_are_merged() {
        let f = FunctionBuilder::new("f")
            .params(&["x", "y"])
            .apply("a", builtin("add"), [local("x"), local("y")])
            .apply("b", builtin("add"), [local("x"), local("y")])
            .apply("c", builtin("multiply"), [local("a"), local("b")])
            .build(local("c"));
        let mut lambda = lambda_for(&f);

        assert!(cse(&mut lambda) >= 1);

        let graph = lambda.graph();
        let Some(Operation::Apply { args, .. }) = graph.operation(lambda.output()) else {
            panic!("output should still be a call");
        };

        assert_eq!(args[0], args[1]);
    }

    #[test]
    fn operand_order_matters() {
        let f = FunctionBuilder::new("f")
            .params(&["x", "y"])
            .apply("a", builtin("subtract"), [local("x"), local("y")])
            .apply("b", builtin("subtract"), [local("y"), local("x")])
            .tuple("c", [local("a"), local("b")])
            .build(local("c"));
        let mut lambda = lambda_for(&f);

        assert_eq!(cse(&mut lambda), 0);
    }

    #[test]
    fn equal_literals_are_merged() {
        let f = FunctionBuilder::new("f")
            .tuple("t", [int(1), int(1), float(1.0)])
            .build(local("t"));
        let mut lambda = lambda_for(&f);

        assert_eq!(cse(&mut lambda), 1);

        let Some(Operation::Tuple(elems)) = lambda.graph().operation(lambda.output()) else {
            panic!("output should be a tuple");
        };

        assert_eq!(elems[0], elems[1]);
        assert_ne!(elems[1], elems[2]);
    }

    #[test]
    fn merge_refuses_different_shapes() {
        let f = FunctionBuilder::new("f")
            .params(&["x", "y"])
            .tuple("a", [local("x")])
            .apply("b", builtin("negate"), [local("x")])
            .tuple("c", [local("a"), local("b")])
            .build(local("c"));
        let mut lambda = lambda_for(&f);
        let [x, y] = [lambda.params()[0], lambda.params()[1]];
        let Some(Operation::Tuple(elems)) = lambda.graph().operation(lambda.output()).cloned() else {
            panic!("output should be a tuple");
        };

        assert!(!merge(&mut lambda, x, y));
        assert!(!merge(&mut lambda, elems[0], elems[1]));
        assert!(merge(&mut lambda, x, x));
    }

    #[test]
    fn merge_recurses_into_operands() {
        let f = FunctionBuilder::new("f")
            .param("x")
            .apply("a", builtin("negate"), [local("x")])
            .apply("b", builtin("negate"), [local("x")])
            .tuple("p", [local("a")])
            .tuple("q", [local("b")])
            .tuple("r", [local("p"), local("q")])
            .build(local("r"));
        let mut lambda = lambda_for(&f);
        let Some(Operation::Tuple(elems)) = lambda.graph().operation(lambda.output()).cloned() else {
            panic!("output should be a tuple");
        };

        assert!(merge(&mut lambda, elems[1], elems[0]));

        let Some(Operation::Tuple(after)) = lambda.graph().operation(lambda.output()) else {
            panic!("output should be a tuple");
        };

        assert_eq!(after[0], after[1]);
        assert_eq!(lambda.graph().operation(elems[1]), lambda.graph().operation(elems[0]));
    }
}
