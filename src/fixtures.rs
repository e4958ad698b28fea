//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! ANF programs shared between tests.

use crate::anf::*;
use crate::ir::GlobalEnv;
use proptest::prelude::*;
use std::rc::Rc;

/// `fn @double(a) { b = a * 2; c = b + 1; return c }`
pub(crate) fn double() -> Rc<AnfFunction> {
    FunctionBuilder::new("double")
        .param("a")
        .apply("b", builtin("multiply"), [local("a"), int(2)])
        .apply("c", builtin("add"), [local("b"), int(1)])
        .build(local("c"))
}

/// An environment that knows `@double`.
pub(crate) fn env() -> GlobalEnv {
    GlobalEnv::new().with_function(double())
}

/// One binding of a generated program. Operands are indices that get
/// wrapped around the names of the right kind that exist so far.
#[derive(Clone, Debug)]
pub(crate) enum Step {
    Binary(&'static str, usize, usize),
    Negate(usize),
    Literal(i64),
    Copy(usize),
    Pair(usize, usize),
    Project(usize, i64),
    AddPairs(usize, usize),
    Curry(&'static str, usize, usize),
    Double(usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (prop::sample::select(vec!["add", "subtract", "multiply"]), any::<usize>(), any::<usize>())
            .prop_map(|(op, a, b)| Step::Binary(op, a, b)),
        any::<usize>().prop_map(Step::Negate),
        (-4i64..8).prop_map(Step::Literal),
        any::<usize>().prop_map(Step::Copy),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Step::Pair(a, b)),
        (any::<usize>(), -2i64..2).prop_map(|(t, k)| Step::Project(t, k)),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Step::AddPairs(a, b)),
        (prop::sample::select(vec!["add", "subtract", "multiply"]), any::<usize>(), any::<usize>())
            .prop_map(|(op, a, b)| Step::Curry(op, a, b)),
        any::<usize>().prop_map(Step::Double),
    ]
}

/// Straight-line programs over two integer parameters. Every binding is
/// used by the result, so nothing is dead on arrival.
pub(crate) fn program() -> impl Strategy<Value = Rc<AnfFunction>> {
    prop::collection::vec(step(), 1..24).prop_map(|steps| build_program(&steps))
}

pub(crate) fn build_program(steps: &[Step]) -> Rc<AnfFunction> {
    fn pick(atoms: &[Atom], n: usize) -> Atom {
        atoms[n % atoms.len()].clone()
    }

    let mut builder = FunctionBuilder::new("generated").params(&["p", "q"]);
    let mut scalars = vec![local("p"), local("q")];
    let mut pairs: Vec<Atom> = Vec::default();
    let mut names = Vec::default();

    for (i, step) in steps.iter().enumerate() {
        let name = format!("v{i}");
        let target = name.as_str();

        let is_pair = matches!(step, Step::Pair(..))
            || matches!(step, Step::AddPairs(..) if !pairs.is_empty());

        builder = match step {
            Step::Binary(op, a, b) => builder.apply(
                target,
                builtin(op),
                [pick(&scalars, *a), pick(&scalars, *b)],
            ),
            Step::Negate(a) => builder.apply(target, builtin("negate"), [pick(&scalars, *a)]),
            Step::Literal(value) => builder.copy(target, int(*value)),
            Step::Copy(a) => builder.copy(target, pick(&scalars, *a)),
            Step::Pair(a, b) => builder.tuple(target, [pick(&scalars, *a), pick(&scalars, *b)]),
            Step::Project(t, k) if !pairs.is_empty() => {
                builder.apply(target, builtin("index"), [pick(&pairs, *t), int(*k)])
            }
            Step::AddPairs(a, b) if !pairs.is_empty() => {
                builder.apply(target, builtin("add"), [pick(&pairs, *a), pick(&pairs, *b)])
            }
            Step::Project(..) | Step::AddPairs(..) => builder.copy(target, int(0)),
            Step::Curry(op, a, b) => {
                // the closure itself is only reachable through its call
                let partial = format!("{name}_partial");

                builder
                    .closure(partial.as_str(), builtin(op), [pick(&scalars, *a)])
                    .apply(target, local(&partial), [pick(&scalars, *b)])
            }
            Step::Double(a) => builder.apply(target, global("double"), [pick(&scalars, *a)]),
        };

        if is_pair {
            pairs.push(local(target));
        } else {
            scalars.push(local(target));
        }

        names.push(local(target));
    }

    builder.tuple("out", names).build(local("out"))
}
