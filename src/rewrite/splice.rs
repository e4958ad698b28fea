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
use crate::arena::SecondaryMap;
use crate::error::{Result, UnsupportedValueSnafu};
use crate::eval::Value;
use crate::ir::*;
use crate::rewrite::RewriteContext;

/// Copies the body of `callee` into the lambda being rewritten, with its
/// parameters bound to `args`. Returns the copy of the callee's output.
///
/// Every copied node gets a fresh tag from the caller's name generator, so
/// the copy shares no nodes (and no names) with the callee or with earlier
/// copies. Returns `None` without touching anything if the callee isn't
/// attached or the argument count is wrong.
pub fn inline(cx: &mut RewriteContext<'_>, callee: LambdaId, args: &[Node]) -> Option<Node> {
    let source = cx.universe.lambda(callee)?;

    if source.params().len() != args.len() {
        return None;
    }

    let output = source.output();
    let graph = source.graph();
    let order = graph.postorder(source.params().iter().copied().chain([source.output()]));
    let mut mapping: SecondaryMap<Node, Node> = SecondaryMap::with_primary(graph.arena());
    let target = &mut *cx.lambda;

    for (&param, &arg) in source.params().iter().zip(args) {
        let tag = target.fresh(graph.tag(param));
        let copy = target
            .graph_mut()
            .create_computation_with(tag, Operation::Copy(arg));

        mapping.insert(param, copy);
    }

    for node in order {
        if mapping.contains(node) {
            continue;
        }

        let tag = target.fresh(graph.tag(node));
        let copy = match graph.kind(node) {
            NodeKind::Value(constant) => target.graph_mut().create_value(tag, constant.clone()),
            NodeKind::Computation(Some(op)) => {
                let op = op.map_operands(|n| mapping[n]);

                target.graph_mut().create_computation_with(tag, op)
            }
            NodeKind::Computation(None) | NodeKind::Input => {
                target.graph_mut().create_computation(tag)
            }
        };

        mapping.insert(node, copy);
    }

    for import in cx.universe.imports(callee).to_vec() {
        cx.universe.record_import(cx.lambda.id(), import);
    }

    Some(mapping[output])
}

/// Materializes an evaluated value as a node in the lambda being rewritten.
///
/// Scalars and primitives become value nodes. Functions are acquired and
/// become lambda values. Tuples and closures become computations over the
/// nodes of their parts.
pub fn value_to_node(cx: &mut RewriteContext<'_>, tag: &Symbol, value: &Value) -> Result<Node> {
    Ok(match value {
        Value::Primitive(prim) => cx.value(tag, Constant::Primitive(*prim)),
        Value::Function(func) => {
            let id = cx.universe.acquire(func)?;

            cx.universe.record_import(cx.lambda.id(), id);
            cx.value(tag, Constant::Lambda(id))
        }
        Value::Tuple(elems) => {
            let elems = elems
                .iter()
                .map(|elem| value_to_node(cx, tag, elem))
                .collect::<Result<NodeList>>()?;

            cx.computation(tag, Operation::Tuple(elems))
        }
        Value::Closure { func, args } => {
            let func = value_to_node(cx, tag, func)?;
            let args = args
                .iter()
                .map(|arg| value_to_node(cx, tag, arg))
                .collect::<Result<NodeList>>()?;

            cx.computation(tag, Operation::Closure { func, args })
        }
        scalar => match scalar.as_literal() {
            Some(lit) => cx.value(tag, Constant::Literal(lit)),
            None => {
                return UnsupportedValueSnafu {
                    what: scalar.to_string(),
                }
                .fail()
            }
        },
    })
}
