//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::error::Result;
use crate::eval::Value;
use crate::ir::*;
use crate::rewrite::{inline, value_to_node, Captures, Pattern, RewriteContext};

/// What a rule handler decided to do with a matched node.
#[derive(Clone, Debug, PartialEq)]
pub enum Rewrite {
    /// The pattern matched but a precondition didn't hold.
    Skip,
    /// Give the node a new producer. Its identity is kept, so its users
    /// don't change.
    Install(Operation),
    /// Redirect every user of the node (and the output) to another node.
    Replace(Node),
}

/// The function a rule runs when its pattern matches.
pub type Handler = fn(&mut RewriteContext<'_>, Node, &Captures) -> Result<Rewrite>;

/// A pattern and what to do when it matches.
#[derive(Clone, Debug)]
pub struct Rule {
    name: &'static str,
    pattern: Pattern,
    handler: Handler,
}

impl Rule {
    /// Creates a rule.
    pub fn new(name: &'static str, pattern: Pattern, handler: Handler) -> Self {
        Self {
            name,
            pattern,
            handler,
        }
    }

    /// The rule's name, used in logs and by [`RuleSet::without`].
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The pattern the rule matches.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The handler.
    pub fn handler(&self) -> Handler {
        self.handler
    }
}

/// An ordered table of rules. Earlier rules get the first chance at a node.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// A table with no rules.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in rules, in priority order.
    ///
    /// Inlining comes before constant folding, so calls to known lambdas
    /// are only folded when they can't be inlined.
    pub fn builtin() -> Self {
        use Pattern as P;
        use Primitive::*;

        let tuple = |var| P::apply([P::prim(MakeTuple), P::var(var), P::rest()]);

        Self::empty()
            .with(Rule::new(
                "add_tuples",
                P::apply([P::prim(Add), tuple("X"), tuple("Y")]),
                add_tuples,
            ))
            .with(Rule::new(
                "multiply_by_one",
                P::apply([P::prim(Multiply), P::literal(1.0), P::var("X")]),
                multiply_by_one,
            ))
            .with(Rule::new(
                "take_index",
                P::apply([P::prim(Index), tuple("X"), P::value("V")]),
                take_index,
            ))
            .with(Rule::new(
                "distribute_j_switch",
                P::apply([
                    P::prim(J),
                    P::apply([P::prim(Switch), P::var("X"), P::var("Y"), P::var("Z")]),
                ]),
                distribute_j_switch,
            ))
            .with(Rule::new(
                "cancel_jinv_j",
                P::apply([P::prim(Jinv), P::apply([P::prim(J), P::var("X")])]),
                cancel_inverse,
            ))
            .with(Rule::new(
                "cancel_j_jinv",
                P::apply([P::prim(J), P::apply([P::prim(Jinv), P::var("X")])]),
                cancel_inverse,
            ))
            .with(Rule::new(
                "inline",
                P::apply([P::lambda("L"), P::var("X"), P::rest()]),
                inline_call,
            ))
            .with(Rule::new(
                "call_partial",
                P::apply([
                    P::apply([P::prim(Partial), P::var("X"), P::var("Y"), P::rest()]),
                    P::var("Z"),
                    P::rest(),
                ]),
                call_partial,
            ))
            .with(Rule::new(
                "fold_constant",
                P::apply([P::value("F"), P::value("A"), P::rest()]),
                fold_constant,
            ))
            .with(Rule::new(
                "drop_copy",
                P::apply([P::prim(Identity), P::var("X")]),
                drop_copy,
            ))
    }

    /// Appends a rule.
    pub fn with(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Removes every rule named `name`.
    pub fn without(mut self, name: &str) -> Self {
        self.rules.retain(|rule| rule.name != name);
        self
    }

    /// Iterates over the rules in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.rules.iter()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn callee(graph: &Graph, node: Node) -> Node {
    match graph.operation(node) {
        Some(Operation::Apply { func, .. }) => *func,
        other => unreachable!("pattern only matches calls, found {other:?}"),
    }
}

fn add_tuples(cx: &mut RewriteContext<'_>, node: Node, captures: &Captures) -> Result<Rewrite> {
    let (xs, ys) = (captures.list("X"), captures.list("Y"));

    if xs.len() != ys.len() {
        return Ok(Rewrite::Skip);
    }

    let add = callee(cx.graph(), node);
    let tag = cx.graph().tag(node).clone();
    let elems = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| cx.computation(&tag, Operation::apply(add, [*x, *y])))
        .collect();

    Ok(Rewrite::Install(Operation::Tuple(elems)))
}

fn multiply_by_one(_: &mut RewriteContext<'_>, _: Node, captures: &Captures) -> Result<Rewrite> {
    Ok(Rewrite::Replace(captures.node("X")))
}

fn take_index(cx: &mut RewriteContext<'_>, _: Node, captures: &Captures) -> Result<Rewrite> {
    let elems = captures.list("X");
    let index = cx
        .graph()
        .value(captures.node("V"))
        .and_then(Constant::as_literal)
        .and_then(|lit| lit.as_int());

    let Some(index) = index else {
        return Ok(Rewrite::Skip);
    };

    let len = elems.len() as i64;
    let index = if index < 0 { index + len } else { index };

    Ok(match usize::try_from(index) {
        Ok(i) if i < elems.len() => Rewrite::Replace(elems[i]),
        _ => Rewrite::Skip,
    })
}

fn distribute_j_switch(
    cx: &mut RewriteContext<'_>,
    node: Node,
    captures: &Captures,
) -> Result<Rewrite> {
    let graph = cx.graph();
    let j = callee(graph, node);
    let switch = match graph.operation(node) {
        Some(Operation::Apply { args, .. }) => callee(graph, args[0]),
        _ => return Ok(Rewrite::Skip),
    };

    let tmps = ["X", "Y", "Z"].map(|var| {
        let operand = captures.node(var);
        let tag = cx.graph().tag(operand).clone();

        cx.computation(&tag, Operation::apply(j, [operand]))
    });

    Ok(Rewrite::Install(Operation::apply(switch, tmps)))
}

fn cancel_inverse(_: &mut RewriteContext<'_>, _: Node, captures: &Captures) -> Result<Rewrite> {
    Ok(Rewrite::Replace(captures.node("X")))
}

fn inline_call(cx: &mut RewriteContext<'_>, node: Node, captures: &Captures) -> Result<Rewrite> {
    let Some(target) = cx.graph().lambda(captures.node("L")) else {
        return Ok(Rewrite::Skip);
    };

    if target == cx.lambda.id() || cx.universe.is_recursive(target) {
        tracing::trace!(lambda = %target, "refusing to inline a recursive lambda");

        return Ok(Rewrite::Skip);
    }

    match inline(cx, target, captures.list("X")) {
        Some(output) => Ok(Rewrite::Install(Operation::Copy(output))),
        None => {
            tracing::trace!(
                lambda = %target,
                node = %cx.graph().tag(node),
                "callee is unavailable or the arity doesn't match"
            );

            Ok(Rewrite::Skip)
        }
    }
}

fn call_partial(_: &mut RewriteContext<'_>, _: Node, captures: &Captures) -> Result<Rewrite> {
    let args = captures
        .list("Y")
        .iter()
        .chain(captures.list("Z"))
        .copied();

    Ok(Rewrite::Install(Operation::apply(captures.node("X"), args)))
}

fn fold_constant(cx: &mut RewriteContext<'_>, node: Node, captures: &Captures) -> Result<Rewrite> {
    let Some(func) = evaluable(cx, captures.node("F")) else {
        return Ok(Rewrite::Skip);
    };

    let mut args = Vec::with_capacity(captures.list("A").len());

    for &arg in captures.list("A") {
        match evaluable(cx, arg) {
            Some(value) => args.push(value),
            None => return Ok(Rewrite::Skip),
        }
    }

    let result = match cx.universe.evaluator().call(&func, &args) {
        Ok(result) => result,
        Err(err) => {
            tracing::trace!(node = %cx.graph().tag(node), error = %err, "not folding");

            return Ok(Rewrite::Skip);
        }
    };

    let tag = cx.graph().tag(node).clone();

    Ok(match value_to_node(cx, &tag, &result)? {
        folded if cx.graph().value(folded).is_some() => Rewrite::Replace(folded),
        folded => Rewrite::Install(Operation::Copy(folded)),
    })
}

// the value a constant node holds at runtime, if folding may use it
fn evaluable(cx: &RewriteContext<'_>, node: Node) -> Option<Value> {
    match cx.graph().value(node)? {
        Constant::Primitive(Primitive::Partial) => None,
        Constant::Primitive(prim) => Some(Value::Primitive(*prim)),
        Constant::Literal(lit) => Some(Value::from(lit.clone())),
        Constant::Lambda(id) => cx.universe.source(*id).cloned().map(Value::Function),
    }
}

fn drop_copy(_: &mut RewriteContext<'_>, _: Node, captures: &Captures) -> Result<Rewrite> {
    Ok(Rewrite::Replace(captures.node("X")))
}
