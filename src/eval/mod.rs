//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Compile-time evaluation of calls whose operands are all known.
//!
//! Constant folding hands calls to an [`Evaluator`]. The crate ships a
//! reference [`Interpreter`] that runs primitives and ANF functions
//! directly, but a universe can be given any other implementation.

mod interpreter;

pub use interpreter::Interpreter;

use crate::anf::{AnfFunction, Literal, Symbol};
use crate::ir::Primitive;
use snafu::Snafu;
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

/// A runtime value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A boolean.
    Bool(bool),
    /// A signed 64-bit integer.
    Int(i64),
    /// A 64-bit float.
    Float(f64),
    /// A string.
    Str(Rc<str>),
    /// A builtin primitive, as a first-class value.
    Primitive(Primitive),
    /// A user function, as a first-class value.
    Function(Rc<AnfFunction>),
    /// A tuple.
    Tuple(Rc<[Value]>),
    /// A function partially applied to some arguments.
    Closure {
        /// The function being closed over.
        func: Rc<Value>,
        /// The captured arguments, passed before any call arguments.
        args: Rc<[Value]>,
    },
}

impl Value {
    /// Builds a tuple value.
    pub fn tuple(elems: impl IntoIterator<Item = Value>) -> Self {
        Value::Tuple(elems.into_iter().collect())
    }

    /// Gets the value as a literal, if it is a scalar.
    pub fn as_literal(&self) -> Option<Literal> {
        match self {
            Value::Bool(b) => Some(Literal::Bool(*b)),
            Value::Int(i) => Some(Literal::Int(*i)),
            Value::Float(f) => Some(Literal::Float(*f)),
            Value::Str(s) => Some(Literal::Str(s.clone())),
            _ => None,
        }
    }
}

impl From<Literal> for Value {
    fn from(value: Literal) -> Self {
        match value {
            Literal::Bool(b) => Value::Bool(b),
            Literal::Int(i) => Value::Int(i),
            Literal::Float(f) => Value::Float(f),
            Literal::Str(s) => Value::Str(s),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{:?}", &**s),
            Value::Primitive(p) => write!(f, "{p}"),
            Value::Function(func) => write!(f, "{}", func.name),
            Value::Tuple(elems) => {
                write!(f, "(")?;

                for (i, elem) in elems.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }

                    write!(f, "{elem}")?;
                }

                write!(f, ")")
            }
            Value::Closure { func, args } => {
                write!(f, "closure({func}")?;

                for arg in args.iter() {
                    write!(f, ", {arg}")?;
                }

                write!(f, ")")
            }
        }
    }
}

/// Errors that evaluation can raise. Folding treats all of these as
/// "leave the call alone".
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum EvalError {
    /// Wrong number of arguments.
    #[snafu(display("`{callee}` expects {expected} arguments, got {got}"))]
    Arity {
        /// What was called.
        callee: String,
        /// Its arity.
        expected: usize,
        /// Number of arguments given.
        got: usize,
    },

    /// Operand types don't fit the operation.
    #[snafu(display("type error in `{operation}`: {message}"))]
    Type {
        /// The operation being evaluated.
        operation: String,
        /// What didn't fit.
        message: String,
    },

    /// Division or modulo by zero.
    #[snafu(display("division by zero"))]
    DivisionByZero,

    /// Integer arithmetic overflowed.
    #[snafu(display("integer overflow in `{operation}`"))]
    Overflow {
        /// The operation that overflowed.
        operation: String,
    },

    /// Tuple index out of range.
    #[snafu(display("index {index} out of bounds for tuple of length {len}"))]
    IndexOutOfBounds {
        /// The index, before wrapping negative values.
        index: i64,
        /// Length of the tuple.
        len: usize,
    },

    /// The primitive has no compile-time meaning.
    #[snafu(display("`{primitive}` cannot be evaluated"))]
    NotEvaluable {
        /// The primitive.
        primitive: Primitive,
    },

    /// Something that isn't a function was called.
    #[snafu(display("`{value}` is not callable"))]
    NotCallable {
        /// The value that was called.
        value: String,
    },

    /// A symbol has no value.
    #[snafu(display("unbound symbol `{symbol}`"))]
    Unbound {
        /// The symbol.
        symbol: Symbol,
    },

    /// A destructuring binding didn't fit its value.
    #[snafu(display("cannot destructure `{value}` into {expected} names"))]
    Destructure {
        /// The value being destructured.
        value: String,
        /// Number of names in the target.
        expected: usize,
    },

    /// Calls nested too deeply.
    #[snafu(display("call depth exceeded {limit}"))]
    DepthExceeded {
        /// The depth limit.
        limit: usize,
    },
}

/// Evaluates a call with fully-known operands.
pub trait Evaluator {
    /// Calls `func` with `args`. `func` is a primitive, a function or a
    /// closure.
    fn call(&self, func: &Value, args: &[Value]) -> Result<Value, EvalError>;
}
