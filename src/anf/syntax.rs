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
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// A scalar literal that can appear directly in ANF code.
///
/// Floats compare and hash by their bit pattern, so `Literal` can be a
/// hash-map key. Use [`Literal::loosely_eq`] for numeric equality.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum Literal {
    /// `true` or `false`
    Bool(bool),
    /// A signed 64-bit integer.
    Int(i64),
    /// A 64-bit float.
    Float(f64),
    /// An immutable string.
    Str(Rc<str>),
}

impl Literal {
    /// Compares two literals the way the source language does, where
    /// `1 == 1.0` holds.
    pub fn loosely_eq(&self, other: &Literal) -> bool {
        match (self, other) {
            (Literal::Int(a), Literal::Float(b)) | (Literal::Float(b), Literal::Int(a)) => {
                (*a as f64) == *b
            }
            (Literal::Float(a), Literal::Float(b)) => a == b,
            _ => self == other,
        }
    }

    /// Gets the literal as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Literal::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Literal::Bool(a), Literal::Bool(b)) => a == b,
            (Literal::Int(a), Literal::Int(b)) => a == b,
            (Literal::Float(a), Literal::Float(b)) => a.to_bits() == b.to_bits(),
            (Literal::Str(a), Literal::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Literal {}

impl Hash for Literal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);

        match self {
            Literal::Bool(b) => b.hash(state),
            Literal::Int(i) => i.hash(state),
            Literal::Float(f) => f.to_bits().hash(state),
            Literal::Str(s) => s.hash(state),
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Str(value.into())
    }
}

/// An argument position in ANF: either a name or an immediate literal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum Atom {
    /// A local, global or builtin name.
    Symbol(Symbol),
    /// An immediate literal.
    Literal(Literal),
}

impl Atom {
    /// Gets the symbol, if this atom is one.
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Atom::Symbol(sym) => Some(sym),
            Atom::Literal(_) => None,
        }
    }
}

impl From<Symbol> for Atom {
    fn from(value: Symbol) -> Self {
        Atom::Symbol(value)
    }
}

impl From<Literal> for Atom {
    fn from(value: Literal) -> Self {
        Atom::Literal(value)
    }
}

/// The right-hand side of a binding.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum Rhs {
    /// Copies another atom.
    Atom(Atom),
    /// Calls `func` with `args`.
    Apply {
        /// The callee.
        func: Atom,
        /// Arguments, in order.
        args: Vec<Atom>,
    },
    /// Partially applies `func` to `args`, producing a closure.
    Closure {
        /// The function being closed over.
        func: Atom,
        /// The captured arguments.
        args: Vec<Atom>,
    },
    /// Builds a tuple.
    Tuple(Vec<Atom>),
}

/// The left-hand side of a binding. Tuple targets destructure.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum Target {
    /// Binds a single local.
    Name(Symbol),
    /// Destructures a tuple value into the sub-targets, recursively.
    Tuple(Vec<Target>),
}

impl Target {
    /// Calls `f` on every name this target binds, left to right.
    pub fn for_each_name(&self, f: &mut impl FnMut(&Symbol)) {
        match self {
            Target::Name(sym) => f(sym),
            Target::Tuple(targets) => {
                for target in targets {
                    target.for_each_name(f);
                }
            }
        }
    }
}

impl From<Symbol> for Target {
    fn from(value: Symbol) -> Self {
        Target::Name(value)
    }
}

impl From<&str> for Target {
    fn from(value: &str) -> Self {
        Target::Name(Symbol::local(value))
    }
}

/// A single `target = value` statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct Binding {
    /// What is being bound.
    pub target: Target,
    /// The value being bound.
    pub value: Rhs,
}

/// A function in A-normal form: parameters, an ordered list of bindings,
/// and a returned atom.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct AnfFunction {
    /// The global name of the function.
    pub name: Symbol,
    /// Parameter names, all locals.
    pub params: Vec<Symbol>,
    /// The body, in evaluation order.
    pub bindings: Vec<Binding>,
    /// What the function returns.
    pub result: Atom,
}

impl AnfFunction {
    /// The highest version of any local defined by this function, or `0`
    /// if it defines none.
    pub fn max_local_version(&self) -> u32 {
        let mut max = 0;
        let mut visit = |sym: &Symbol| {
            if sym.is_local() {
                max = max.max(sym.version());
            }
        };

        for param in self.params.iter() {
            visit(param);
        }

        for binding in self.bindings.iter() {
            binding.target.for_each_name(&mut visit);
        }

        max
    }
}
