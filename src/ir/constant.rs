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
use crate::ir::{LambdaId, Primitive};
use std::fmt::{self, Display, Formatter};

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// The payload of a value node.
///
/// Equality and hashing are exact: `Int(1)` and `Float(1.0)` are different
/// constants and never merge. Lambdas compare by identity.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum Constant {
    /// A scalar literal.
    Literal(Literal),
    /// A builtin primitive.
    Primitive(Primitive),
    /// A function graph owned by the universe.
    Lambda(LambdaId),
}

impl Constant {
    /// Checks whether `self`, written in a pattern, accepts `other` found in
    /// a graph. Numbers match numerically, everything else exactly.
    pub fn matches(&self, other: &Constant) -> bool {
        match (self, other) {
            (Constant::Literal(a), Constant::Literal(b)) => a.loosely_eq(b),
            _ => self == other,
        }
    }

    /// Gets the primitive, if this is one.
    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            Constant::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Gets the lambda, if this is one.
    pub fn as_lambda(&self) -> Option<LambdaId> {
        match self {
            Constant::Lambda(id) => Some(*id),
            _ => None,
        }
    }

    /// Gets the literal, if this is one.
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Constant::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

impl From<Literal> for Constant {
    fn from(value: Literal) -> Self {
        Constant::Literal(value)
    }
}

impl From<Primitive> for Constant {
    fn from(value: Primitive) -> Self {
        Constant::Primitive(value)
    }
}

impl From<LambdaId> for Constant {
    fn from(value: LambdaId) -> Self {
        Constant::Lambda(value)
    }
}

impl From<i64> for Constant {
    fn from(value: i64) -> Self {
        Constant::Literal(Literal::Int(value))
    }
}

impl From<f64> for Constant {
    fn from(value: f64) -> Self {
        Constant::Literal(Literal::Float(value))
    }
}

impl From<bool> for Constant {
    fn from(value: bool) -> Self {
        Constant::Literal(Literal::Bool(value))
    }
}

impl Display for Constant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Literal(lit) => write!(f, "{lit}"),
            Constant::Primitive(prim) => write!(f, "{prim}"),
            Constant::Lambda(id) => write!(f, "lambda{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaKey;

    #[test]
    fn matching_is_numeric_but_equality_is_exact() {
        let one = Constant::from(1i64);
        let one_f = Constant::from(1.0);

        assert!(one_f.matches(&one));
        assert_ne!(one_f, one);
        assert!(!Constant::from(Primitive::Add).matches(&Constant::from(Primitive::Subtract)));
        assert!(Constant::from(LambdaId::new(2)).matches(&Constant::Lambda(LambdaId::new(2))));
    }
}
