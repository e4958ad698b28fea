//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

macro_rules! primitives {
    ( $( $(#[$doc:meta])* $variant:ident => $name:literal ),* $(,)? ) => {
        /// A builtin operation that the graph knows by identity.
        ///
        /// Primitives are referenced from ANF through the builtin namespace,
        /// e.g. `#add`, and appear in the graph as value nodes.
        #[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
        #[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
        pub enum Primitive {
            $( $(#[$doc])* $variant, )*
        }

        impl Primitive {
            /// Every primitive, in declaration order.
            pub const ALL: &'static [Primitive] = &[$(Primitive::$variant),*];

            /// The builtin name of the primitive.
            pub fn name(self) -> &'static str {
                match self {
                    $( Primitive::$variant => $name, )*
                }
            }

            /// Looks up a primitive by its builtin name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $name => Some(Primitive::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

primitives! {
    /// `a + b`, elementwise over tuples
    Add => "add",
    /// `a - b`
    Subtract => "subtract",
    /// `a * b`
    Multiply => "multiply",
    /// `a / b`, always true division
    Divide => "divide",
    /// `a ** b`
    Power => "power",
    /// logical `not a`
    Negate => "negate",
    /// `+a`
    UnaryAdd => "unary_add",
    /// `-a`
    UnarySubtract => "unary_subtract",
    /// `~a`
    BitwiseNot => "bitwise_not",
    /// `a & b`
    BitwiseAnd => "bitwise_and",
    /// `a | b`
    BitwiseOr => "bitwise_or",
    /// `a ^ b`
    BitwiseXor => "bitwise_xor",
    /// `a < b`
    Less => "less",
    /// `a > b`
    Greater => "greater",
    /// `a <= b`
    LessEqual => "less_equal",
    /// `a >= b`
    GreaterEqual => "greater_equal",
    /// `a == b`
    Equal => "equal",
    /// `base[index]`
    Index => "index",
    /// Returns its single argument.
    Identity => "identity",
    /// `partial(f, a...)` builds a closure of `f` over `a...`.
    Partial => "partial",
    /// `mktuple(a...)` builds a tuple.
    MakeTuple => "mktuple",
    /// `switch(c, t, f)` picks `t` if `c` holds, otherwise `f`.
    Switch => "switch",
    /// Length of a tuple.
    Len => "len",
    /// First element of a tuple.
    First => "first",
    /// Second element of a tuple.
    Second => "second",
    /// The forward-mode differentiation transform.
    J => "J",
    /// Inverse of [`Primitive::J`].
    Jinv => "Jinv",
}

impl Display for Primitive {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.name())
    }
}

impl FromStr for Primitive {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or(())
    }
}
