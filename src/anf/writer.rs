//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::anf::*;
use std::fmt::{self, Display, Formatter};

fn write_list<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i != 0 {
            write!(f, ", ")?;
        }

        write!(f, "{item}")?;
    }

    Ok(())
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Float(x) => write!(f, "{x:?}"),
            Literal::Str(s) => write!(f, "{:?}", &**s),
        }
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Symbol(sym) => write!(f, "{sym}"),
            Atom::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Target::Name(sym) => write!(f, "{sym}"),
            Target::Tuple(targets) => {
                write!(f, "(")?;
                write_list(f, targets)?;
                write!(f, ")")
            }
        }
    }
}

impl Display for Rhs {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Rhs::Atom(atom) => write!(f, "{atom}"),
            Rhs::Apply { func, args } => {
                write!(f, "{func}(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Rhs::Closure { func, args } => {
                write!(f, "closure({func}; ")?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Rhs::Tuple(elems) => {
                write!(f, "(")?;
                write_list(f, elems)?;
                write!(f, ")")
            }
        }
    }
}

impl Display for AnfFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "fn {}(", self.name)?;
        write_list(f, &self.params)?;
        writeln!(f, ") {{")?;

        for binding in self.bindings.iter() {
            writeln!(f, "  {} = {}", binding.target, binding.value)?;
        }

        writeln!(f, "  return {}", self.result)?;
        write!(f, "}}")
    }
}
