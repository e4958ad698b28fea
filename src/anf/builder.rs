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
use std::rc::Rc;

/// A local-name atom.
pub fn local(name: &str) -> Atom {
    Atom::Symbol(Symbol::local(name))
}

/// A global-name atom.
pub fn global(name: &str) -> Atom {
    Atom::Symbol(Symbol::global(name))
}

/// A builtin-name atom, e.g. `builtin("add")`.
pub fn builtin(name: &str) -> Atom {
    Atom::Symbol(Symbol::builtin(name))
}

/// An integer literal atom.
pub fn int(value: i64) -> Atom {
    Atom::Literal(Literal::Int(value))
}

/// A float literal atom.
pub fn float(value: f64) -> Atom {
    Atom::Literal(Literal::Float(value))
}

/// A boolean literal atom.
pub fn boolean(value: bool) -> Atom {
    Atom::Literal(Literal::Bool(value))
}

/// A string literal atom.
pub fn string(value: &str) -> Atom {
    Atom::Literal(Literal::Str(value.into()))
}

/// Helper type for building an [`AnfFunction`] in code.
///
/// ```
/// # use quartz::anf::*;
/// let f = FunctionBuilder::new("f")
///     .param("x")
///     .apply("t", builtin("add"), [local("x"), int(1)])
///     .build(local("t"));
///
/// assert_eq!(f.bindings.len(), 1);
/// ```
pub struct FunctionBuilder {
    name: Symbol,
    params: Vec<Symbol>,
    bindings: Vec<Binding>,
}

impl FunctionBuilder {
    /// Creates a builder for a function with a global name and no body.
    pub fn new(name: &str) -> Self {
        Self {
            name: Symbol::global(name),
            params: Vec::default(),
            bindings: Vec::default(),
        }
    }

    /// Appends a parameter
    pub fn param(mut self, name: &str) -> Self {
        self.params.push(Symbol::local(name));

        self
    }

    /// Appends a list of parameters
    pub fn params(mut self, names: &[&str]) -> Self {
        self.params.extend(names.iter().map(|name| Symbol::local(*name)));

        self
    }

    /// Appends an arbitrary binding.
    pub fn bind(mut self, target: impl Into<Target>, value: Rhs) -> Self {
        self.bindings.push(Binding {
            target: target.into(),
            value,
        });

        self
    }

    /// Appends `target = func(args...)`.
    pub fn apply(
        self,
        target: impl Into<Target>,
        func: Atom,
        args: impl IntoIterator<Item = Atom>,
    ) -> Self {
        let args = args.into_iter().collect();

        self.bind(target, Rhs::Apply { func, args })
    }

    /// Appends `target = closure(func; args...)`.
    pub fn closure(
        self,
        target: impl Into<Target>,
        func: Atom,
        args: impl IntoIterator<Item = Atom>,
    ) -> Self {
        let args = args.into_iter().collect();

        self.bind(target, Rhs::Closure { func, args })
    }

    /// Appends `target = (elems...)`.
    pub fn tuple(self, target: impl Into<Target>, elems: impl IntoIterator<Item = Atom>) -> Self {
        let elems = elems.into_iter().collect();

        self.bind(target, Rhs::Tuple(elems))
    }

    /// Appends `target = atom`.
    pub fn copy(self, target: impl Into<Target>, atom: Atom) -> Self {
        self.bind(target, Rhs::Atom(atom))
    }

    /// Appends `(names...) = atom`, destructuring a tuple.
    pub fn destructure(self, names: &[&str], atom: Atom) -> Self {
        let targets = names.iter().map(|name| Target::from(*name)).collect();

        self.bind(Target::Tuple(targets), Rhs::Atom(atom))
    }

    /// Finishes the function, returning `result`.
    pub fn build(self, result: Atom) -> Rc<AnfFunction> {
        Rc::new(AnfFunction {
            name: self.name,
            params: self.params,
            bindings: self.bindings,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_binding_order() {
        let f = FunctionBuilder::new("f")
            .params(&["x", "y"])
            .tuple("t", [local("x"), local("y")])
            .destructure(&["a", "b"], local("t"))
            .closure("c", global("g"), [local("a")])
            .build(local("c"));

        assert_eq!(f.name, Symbol::global("f"));
        assert_eq!(f.params, vec![Symbol::local("x"), Symbol::local("y")]);
        assert_eq!(f.bindings.len(), 3);
        assert_eq!(
            f.bindings[1].target,
            Target::Tuple(vec![Target::from("a"), Target::from("b")])
        );
        assert!(matches!(f.bindings[2].value, Rhs::Closure { .. }));
    }
}
