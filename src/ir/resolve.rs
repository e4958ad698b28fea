//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::anf::{AnfFunction, Literal, Namespace, Symbol};
use crate::ir::Primitive;
use crate::utility::SaHashMap;
use std::rc::Rc;

/// What a free symbol means.
#[derive(Clone, Debug, PartialEq)]
pub enum Global {
    /// A builtin primitive.
    Primitive(Primitive),
    /// A user function, lifted into a lambda on first use.
    Function(Rc<AnfFunction>),
    /// A scalar constant.
    Constant(Literal),
    /// Something the graph cannot represent. The string describes it for
    /// error messages.
    Opaque(String),
}

/// Gives meaning to the global and builtin symbols referenced by ANF code.
///
/// Returning `None` means the symbol is unknown, which makes graph
/// construction fail with [`Error::UnresolvableSymbol`](crate::Error::UnresolvableSymbol).
pub trait Resolver {
    /// Resolves a single symbol.
    fn resolve(&self, symbol: &Symbol) -> Option<Global>;
}

/// A table-driven [`Resolver`].
///
/// Builtins resolve to the [`Primitive`] of the same name. Globals resolve
/// to whatever was registered under their name.
///
/// ```
/// # use quartz::anf::*;
/// # use quartz::ir::*;
/// let f = FunctionBuilder::new("f").build(int(1));
/// let env = GlobalEnv::new().with_function(f).with_constant("half", 0.5.into());
///
/// assert!(matches!(env.resolve(&Symbol::global("f")), Some(Global::Function(_))));
/// assert_eq!(env.resolve(&Symbol::builtin("add")), Some(Global::Primitive(Primitive::Add)));
/// assert_eq!(env.resolve(&Symbol::global("g")), None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct GlobalEnv {
    entries: SaHashMap<Rc<str>, Global>,
}

impl GlobalEnv {
    /// Creates an environment that only knows the builtins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function under its own name.
    pub fn define_function(&mut self, func: Rc<AnfFunction>) {
        let name: Rc<str> = func.name.name().into();

        self.entries.insert(name, Global::Function(func));
    }

    /// Registers a constant.
    pub fn define_constant(&mut self, name: &str, value: Literal) {
        self.entries.insert(name.into(), Global::Constant(value));
    }

    /// Registers a global that cannot be lifted into the graph.
    pub fn define_opaque(&mut self, name: &str, description: &str) {
        self.entries
            .insert(name.into(), Global::Opaque(description.to_owned()));
    }

    /// Builder-style [`Self::define_function`].
    pub fn with_function(mut self, func: Rc<AnfFunction>) -> Self {
        self.define_function(func);

        self
    }

    /// Builder-style [`Self::define_constant`].
    pub fn with_constant(mut self, name: &str, value: Literal) -> Self {
        self.define_constant(name, value);

        self
    }

    /// Builder-style [`Self::define_opaque`].
    pub fn with_opaque(mut self, name: &str, description: &str) -> Self {
        self.define_opaque(name, description);

        self
    }
}

impl Resolver for GlobalEnv {
    fn resolve(&self, symbol: &Symbol) -> Option<Global> {
        match symbol.namespace() {
            Namespace::Builtin => Primitive::from_name(symbol.name()).map(Global::Primitive),
            Namespace::Global => self.entries.get(symbol.name()).cloned(),
            Namespace::Local => None,
        }
    }
}
