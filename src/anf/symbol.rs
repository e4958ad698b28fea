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
use std::rc::Rc;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// Where a [`Symbol`] gets its meaning from.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum Namespace {
    /// A parameter or a name bound inside the function body.
    Local,
    /// A free reference to a user-level global (another function, a constant).
    Global,
    /// A reference to a compiler primitive such as `add` or `mktuple`.
    Builtin,
}

/// A name in ANF code.
///
/// Two symbols are the same name only if their text, namespace and version
/// all agree. Versions are how fresh names are made: `x`, `x.1`, `x.2` are
/// three distinct locals that all print with the same base name.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct Symbol {
    name: Rc<str>,
    namespace: Namespace,
    version: u32,
}

impl Symbol {
    /// Creates a symbol in a given namespace with version `0`.
    pub fn new(name: impl Into<Rc<str>>, namespace: Namespace) -> Self {
        Self {
            name: name.into(),
            namespace,
            version: 0,
        }
    }

    /// Creates a local symbol.
    pub fn local(name: impl Into<Rc<str>>) -> Self {
        Self::new(name, Namespace::Local)
    }

    /// Creates a global symbol.
    pub fn global(name: impl Into<Rc<str>>) -> Self {
        Self::new(name, Namespace::Global)
    }

    /// Creates a builtin symbol.
    pub fn builtin(name: impl Into<Rc<str>>) -> Self {
        Self::new(name, Namespace::Builtin)
    }

    /// Returns the same symbol with a different version.
    pub fn with_version(self, version: u32) -> Self {
        Self { version, ..self }
    }

    /// The base name, without any version suffix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace the symbol lives in.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// The version, `0` for names written by the front-end.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Whether this is a local name.
    pub fn is_local(&self) -> bool {
        self.namespace == Namespace::Local
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.namespace {
            Namespace::Local => write!(f, "{}", self.name)?,
            Namespace::Global => write!(f, "@{}", self.name)?,
            Namespace::Builtin => write!(f, "#{}", self.name)?,
        }

        if self.version != 0 {
            write!(f, ".{}", self.version)?;
        }

        Ok(())
    }
}
