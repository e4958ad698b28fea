//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

#![deny(
    unreachable_pub,
    missing_docs,
    missing_abi,
    rust_2018_idioms,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links
)]

//! # Quartz
//!
//! A graph IR for programs in administrative normal form.
//!
//! ANF functions are lifted into [`ir::Lambda`]s by a [`ir::Universe`],
//! optimized by repeatedly applying pattern rewrites and merging common
//! subexpressions, and then exported back into ANF:
//!
//! ```
//! # use quartz::anf::*;
//! # use quartz::ir::GlobalEnv;
//! # use std::rc::Rc;
//! let f = FunctionBuilder::new("f")
//!     .param("x")
//!     .apply("one", builtin("add"), [int(0), int(1)])
//!     .apply("y", builtin("multiply"), [local("one"), local("x")])
//!     .build(local("y"));
//!
//! let optimized = quartz::optimize(&f, Rc::new(GlobalEnv::new())).unwrap();
//!
//! assert!(optimized.bindings.is_empty());
//! assert_eq!(optimized.result, local("x"));
//! ```

pub mod anf;
pub mod arena;
pub mod error;
pub mod eval;
pub mod ir;
pub mod pass;
pub mod rewrite;
pub mod transforms;
pub mod utility;

#[cfg(test)]
mod fixtures;

pub use error::{Error, Result};

use crate::anf::AnfFunction;
use crate::ir::{Resolver, Universe};
use crate::pass::OptimizerConfig;
use std::rc::Rc;

/// Lifts `func` into a fresh universe, optimizes it with the default
/// configuration and exports the result.
///
/// Functions that `func` refers to are lifted too (and may be inlined),
/// but only `func` itself is optimized and returned.
pub fn optimize(func: &Rc<AnfFunction>, resolver: Rc<dyn Resolver>) -> Result<AnfFunction> {
    let mut universe = Universe::new(resolver);
    let id = universe.acquire(func)?;

    universe.optimize(id, &OptimizerConfig::default())?;
    universe.export(id)
}
