//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! The linear A-normal form that the graph IR is built from and exported to.
//!
//! Every intermediate value in ANF has a name, and every argument is an
//! [`Atom`]: a name or a literal. A function is a list of [`Binding`]s in
//! evaluation order followed by a returned atom.

mod builder;
mod symbol;
mod syntax;
mod writer;

pub use builder::*;
pub use symbol::*;
pub use syntax::*;
