//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! The graph IR itself.
//!
//! A [`Universe`] owns a set of [`Lambda`]s, one per lifted ANF function.
//! Each lambda owns a [`Graph`] of nodes: parameters ([`NodeKind::Input`]),
//! constants ([`NodeKind::Value`]) and computations whose value is produced
//! by an [`Operation`] over other nodes. There are no statements and no
//! ordering beyond data dependencies.

mod build;
mod constant;
mod export;
mod graph;
mod lambda;
mod operation;
mod primitive;
mod resolve;
mod universe;

pub use constant::*;
pub use graph::*;
pub use lambda::*;
pub use operation::*;
pub use primitive::*;
pub use resolve::*;
pub use universe::*;
