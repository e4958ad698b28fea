//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Pattern-directed rewriting of lambda graphs.
//!
//! A [`Rule`] pairs a [`Pattern`] over producers with a handler. The
//! engine in [`simplify`] walks every computation of a lambda, finds the
//! first rule whose pattern matches and whose handler agrees to fire,
//! and applies the resulting [`Rewrite`]. Rules live in an explicit
//! [`RuleSet`], so differently configured optimizers can coexist.

mod engine;
mod pattern;
mod rules;
mod splice;

pub use engine::*;
pub use pattern::*;
pub use rules::*;
pub use splice::*;
