//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Error types for building, optimizing and exporting graphs.

use crate::anf::Symbol;
use crate::ir::LambdaId;
use snafu::Snafu;

/// Result type for graph operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while building, rewriting or exporting graphs.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// ANF input was not well-formed.
    #[snafu(display("malformed binding in `{function}`: {reason}"))]
    MalformedBinding {
        /// The function being lifted.
        function: Symbol,
        /// What was wrong with it.
        reason: String,
    },

    /// The resolver has no meaning for a free symbol.
    #[snafu(display("unresolvable symbol `{symbol}`"))]
    UnresolvableSymbol {
        /// The symbol, as written.
        symbol: Symbol,
    },

    /// A global resolved to something the graph cannot represent.
    #[snafu(display("unsupported value: {what}"))]
    UnsupportedValue {
        /// Description of the value.
        what: String,
    },

    /// A node was used in a way its kind doesn't allow, or a reachable
    /// computation has no producer.
    #[snafu(display("corrupted node `{tag}`: {reason}"))]
    CorruptedNode {
        /// Tag of the offending node.
        tag: Symbol,
        /// What was wrong with it.
        reason: String,
    },

    /// The optimizer hit its round limit while rules were still firing.
    #[snafu(display("`{function}` did not reach a fixpoint within {rounds} rounds"))]
    NoFixpoint {
        /// Name of the lambda.
        function: Symbol,
        /// The round limit that was hit.
        rounds: usize,
    },

    /// A lambda is not in the universe, or is detached for optimization.
    #[snafu(display("lambda {id} is not available"))]
    LambdaUnavailable {
        /// The lambda that was asked for.
        id: LambdaId,
    },
}
