//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::ir::Lambda;

/// Removes every node that the output doesn't depend on.
///
/// Parameters are always kept, even if they are unused, since they are
/// part of the lambda's signature. Returns the number of nodes removed.
pub fn prune(lambda: &mut Lambda) -> usize {
    let roots = lambda.params().iter().copied().chain([lambda.output()]);
    let live = lambda.graph().reachable(roots);

    lambda.graph_mut().retain(|node, _| live.contains(node))
}
