//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::anf::{AnfFunction, Symbol};
use crate::arena::{ArenaKey, ArenaMap, SecondaryMap, SecondarySet};
use crate::error::{LambdaUnavailableSnafu, Result, UnresolvableSymbolSnafu};
use crate::eval::{Evaluator, Interpreter};
use crate::ir::build::LambdaBuilder;
use crate::ir::*;
use crate::utility::SaHashMap;
use smallvec::SmallVec;
use snafu::OptionExt;
use std::rc::Rc;

/// Owns every lambda, and is the bridge between ANF and the graph IR.
///
/// Each distinct ANF function (by `Rc` identity) is lifted at most once.
/// Lambdas refer to each other through [`Constant::Lambda`] value nodes,
/// so mutually recursive functions are fine.
pub struct Universe {
    resolver: Rc<dyn Resolver>,
    evaluator: Box<dyn Evaluator>,
    lambdas: ArenaMap<LambdaId, Lambda>,
    sources: SecondaryMap<LambdaId, Rc<AnfFunction>>,
    by_source: SaHashMap<*const AnfFunction, LambdaId>,
    globals: SaHashMap<Symbol, Global>,
    imports: SecondaryMap<LambdaId, SmallVec<[LambdaId; 4]>>,
}

impl Universe {
    /// Creates an empty universe that resolves globals through `resolver`
    /// and folds constants with an [`Interpreter`] over the same resolver.
    pub fn new(resolver: Rc<dyn Resolver>) -> Self {
        Self {
            evaluator: Box::new(Interpreter::new(resolver.clone())),
            resolver,
            lambdas: ArenaMap::default(),
            sources: SecondaryMap::default(),
            by_source: SaHashMap::default(),
            globals: SaHashMap::default(),
            imports: SecondaryMap::default(),
        }
    }

    /// Replaces the evaluator used for constant folding.
    pub fn with_evaluator(self, evaluator: impl Evaluator + 'static) -> Self {
        Self {
            evaluator: Box::new(evaluator),
            ..self
        }
    }

    /// Gets the lambda for `func`, lifting it into a graph on first use.
    ///
    /// The id is registered before the body is built, so a function that
    /// (directly or indirectly) refers to itself sees its own id. If building
    /// fails nothing is registered for `func`. Lambdas acquired for other
    /// functions along the way stay cached, unless they refer back to `func`,
    /// in which case they are evicted too.
    pub fn acquire(&mut self, func: &Rc<AnfFunction>) -> Result<LambdaId> {
        if let Some(id) = self.by_source.get(&Rc::as_ptr(func)) {
            return Ok(*id);
        }

        let id = self.lambdas.reserve();

        self.sources.insert(id, func.clone());
        self.by_source.insert(Rc::as_ptr(func), id);

        tracing::debug!(function = %func.name, lambda = %id, "lifting function");

        match LambdaBuilder::new(self, id, func.clone()).build() {
            Ok(lambda) => {
                self.lambdas.fill(id, lambda);

                Ok(id)
            }
            Err(err) => {
                self.abandon(id);

                Err(err)
            }
        }
    }

    // every lambda acquired after `id` (during its build) that refers back
    // to it holds a value node for a lambda that will never exist
    fn abandon(&mut self, id: LambdaId) {
        let doomed: Vec<LambdaId> = self
            .sources
            .iter()
            .map(|(other, _)| other)
            .filter(|&other| {
                other == id || (other.index() > id.index() && self.reaches(other, id))
            })
            .collect();

        for lambda in doomed {
            if let Some(source) = self.sources.remove(lambda) {
                self.by_source.remove(&Rc::as_ptr(&source));
            }

            self.imports.remove(lambda);
            self.lambdas.remove(lambda);

            tracing::trace!(lambda = %lambda, failed = %id, "evicting lambda");
        }
    }

    /// Resolves a global or builtin symbol, caching the answer.
    pub fn resolve(&mut self, symbol: &Symbol) -> Result<Global> {
        if let Some(global) = self.globals.get(symbol) {
            return Ok(global.clone());
        }

        let global = self
            .resolver
            .resolve(symbol)
            .context(UnresolvableSymbolSnafu {
                symbol: symbol.clone(),
            })?;

        self.globals.insert(symbol.clone(), global.clone());

        Ok(global)
    }

    /// Gets a lambda, if it exists and is not detached.
    pub fn lambda(&self, id: LambdaId) -> Option<&Lambda> {
        self.lambdas.get(id)
    }

    /// Mutable version of [`Self::lambda`].
    pub fn lambda_mut(&mut self, id: LambdaId) -> Option<&mut Lambda> {
        self.lambdas.get_mut(id)
    }

    /// The ANF function a lambda was built from.
    pub fn source(&self, id: LambdaId) -> Option<&Rc<AnfFunction>> {
        self.sources.get(id)
    }

    /// Every lambda ever acquired, in acquisition order.
    pub fn lambdas(&self) -> impl Iterator<Item = LambdaId> + '_ {
        self.sources.iter().map(|(id, _)| id)
    }

    /// The evaluator used for constant folding.
    pub fn evaluator(&self) -> &dyn Evaluator {
        &*self.evaluator
    }

    /// Records that `from` has a value node referring to `to`.
    pub fn record_import(&mut self, from: LambdaId, to: LambdaId) {
        match self.imports.get_mut(from) {
            Some(list) if list.contains(&to) => {}
            Some(list) => list.push(to),
            None => {
                self.imports.insert(from, smallvec::smallvec![to]);
            }
        }
    }

    /// The lambdas that `id` refers to through value nodes.
    pub fn imports(&self, id: LambdaId) -> &[LambdaId] {
        match self.imports.get(id) {
            Some(list) => list.as_slice(),
            None => &[],
        }
    }

    /// Whether `id` can reach itself through imports. Recursive lambdas are
    /// never inlined.
    pub fn is_recursive(&self, id: LambdaId) -> bool {
        self.reaches(id, id)
    }

    // whether `to` is reachable from `from` through at least one import
    fn reaches(&self, from: LambdaId, to: LambdaId) -> bool {
        let mut seen = SecondarySet::with_primary(&self.lambdas);
        let mut worklist: Vec<LambdaId> = self.imports(from).to_vec();

        while let Some(next) = worklist.pop() {
            if next == to {
                return true;
            }

            if seen.insert(next) {
                worklist.extend_from_slice(self.imports(next));
            }
        }

        false
    }

    /// Takes a lambda out of the universe so it can be mutated while the
    /// rest of the universe is also borrowed. Put it back with
    /// [`Self::attach`].
    pub fn detach(&mut self, id: LambdaId) -> Result<Lambda> {
        self.lambdas.remove(id).context(LambdaUnavailableSnafu { id })
    }

    /// Returns a lambda taken with [`Self::detach`].
    pub fn attach(&mut self, lambda: Lambda) {
        let id = lambda.id();

        self.lambdas.fill(id, lambda);
    }
}
