//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::anf::{AnfFunction, Atom, Namespace, Rhs, Symbol, Target};
use crate::eval::*;
use crate::ir::{Global, Primitive, Resolver};
use crate::utility::SaHashMap;
use snafu::ensure;
use std::cmp::Ordering;
use std::rc::Rc;

const DEFAULT_DEPTH_LIMIT: usize = 256;

/// A direct interpreter for primitives and ANF functions.
///
/// Globals referenced by interpreted functions are looked up through the
/// same [`Resolver`] the universe uses.
pub struct Interpreter {
    resolver: Rc<dyn Resolver>,
    depth_limit: usize,
}

type Env = SaHashMap<Symbol, Value>;

impl Interpreter {
    /// Creates an interpreter over `resolver`.
    pub fn new(resolver: Rc<dyn Resolver>) -> Self {
        Self {
            resolver,
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }

    /// Sets how deeply calls may nest before evaluation gives up.
    pub fn with_depth_limit(self, depth_limit: usize) -> Self {
        Self {
            depth_limit,
            ..self
        }
    }

    /// Runs `func` on `args`.
    pub fn run(&self, func: &Rc<AnfFunction>, args: &[Value]) -> Result<Value, EvalError> {
        self.call_function(func, args, 0)
    }

    fn call_at(&self, func: &Value, args: &[Value], depth: usize) -> Result<Value, EvalError> {
        ensure!(
            depth < self.depth_limit,
            DepthExceededSnafu {
                limit: self.depth_limit
            }
        );

        match func {
            Value::Primitive(prim) => self.call_primitive(*prim, args),
            Value::Function(f) => self.call_function(f, args, depth),
            Value::Closure { func, args: captured } => {
                let full: Vec<Value> = captured.iter().chain(args).cloned().collect();

                self.call_at(func, &full, depth + 1)
            }
            other => NotCallableSnafu {
                value: other.to_string(),
            }
            .fail(),
        }
    }

    fn call_function(
        &self,
        func: &Rc<AnfFunction>,
        args: &[Value],
        depth: usize,
    ) -> Result<Value, EvalError> {
        ensure!(
            func.params.len() == args.len(),
            AritySnafu {
                callee: func.name.to_string(),
                expected: func.params.len(),
                got: args.len(),
            }
        );

        let mut env = Env::default();

        for (param, arg) in func.params.iter().zip(args) {
            env.insert(param.clone(), arg.clone());
        }

        for binding in func.bindings.iter() {
            let value = self.eval_rhs(&binding.value, &env, depth)?;

            bind(&mut env, &binding.target, value)?;
        }

        self.eval_atom(&func.result, &env)
    }

    fn eval_rhs(&self, rhs: &Rhs, env: &Env, depth: usize) -> Result<Value, EvalError> {
        match rhs {
            Rhs::Atom(atom) => self.eval_atom(atom, env),
            Rhs::Apply { func, args } => {
                let func = self.eval_atom(func, env)?;
                let args = self.eval_atoms(args, env)?;

                self.call_at(&func, &args, depth + 1)
            }
            Rhs::Closure { func, args } => Ok(Value::Closure {
                func: Rc::new(self.eval_atom(func, env)?),
                args: self.eval_atoms(args, env)?.into(),
            }),
            Rhs::Tuple(elems) => Ok(Value::Tuple(self.eval_atoms(elems, env)?.into())),
        }
    }

    fn eval_atoms(&self, atoms: &[Atom], env: &Env) -> Result<Vec<Value>, EvalError> {
        atoms.iter().map(|atom| self.eval_atom(atom, env)).collect()
    }

    fn eval_atom(&self, atom: &Atom, env: &Env) -> Result<Value, EvalError> {
        let sym = match atom {
            Atom::Literal(lit) => return Ok(lit.clone().into()),
            Atom::Symbol(sym) => sym,
        };

        if sym.namespace() == Namespace::Local {
            return env.get(sym).cloned().ok_or_else(|| unbound(sym));
        }

        match self.resolver.resolve(sym) {
            Some(Global::Primitive(prim)) => Ok(Value::Primitive(prim)),
            Some(Global::Function(f)) => Ok(Value::Function(f)),
            Some(Global::Constant(lit)) => Ok(lit.into()),
            Some(Global::Opaque(_)) | None => Err(unbound(sym)),
        }
    }

    fn call_primitive(&self, prim: Primitive, args: &[Value]) -> Result<Value, EvalError> {
        match prim {
            Primitive::Add
            | Primitive::Subtract
            | Primitive::Multiply
            | Primitive::Divide
            | Primitive::Power => {
                let [a, b] = arity::<2>(prim, args)?;

                arithmetic(prim, a, b)
            }
            Primitive::BitwiseAnd | Primitive::BitwiseOr | Primitive::BitwiseXor => {
                let [a, b] = arity::<2>(prim, args)?;

                bitwise(prim, a, b)
            }
            Primitive::Less
            | Primitive::Greater
            | Primitive::LessEqual
            | Primitive::GreaterEqual => {
                let [a, b] = arity::<2>(prim, args)?;
                let ordering = compare(prim, a, b)?;

                Ok(Value::Bool(match prim {
                    Primitive::Less => ordering == Ordering::Less,
                    Primitive::Greater => ordering == Ordering::Greater,
                    Primitive::LessEqual => ordering != Ordering::Greater,
                    _ => ordering != Ordering::Less,
                }))
            }
            Primitive::Equal => {
                let [a, b] = arity::<2>(prim, args)?;

                Ok(Value::Bool(loosely_equal(a, b)))
            }
            Primitive::Negate => match arity::<1>(prim, args)? {
                [Value::Bool(b)] => Ok(Value::Bool(!b)),
                [other] => type_error(prim, format!("cannot negate `{other}`")),
            },
            Primitive::UnaryAdd => match arity::<1>(prim, args)? {
                [v @ (Value::Int(_) | Value::Float(_))] => Ok(v.clone()),
                [other] => type_error(prim, format!("`{other}` is not a number")),
            },
            Primitive::UnarySubtract => match arity::<1>(prim, args)? {
                [Value::Int(i)] => i
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| overflow(prim)),
                [Value::Float(f)] => Ok(Value::Float(-f)),
                [other] => type_error(prim, format!("`{other}` is not a number")),
            },
            Primitive::BitwiseNot => match arity::<1>(prim, args)? {
                [Value::Int(i)] => Ok(Value::Int(!i)),
                [Value::Bool(b)] => Ok(Value::Bool(!b)),
                [other] => type_error(prim, format!("`{other}` is not an integer")),
            },
            Primitive::Index => {
                let [base, index] = arity::<2>(prim, args)?;

                match (base, index) {
                    (Value::Tuple(elems), Value::Int(i)) => element(elems, *i),
                    _ => type_error(prim, format!("cannot index `{base}` with `{index}`")),
                }
            }
            Primitive::First | Primitive::Second => {
                let [base] = arity::<1>(prim, args)?;
                let i = if prim == Primitive::First { 0 } else { 1 };

                match base {
                    Value::Tuple(elems) => element(elems, i),
                    _ => type_error(prim, format!("`{base}` is not a tuple")),
                }
            }
            Primitive::Len => match arity::<1>(prim, args)? {
                [Value::Tuple(elems)] => Ok(Value::Int(elems.len() as i64)),
                [Value::Str(s)] => Ok(Value::Int(s.chars().count() as i64)),
                [other] => type_error(prim, format!("`{other}` has no length")),
            },
            Primitive::Identity => {
                let [v] = arity::<1>(prim, args)?;

                Ok(v.clone())
            }
            Primitive::MakeTuple => Ok(Value::tuple(args.iter().cloned())),
            Primitive::Partial => match args.split_first() {
                Some((func, captured)) => Ok(Value::Closure {
                    func: Rc::new(func.clone()),
                    args: captured.into(),
                }),
                None => AritySnafu {
                    callee: prim.name(),
                    expected: 1usize,
                    got: 0usize,
                }
                .fail(),
            },
            Primitive::Switch => match arity::<3>(prim, args)? {
                [Value::Bool(cond), on_true, on_false] => {
                    Ok(if *cond { on_true } else { on_false }.clone())
                }
                [cond, ..] => type_error(prim, format!("condition `{cond}` is not a bool")),
            },
            Primitive::J | Primitive::Jinv => NotEvaluableSnafu { primitive: prim }.fail(),
        }
    }
}

impl Evaluator for Interpreter {
    fn call(&self, func: &Value, args: &[Value]) -> Result<Value, EvalError> {
        self.call_at(func, args, 0)
    }
}

fn bind(env: &mut Env, target: &Target, value: Value) -> Result<(), EvalError> {
    match target {
        Target::Name(sym) => {
            env.insert(sym.clone(), value);

            Ok(())
        }
        Target::Tuple(targets) => match &value {
            Value::Tuple(elems) if elems.len() == targets.len() => {
                for (target, elem) in targets.iter().zip(elems.iter()) {
                    bind(env, target, elem.clone())?;
                }

                Ok(())
            }
            _ => DestructureSnafu {
                value: value.to_string(),
                expected: targets.len(),
            }
            .fail(),
        },
    }
}

fn arity<const N: usize>(prim: Primitive, args: &[Value]) -> Result<&[Value; N], EvalError> {
    args.try_into().map_err(|_| EvalError::Arity {
        callee: prim.name().to_owned(),
        expected: N,
        got: args.len(),
    })
}

fn unbound(sym: &Symbol) -> EvalError {
    EvalError::Unbound {
        symbol: sym.clone(),
    }
}

fn overflow(prim: Primitive) -> EvalError {
    EvalError::Overflow {
        operation: prim.name().to_owned(),
    }
}

fn type_error<T>(prim: Primitive, message: String) -> Result<T, EvalError> {
    TypeSnafu {
        operation: prim.name(),
        message,
    }
    .fail()
}

fn element(elems: &[Value], index: i64) -> Result<Value, EvalError> {
    let len = elems.len();
    let actual = if index < 0 { index + len as i64 } else { index };

    if actual < 0 || actual as usize >= len {
        return IndexOutOfBoundsSnafu { index, len }.fail();
    }

    Ok(elems[actual as usize].clone())
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn arithmetic(prim: Primitive, a: &Value, b: &Value) -> Result<Value, EvalError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => int_arithmetic(prim, *x, *y),
        (Value::Tuple(xs), Value::Tuple(ys)) if xs.len() == ys.len() => {
            let elems = xs
                .iter()
                .zip(ys.iter())
                .map(|(x, y)| arithmetic(prim, x, y))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Value::tuple(elems))
        }
        (Value::Str(x), Value::Str(y)) if prim == Primitive::Add => {
            Ok(Value::Str(format!("{x}{y}").into()))
        }
        _ => match (as_float(a), as_float(b)) {
            (Some(x), Some(y)) => float_arithmetic(prim, x, y),
            _ => type_error(prim, format!("unsupported operands `{a}` and `{b}`")),
        },
    }
}

fn int_arithmetic(prim: Primitive, x: i64, y: i64) -> Result<Value, EvalError> {
    let result = match prim {
        Primitive::Add => x.checked_add(y),
        Primitive::Subtract => x.checked_sub(y),
        Primitive::Multiply => x.checked_mul(y),
        Primitive::Divide => return float_arithmetic(prim, x as f64, y as f64),
        _ => match u32::try_from(y) {
            Ok(exp) => x.checked_pow(exp),
            Err(_) => return float_arithmetic(prim, x as f64, y as f64),
        },
    };

    result.map(Value::Int).ok_or_else(|| overflow(prim))
}

fn float_arithmetic(prim: Primitive, x: f64, y: f64) -> Result<Value, EvalError> {
    Ok(Value::Float(match prim {
        Primitive::Add => x + y,
        Primitive::Subtract => x - y,
        Primitive::Multiply => x * y,
        Primitive::Divide => {
            ensure!(y != 0.0, DivisionByZeroSnafu);

            x / y
        }
        _ => x.powf(y),
    }))
}

fn bitwise(prim: Primitive, a: &Value, b: &Value) -> Result<Value, EvalError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(match prim {
            Primitive::BitwiseAnd => x & y,
            Primitive::BitwiseOr => x | y,
            _ => x ^ y,
        })),
        (Value::Bool(x), Value::Bool(y)) => Ok(Value::Bool(match prim {
            Primitive::BitwiseAnd => x & y,
            Primitive::BitwiseOr => x | y,
            _ => x ^ y,
        })),
        _ => type_error(prim, format!("unsupported operands `{a}` and `{b}`")),
    }
}

fn compare(prim: Primitive, a: &Value, b: &Value) -> Result<Ordering, EvalError> {
    let ordering = match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        _ => match (as_float(a), as_float(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    };

    match ordering {
        Some(ordering) => Ok(ordering),
        None => type_error(prim, format!("cannot compare `{a}` and `{b}`")),
    }
}

fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Tuple(xs), Value::Tuple(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(x, y)| loosely_equal(x, y))
        }
        _ => match (as_float(a), as_float(b)) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anf::*;
    use crate::ir::GlobalEnv;

    fn interpreter(env: GlobalEnv) -> Interpreter {
        Interpreter::new(Rc::new(env))
    }

    fn call(prim: Primitive, args: &[Value]) -> Result<Value, EvalError> {
        interpreter(GlobalEnv::new()).call(&Value::Primitive(prim), args)
    }

    #[test]
    fn arithmetic_follows_numeric_tower() {
        assert_eq!(call(Primitive::Add, &[Value::Int(1), Value::Int(2)]), Ok(Value::Int(3)));
        assert_eq!(
            call(Primitive::Multiply, &[Value::Int(2), Value::Float(1.5)]),
            Ok(Value::Float(3.0))
        );
        assert_eq!(
            call(Primitive::Divide, &[Value::Int(1), Value::Int(2)]),
            Ok(Value::Float(0.5))
        );
        assert_eq!(
            call(Primitive::Divide, &[Value::Int(1), Value::Int(0)]),
            Err(EvalError::DivisionByZero)
        );
        assert_eq!(call(Primitive::Power, &[Value::Int(2), Value::Int(10)]), Ok(Value::Int(1024)));
        assert!(matches!(
            call(Primitive::Add, &[Value::Int(i64::MAX), Value::Int(1)]),
            Err(EvalError::Overflow { .. })
        ));
    }

    #[test]
    fn tuples_add_elementwise() {
        let a = Value::tuple([Value::Int(1), Value::Int(2)]);
        let b = Value::tuple([Value::Int(10), Value::Int(20)]);

        assert_eq!(
            call(Primitive::Add, &[a.clone(), b]),
            Ok(Value::tuple([Value::Int(11), Value::Int(22)]))
        );
        assert!(call(Primitive::Add, &[a, Value::tuple([Value::Int(1)])]).is_err());
    }

    #[test]
    fn structural_primitives() {
        let t = Value::tuple([Value::Int(1), Value::Int(2), Value::Int(3)]);

        assert_eq!(call(Primitive::Index, &[t.clone(), Value::Int(-1)]), Ok(Value::Int(3)));
        assert!(matches!(
            call(Primitive::Index, &[t.clone(), Value::Int(3)]),
            Err(EvalError::IndexOutOfBounds { .. })
        ));
        assert_eq!(call(Primitive::Len, &[t.clone()]), Ok(Value::Int(3)));
        assert_eq!(call(Primitive::Second, &[t]), Ok(Value::Int(2)));
        assert_eq!(
            call(Primitive::Switch, &[Value::Bool(false), Value::Int(1), Value::Int(2)]),
            Ok(Value::Int(2))
        );
        assert_eq!(
            call(Primitive::J, &[Value::Int(1)]),
            Err(EvalError::NotEvaluable {
                primitive: Primitive::J
            })
        );
    }

    #[test]
    fn closures_prepend_captured_arguments() {
        let closure = call(
            Primitive::Partial,
            &[Value::Primitive(Primitive::Subtract), Value::Int(10)],
        )
        .unwrap();

        assert_eq!(
            interpreter(GlobalEnv::new()).call(&closure, &[Value::Int(3)]),
            Ok(Value::Int(7))
        );
    }

    #[test]
    fn runs_anf_functions_through_globals() {
        let double = FunctionBuilder::new("double")
            .param("x")
            .apply("y", builtin("add"), [local("x"), local("x")])
            .build(local("y"));
        let f = FunctionBuilder::new("f")
            .param("a")
            .apply("b", global("double"), [local("a")])
            .tuple("t", [local("b"), global("k")])
            .destructure(&["p", "q"], local("t"))
            .apply("r", builtin("multiply"), [local("p"), local("q")])
            .build(local("r"));
        let env = GlobalEnv::new()
            .with_function(double)
            .with_constant("k", Literal::Int(5));

        assert_eq!(interpreter(env).run(&f, &[Value::Int(2)]), Ok(Value::Int(20)));
    }

    #[test]
    fn unbounded_recursion_is_cut_off() {
        let f = FunctionBuilder::new("f")
            .param("x")
            .apply("y", global("f"), [local("x")])
            .build(local("y"));
        let env = GlobalEnv::new().with_function(f.clone());
        let result = interpreter(env).with_depth_limit(16).run(&f, &[Value::Int(0)]);

        assert_eq!(result, Err(EvalError::DepthExceeded { limit: 16 }));
    }
}
