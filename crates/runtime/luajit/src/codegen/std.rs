//! Statement-form lowering: let, do, if, match, try and error.

use super::{CompileError, Emitter, literal, lua_string_literal};
use starshot_check::TypeEnv;
use starshot_ir::{Builtin, Expr, Literal, MatchArm, Pattern, TypeExpr};

const NO_MATCH: &str = "match: no arm matched";

/// Where the value of a statement-position expression goes.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Tail<'a> {
    Return,
    Assign(&'a str),
    Discard,
}

/// How a constructor pattern is represented at runtime.
#[derive(Debug, Clone, Copy)]
enum Shape {
    Some,
    None,
    Variant(usize),
}

impl Emitter<'_> {
    pub(crate) fn stmts(&mut self, expr: &Expr, env: &TypeEnv, tail: Tail<'_>) -> Result<(), CompileError> {
        match expr {
            Expr::Let { name, value, body } => {
                let code = self.expr(value, env)?;
                let ty = self.typer.infer(value, env);
                let local = self.local(name);
                self.out(format!("local {local} = {code}"));
                self.stmts(body, &env.bind(name.clone(), ty), tail)
            }
            Expr::Do(items) => {
                let Some((last, init)) = items.split_last() else {
                    self.finish(tail, "nil");
                    return Ok(());
                };
                for item in init {
                    if matches!(item, Expr::Let { .. } | Expr::Do(_)) {
                        // Keeps the item's locals out of the following items.
                        self.out("do");
                        self.indented(|this| this.stmts(item, env, Tail::Discard))?;
                        self.out("end");
                    } else {
                        self.stmts(item, env, Tail::Discard)?;
                    }
                }
                self.stmts(last, env, tail)
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => self.if_chain(cond, then_branch, else_branch, env, tail),
            Expr::Match { target, arms } => self.match_arms(target, arms, env, tail),
            Expr::Try {
                body,
                catch_var,
                handler,
            } => self.try_catch(body, catch_var, handler, env, tail),
            Expr::Error(message) => {
                let message = self.expr(message, env)?;
                self.out(format!("__raise({message})"));
                Ok(())
            }
            Expr::Builtin {
                builtin: Builtin::Print,
                ..
            } if matches!(tail, Tail::Discard) => {
                let call = self.expr(expr, env)?;
                self.out(call);
                Ok(())
            }
            _ => {
                let code = self.expr(expr, env)?;
                self.finish(tail, &code);
                Ok(())
            }
        }
    }

    fn finish(&mut self, tail: Tail<'_>, code: &str) {
        match tail {
            Tail::Return => self.out(format!("return {code}")),
            Tail::Assign(name) => self.out(format!("{name} = {code}")),
            Tail::Discard => self.out(format!("local _ = {code}")),
        }
    }

    fn if_chain(
        &mut self,
        cond: &Expr,
        then_branch: &Expr,
        else_branch: &Expr,
        env: &TypeEnv,
        tail: Tail<'_>,
    ) -> Result<(), CompileError> {
        let cond = self.expr(cond, env)?;
        self.out(format!("if {cond} then"));
        self.indented(|this| this.stmts(then_branch, env, tail))?;

        let mut rest = else_branch;
        while let Expr::If {
            cond,
            then_branch,
            else_branch,
        } = rest
        {
            let cond = self.expr(cond, env)?;
            self.out(format!("elseif {cond} then"));
            self.indented(|this| this.stmts(then_branch, env, tail))?;
            rest = else_branch;
        }

        self.out("else");
        self.indented(|this| this.stmts(rest, env, tail))?;
        self.out("end");
        Ok(())
    }

    /// Arms are tried in order; the first irrefutable arm ends the chain.
    fn match_arms(
        &mut self,
        target: &Expr,
        arms: &[MatchArm],
        env: &TypeEnv,
        tail: Tail<'_>,
    ) -> Result<(), CompileError> {
        let code = self.expr(target, env)?;
        let target_ty = self.typer.infer(target, env);
        let subject = self.temp("m");
        self.out(format!("local {subject} = {code}"));

        let mut opened = false;
        for arm in arms {
            let test = self.pattern_test(&arm.pattern, &subject);
            let opener = match (&test, opened) {
                (Some(test), false) => format!("if {test} then"),
                (Some(test), true) => format!("elseif {test} then"),
                (None, false) => "do".to_string(),
                (None, true) => "else".to_string(),
            };
            self.out(opener);

            let arm_env = self
                .typer
                .pattern_bindings(&arm.pattern, target_ty.as_ref())
                .into_iter()
                .fold(env.clone(), |env, (name, ty)| env.bind(name, ty));
            let mut bindings = Vec::new();
            self.pattern_access(&arm.pattern, &subject, &mut bindings);
            self.indented(|this| {
                for (name, access) in &bindings {
                    let local = this.local(name);
                    this.out(format!("local {local} = {access}"));
                }
                this.stmts(&arm.body, &arm_env, tail)
            })?;

            if test.is_none() {
                self.out("end");
                return Ok(());
            }
            opened = true;
        }

        let raise = format!("__raise({})", lua_string_literal(NO_MATCH));
        if !opened {
            self.out(raise);
            return Ok(());
        }
        self.out("else");
        self.indented(|this| {
            this.out(raise);
            Ok(())
        })?;
        self.out("end");
        Ok(())
    }

    fn shape(&self, name: &str, fields: usize) -> Shape {
        if let Some(variant) = self.typer.variant(name) {
            return Shape::Variant(variant.payload.len());
        }
        match (name, fields) {
            ("Some", 1) => Shape::Some,
            ("None", 0) => Shape::None,
            _ => Shape::Variant(fields),
        }
    }

    /// The Lua condition under which `access` matches `pattern`, or `None`
    /// when it always does.
    fn pattern_test(&self, pattern: &Pattern, access: &str) -> Option<String> {
        match pattern {
            Pattern::Wildcard | Pattern::Bind(_) => None,
            Pattern::Literal(Literal::Unit) => Some(format!("{access} == nil")),
            Pattern::Literal(lit) => Some(format!("{access} == {}", literal(lit))),
            Pattern::Constructor(name, subs) => {
                let shape = self.shape(name, subs.len());
                let mut tests = match shape {
                    Shape::None => return Some(format!("{access} == nil")),
                    Shape::Some => vec![format!("{access} ~= nil")],
                    Shape::Variant(_) => {
                        vec![format!("__is({access}, {})", lua_string_literal(name))]
                    }
                };
                for (i, sub) in subs.iter().enumerate() {
                    if let Some(test) = self.pattern_test(sub, &field_access(shape, access, i)) {
                        tests.push(test);
                    }
                }
                Some(tests.join(" and "))
            }
        }
    }

    fn pattern_access(&self, pattern: &Pattern, access: &str, out: &mut Vec<(String, String)>) {
        match pattern {
            Pattern::Bind(name) => out.push((name.clone(), access.to_string())),
            Pattern::Constructor(name, subs) => {
                let shape = self.shape(name, subs.len());
                for (i, sub) in subs.iter().enumerate() {
                    self.pattern_access(sub, &field_access(shape, access, i), out);
                }
            }
            Pattern::Wildcard | Pattern::Literal(_) => {}
        }
    }

    fn try_catch(
        &mut self,
        body: &Expr,
        catch_var: &str,
        handler: &Expr,
        env: &TypeEnv,
        tail: Tail<'_>,
    ) -> Result<(), CompileError> {
        let ok = self.temp("ok");
        let value = self.temp("r");
        let protected = self.function("", body, env)?;
        self.out(format!("local {ok}, {value} = __pcall({protected})"));
        self.out(format!("if {ok} then"));
        self.indented(|this| {
            this.finish(tail, &value);
            Ok(())
        })?;
        self.out("else");
        let handler_env = env.bind(catch_var, Some(TypeExpr::STRING));
        self.indented(|this| {
            let local = this.local(catch_var);
            this.out(format!("local {local} = __errmsg({value})"));
            this.stmts(handler, &handler_env, tail)
        })?;
        self.out("end");
        Ok(())
    }
}

fn field_access(shape: Shape, access: &str, i: usize) -> String {
    match shape {
        Shape::Some | Shape::None => access.to_string(),
        Shape::Variant(1) => format!("{access}.value"),
        Shape::Variant(_) => format!("{access}._{i}"),
    }
}
