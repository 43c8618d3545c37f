//! List builtin lowering.
//!
//! Higher-order builtins accept their function and list in either order;
//! a lambda in second position means the list came first.

use super::Args;

/// `(fn, list)` argument positions.
pub(super) fn fn_and_list(args: &Args) -> (usize, usize) {
    if args.is_lambda(1) && !args.is_lambda(0) {
        (1, 0)
    } else {
        (0, 1)
    }
}

fn higher_order(helper: &str, args: &Args) -> String {
    let (f, xs) = fn_and_list(args);
    format!("{helper}({}, {})", args.code(f), args.code(xs))
}

pub(super) fn literal<S: AsRef<str>>(items: &[S]) -> String {
    let items: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    format!("__list({{{}}})", items.join(", "))
}

pub(super) fn map(args: &Args) -> String {
    higher_order("__map", args)
}

pub(super) fn filter(args: &Args) -> String {
    higher_order("__filter", args)
}

pub(super) fn sort_by(args: &Args) -> String {
    higher_order("__sort_by", args)
}

pub(super) fn flat_map(args: &Args) -> String {
    higher_order("__flat_map", args)
}

/// `any` and `all`, with an optional predicate.
pub(super) fn quantifier(helper: &str, args: &Args) -> String {
    if args.len() == 1 {
        return format!("{helper}(nil, {})", args.code(0));
    }
    higher_order(helper, args)
}

/// Argument positions of a three-argument reduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct ReduceLayout {
    pub f: usize,
    pub init: usize,
    pub xs: usize,
    /// Whether argument types fixed which data argument is the list.
    pub settled: bool,
}

/// The lambda picks the layout: `(fn init xs)`, `(xs fn init)` or
/// `(xs init fn)`. A data argument known not to be a list is the initial
/// value wherever it appears; two known lists keep the positional reading.
pub(super) fn reduce_layout(args: &Args) -> ReduceLayout {
    let (f, init, xs) = if args.is_lambda(0) {
        (0, 1, 2)
    } else if args.is_lambda(1) {
        (1, 2, 0)
    } else if args.is_lambda(2) {
        (2, 1, 0)
    } else {
        (0, 1, 2)
    };
    let (init, xs, settled) = match (args.is_list(init), args.is_list(xs)) {
        (Some(false), _) => (init, xs, true),
        (_, Some(false)) => (xs, init, true),
        (Some(true), Some(true)) => (init, xs, true),
        _ => (init, xs, false),
    };
    ReduceLayout {
        f,
        init,
        xs,
        settled,
    }
}

/// Without an initial value: `(fn xs)` or `(xs fn)`. An unsettled layout
/// defers to the runtime, which swaps a scalar list argument with a table
/// initial value.
pub(super) fn reduce(args: &Args) -> String {
    if args.len() == 2 {
        return higher_order("__fold", args);
    }
    let layout = reduce_layout(args);
    let helper = if layout.settled { "__reduce" } else { "__reduce_either" };
    format!(
        "{helper}({}, {}, {})",
        args.code(layout.f),
        args.code(layout.init),
        args.code(layout.xs)
    )
}

/// One-based element access by a fixed position.
pub(super) fn element(args: &Args, index: usize) -> String {
    format!("({})[{index}]", args.code(0))
}
