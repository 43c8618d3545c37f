//! Option lowering. `none` is `nil` and `(some x)` is `x` itself.

use super::{Args, helper};

pub(super) fn is_some(args: &Args) -> String {
    format!("({} ~= nil)", args.code(0))
}

/// `(map-opt fn o)`, or `(map-opt o fn)` when the lambda comes second.
pub(super) fn map_opt(args: &Args) -> String {
    if args.is_lambda(1) && !args.is_lambda(0) {
        format!("__map_opt({}, {})", args.code(1), args.code(0))
    } else {
        helper("__map_opt", args)
    }
}
