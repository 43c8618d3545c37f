//! String builtin lowering.

use super::{Args, helper};
use starshot_ir::Prim;

/// `concat` of exactly two string literals folds to Lua's `..`.
pub(super) fn concat(args: &Args) -> String {
    let codes = args.codes();
    if codes.len() == 2 && codes.iter().all(|c| is_string_literal(c)) {
        return format!("({} .. {})", codes[0], codes[1]);
    }
    helper("__concat", args)
}

/// Float arguments shown with their fraction, as `to-string` shows them.
pub(super) fn show_floats(args: &Args) -> Args {
    args.clone().map_codes(|arg| {
        if arg.ty.as_ref().is_some_and(|ty| ty.is_prim(Prim::Float)) {
            format!("__float_str({})", arg.code)
        } else {
            arg.code.clone()
        }
    })
}

pub(super) fn to_string(args: &Args) -> String {
    if args.is_float(0) {
        return format!("__float_str({})", args.code(0));
    }
    helper("__tostr", args)
}

pub(super) fn format(args: &Args) -> String {
    helper("__format", args)
}

pub(super) fn length(args: &Args) -> String {
    format!("#({})", args.code(0))
}

/// Zero-based character index.
pub(super) fn char_at(args: &Args) -> String {
    format!(
        "__sub({s}, ({i}) + 1, ({i}) + 1)",
        s = args.code(0),
        i = args.code(1)
    )
}

fn is_string_literal(code: &str) -> bool {
    code.len() >= 2 && code.starts_with('"') && code.ends_with('"')
}
