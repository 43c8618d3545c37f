//! Arithmetic operator lowering.

use super::Args;
use starshot_ir::Operator;

/// Lowers an arithmetic operator over one or more operands.
///
/// `/` divides exactly when any operand is known to be a Float and floors
/// otherwise. `/` and `%` go through helpers that raise on a zero divisor.
pub(super) fn arithmetic(op: Operator, args: &Args, float: bool) -> String {
    let codes = args.codes();
    match (op, codes.as_slice()) {
        (Operator::Sub, [x]) => format!("(-{x})"),
        (_, [x]) => x.to_string(),
        (Operator::Div, [first, rest @ ..]) if !float => fold("__idiv", first, rest),
        (Operator::Mod, [first, rest @ ..]) => fold("__mod", first, rest),
        _ => format!("({})", codes.join(format!(" {} ", op.symbol()).as_str())),
    }
}

fn fold(helper: &str, first: &str, rest: &[&str]) -> String {
    rest.iter()
        .fold(first.to_string(), |acc, x| format!("{helper}({acc}, {x})"))
}
