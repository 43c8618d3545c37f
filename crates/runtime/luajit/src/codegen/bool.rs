//! Comparison and boolean lowering.

use super::Args;
use starshot_ir::Operator;

fn compare(op: Operator, a: &str, b: &str) -> String {
    match op {
        Operator::Eq => format!("__eq({a}, {b})"),
        Operator::Ne => format!("(not __eq({a}, {b}))"),
        _ => format!("({a} {} {b})", op.symbol()),
    }
}

/// Chained comparisons hold pairwise: `(< a b c)` is `a < b and b < c`.
pub(super) fn comparison(op: Operator, args: &Args) -> String {
    let codes = args.codes();
    let pairs: Vec<String> = codes.windows(2).map(|w| compare(op, w[0], w[1])).collect();
    match pairs.as_slice() {
        [] => "true".to_string(),
        [single] => single.clone(),
        _ => format!("({})", pairs.join(" and ")),
    }
}

/// Whether evaluating `code` twice is indistinguishable from once.
pub(super) fn is_simple(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// A chain whose operands are each evaluated once, left to right, stopping
/// at the first pair that fails.
pub(super) fn chained(op: Operator, codes: &[&str], temps: &[String]) -> String {
    let mut body = format!("local {}, {} = {}, {}", temps[0], temps[1], codes[0], codes[1]);
    for i in 2..codes.len() {
        body.push_str(&format!(
            " if not {} then return false end local {} = {}",
            compare(op, &temps[i - 2], &temps[i - 1]),
            temps[i],
            codes[i]
        ));
    }
    let n = codes.len();
    format!(
        "(function() {body} return {} end)()",
        compare(op, &temps[n - 2], &temps[n - 1])
    )
}

pub(super) fn logical(op: Operator, args: &Args) -> String {
    let codes = args.codes();
    if let [single] = codes.as_slice() {
        return single.to_string();
    }
    format!("({})", codes.join(format!(" {} ", op.symbol()).as_str()))
}

pub(super) fn not(args: &Args) -> String {
    format!("(not {})", args.code(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chained_binds_each_operand_once() {
        let temps = ["__c1".to_string(), "__c2".to_string(), "__c3".to_string()];
        assert_eq!(
            chained(Operator::Lt, &["a", "f(b)", "c"], &temps),
            "(function() local __c1, __c2 = a, f(b) if not (__c1 < __c2) then return false end \
             local __c3 = c return (__c2 < __c3) end)()"
        );
    }

    #[test]
    fn test_simple_operands() {
        assert!(is_simple("count"));
        assert!(is_simple("2.5"));
        assert!(!is_simple("f(x)"));
        assert!(!is_simple("(-1)"));
    }
}
