//! The closed catalogue of builtin functions.
//!
//! Every builtin the surface language knows is a variant here; lowering rules
//! live with each execution target and match on this enum exhaustively.

use serde::Serialize;

use crate::ast::Effect;

macro_rules! builtins {
    ($($variant:ident => $name:literal, $min:literal, $max:expr;)*) => {
        /// Fixed-name primitive operations.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum Builtin {
            $($variant,)*
        }

        impl Builtin {
            pub const ALL: &'static [Builtin] = &[$(Builtin::$variant,)*];

            /// Canonical (hyphenated) spelling.
            pub fn name(self) -> &'static str {
                match self {
                    $(Builtin::$variant => $name,)*
                }
            }

            /// Accepted argument counts, inclusive.
            pub fn arity(self) -> (usize, usize) {
                match self {
                    $(Builtin::$variant => ($min, $max),)*
                }
            }
        }
    };
}

builtins! {
    Not => "not", 1, 1;
    Map => "map", 2, 2;
    Filter => "filter", 2, 2;
    Reduce => "reduce", 2, 3;
    Head => "head", 1, 1;
    Tail => "tail", 1, 1;
    Cons => "cons", 2, 2;
    Append => "append", 2, 2;
    Nth => "nth", 2, 2;
    Range => "range", 1, 3;
    IsEmpty => "empty?", 1, 1;
    SortBy => "sort-by", 2, 2;
    Length => "length", 1, 1;
    Concat => "concat", 1, usize::MAX;
    Substr => "substr", 2, 3;
    Split => "split", 2, 2;
    Join => "join", 2, 2;
    Format => "format", 1, usize::MAX;
    Print => "print", 0, usize::MAX;
    ReadLine => "read-line", 0, 0;
    IsSome => "some?", 1, 1;
    Unwrap => "unwrap", 1, 1;
    MapOpt => "map-opt", 2, 2;
    OrElse => "or-else", 2, 2;
    Reverse => "reverse", 1, 1;
    First => "first", 1, 1;
    Second => "second", 1, 1;
    Last => "last", 1, 1;
    Contains => "contains", 2, 2;
    Abs => "abs", 1, 1;
    Min => "min", 1, 2;
    Max => "max", 1, 2;
    ToString => "to-string", 1, 1;
    ToInt => "to-int", 1, 1;
    ToFloat => "to-float", 1, 1;
    ToLower => "to-lower", 1, 1;
    ToUpper => "to-upper", 1, 1;
    StringLength => "string-length", 1, 1;
    CharAt => "char-at", 2, 2;
    StartsWith => "string-starts-with", 2, 2;
    EndsWith => "string-ends-with", 2, 2;
    StringContains => "string-contains", 2, 2;
    StringReplace => "string-replace", 3, 3;
    StringTrim => "string-trim", 1, 1;
    FlatMap => "flat-map", 2, 2;
    Zip => "zip", 2, 2;
    Take => "take", 2, 2;
    Drop => "drop", 2, 2;
    Slice => "slice", 3, 3;
    IndexOf => "index-of", 2, 2;
    Sum => "sum", 1, 1;
    Product => "product", 1, 1;
    Any => "any", 1, 2;
    All => "all", 1, 2;
    Enumerate => "enumerate", 1, 1;
    Dict => "dict", 0, usize::MAX;
    Keys => "keys", 1, 1;
    Values => "values", 1, 1;
    HasKey => "has-key", 2, 2;
    GetOr => "get-or", 3, 3;
    IntToString => "int-to-string", 1, 1;
    ListGet => "list-get", 2, 2;
    Tuple => "tuple", 2, usize::MAX;
}

impl Builtin {
    /// Look a builtin up by any accepted spelling.
    ///
    /// Hyphens and underscores are interchangeable and a trailing `?` may be
    /// written `_q`, so `sort_by`, `empty_q` and `empty?` all resolve.
    pub fn from_name(name: &str) -> Option<Builtin> {
        let canonical = normalize(name);
        Builtin::ALL
            .iter()
            .copied()
            .find(|b| b.name() == canonical)
    }

    /// The effect calling this builtin requires, if any.
    pub fn effect(self) -> Option<Effect> {
        match self {
            Builtin::Print | Builtin::ReadLine => Some(Effect::Io),
            _ => None,
        }
    }

    /// Builtins whose arguments may be given function-first or list-first.
    pub fn takes_function(self) -> bool {
        matches!(
            self,
            Builtin::Map
                | Builtin::Filter
                | Builtin::Reduce
                | Builtin::SortBy
                | Builtin::FlatMap
                | Builtin::Any
                | Builtin::All
                | Builtin::MapOpt
        )
    }
}

fn normalize(name: &str) -> String {
    let base = name
        .strip_suffix("_q")
        .map(|stem| format!("{stem}?"));
    base.unwrap_or_else(|| name.to_string()).replace('_', "-")
}
