//! Records and dictionaries.

use super::{Args, CompileError, lua_string_literal};

pub(super) fn record(type_name: &str, fields: &[(&str, String)]) -> String {
    let fields: Vec<String> = fields
        .iter()
        .map(|(name, value)| format!("[{}] = {value}", lua_string_literal(name)))
        .collect();
    format!("__setmt({{{}}}, {type_name})", fields.join(", "))
}

pub(super) fn get(object: &str, field: &str) -> String {
    format!("({object})[{}]", lua_string_literal(field))
}

/// Functional update: the source record is left untouched.
pub(super) fn set(object: &str, field: &str, value: &str) -> String {
    format!("__set({object}, {}, {value})", lua_string_literal(field))
}

pub(super) fn dict(args: &Args) -> Result<String, CompileError> {
    if args.len() % 2 != 0 {
        return Err(CompileError::InvalidArguments(format!(
            "dict expects key/value pairs, got {} argument(s)",
            args.len()
        )));
    }
    let codes = args.codes();
    let entries: Vec<String> = codes
        .chunks(2)
        .map(|pair| format!("[{}] = {}", pair[0], pair[1]))
        .collect();
    Ok(format!("{{{}}}", entries.join(", ")))
}

pub(super) fn has_key(args: &Args) -> String {
    format!("(({})[{}] ~= nil)", args.code(0), args.code(1))
}
