//! String methods.
//!
//! Strings are immutable and never wrapped; this table is what method reads
//! on a `str` resolve to.

use crate::error::{RuntimeError, RuntimeResult};
use crate::object::Value;
use crate::types::function::{arg, check_arity};
use crate::types::{MethodTable, method_table};
use std::sync::OnceLock;

pub(crate) fn methods() -> &'static MethodTable {
    static METHODS: OnceLock<MethodTable> = OnceLock::new();
    METHODS.get_or_init(|| {
        method_table(
            "str",
            &[
                ("upper", upper),
                ("lower", lower),
                ("strip", strip),
                ("startswith", startswith),
                ("endswith", endswith),
                ("find", find),
                ("count", count),
                ("split", split),
                ("join", join),
            ],
        )
    })
}

fn receiver<'a>(args: &'a [Value], method: &str) -> RuntimeResult<&'a str> {
    str_arg(arg(args, 0, method)?, method)
}

fn str_arg<'a>(value: &'a Value, method: &str) -> RuntimeResult<&'a str> {
    value.as_str().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "{method}() argument must be str, not '{}'",
            value.kind_name()
        ))
    })
}

fn upper(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 1, 1, "upper")?;
    Ok(Value::from(receiver(args, "upper")?.to_uppercase()))
}

fn lower(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 1, 1, "lower")?;
    Ok(Value::from(receiver(args, "lower")?.to_lowercase()))
}

fn strip(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 1, 2, "strip")?;
    let s = receiver(args, "strip")?;
    let stripped = match args.get(1) {
        None | Some(Value::None) => s.trim(),
        Some(chars) => {
            let chars: Vec<char> = str_arg(chars, "strip")?.chars().collect();
            s.trim_matches(chars.as_slice())
        }
    };
    Ok(Value::from(stripped))
}

fn startswith(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 2, "startswith")?;
    let s = receiver(args, "startswith")?;
    Ok(Value::Bool(s.starts_with(str_arg(&args[1], "startswith")?)))
}

fn endswith(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 2, "endswith")?;
    let s = receiver(args, "endswith")?;
    Ok(Value::Bool(s.ends_with(str_arg(&args[1], "endswith")?)))
}

/// Character (not byte) offset of the first occurrence, or -1.
fn find(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 2, "find")?;
    let s = receiver(args, "find")?;
    let needle = str_arg(&args[1], "find")?;
    Ok(match s.find(needle) {
        Some(byte) => Value::from(s[..byte].chars().count()),
        None => Value::Int(-1),
    })
}

fn count(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 2, "count")?;
    let s = receiver(args, "count")?;
    let needle = str_arg(&args[1], "count")?;
    let n = if needle.is_empty() {
        s.chars().count() + 1
    } else {
        s.matches(needle).count()
    };
    Ok(Value::from(n))
}

fn split(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 1, 2, "split")?;
    let s = receiver(args, "split")?;
    let parts: Vec<Value> = match args.get(1) {
        None | Some(Value::None) => s.split_whitespace().map(Value::from).collect(),
        Some(sep) => {
            let sep = str_arg(sep, "split")?;
            if sep.is_empty() {
                return Err(RuntimeError::value_error("empty separator"));
            }
            s.split(sep).map(Value::from).collect()
        }
    };
    Ok(Value::list(parts))
}

fn join(args: &[Value]) -> RuntimeResult<Value> {
    check_arity(args, 2, 2, "join")?;
    let sep = receiver(args, "join")?;
    let mut parts = Vec::new();
    for (i, item) in args[1].iter()?.into_iter().enumerate() {
        match item.as_str() {
            Some(s) => parts.push(s.to_string()),
            None => {
                return Err(RuntimeError::type_error(format!(
                    "sequence item {i}: expected str instance, {} found",
                    item.kind_name()
                )));
            }
        }
    }
    Ok(Value::from(parts.join(sep)))
}
