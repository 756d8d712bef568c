//! `repr` and `str` rendering.
//!
//! [`Value::repr`] renders the unambiguous form, [`Value::py_str`] the
//! readable form. [`limited_repr`] renders a size-bounded form following
//! [`ReprLimits`]; proxies use it to describe their target.
//!
//! Lists and dicts that contain themselves render the inner occurrence as
//! `[...]` / `{...}`.

use crate::config::ReprLimits;
use crate::error::{RuntimeError, RuntimeResult};
use crate::object::ops::special;
use crate::object::{Complex, Value};
use rustc_hash::FxHashSet;
use std::cell::RefCell;

thread_local! {
    /// Containers currently being rendered on this thread.
    static ACTIVE: RefCell<FxHashSet<usize>> = RefCell::new(FxHashSet::default());
}

/// Marks a container as being rendered until dropped.
struct ReprGuard(usize);

impl ReprGuard {
    /// `None` when `id` is already being rendered further up the stack.
    fn enter(id: usize) -> Option<Self> {
        ACTIVE.with(|active| active.borrow_mut().insert(id).then_some(Self(id)))
    }
}

impl Drop for ReprGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            active.borrow_mut().remove(&self.0);
        });
    }
}

impl Value {
    /// `repr(obj)`.
    pub fn repr(&self) -> RuntimeResult<String> {
        Ok(match self {
            Value::None => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Complex(c) => format_complex(c),
            Value::Str(s) => quote_str(s),
            Value::Bytes(b) => quote_bytes(b),
            Value::Tuple(t) => {
                let items = join_reprs(t.as_slice())?;
                if t.len() == 1 {
                    format!("({items},)")
                } else {
                    format!("({items})")
                }
            }
            Value::List(l) => match self.identity().and_then(ReprGuard::enter) {
                Some(_guard) => format!("[{}]", join_reprs(&l.snapshot())?),
                None => "[...]".to_string(),
            },
            Value::Set(s) if s.is_empty() => "set()".to_string(),
            Value::Set(s) => format!("{{{}}}", join_reprs(&s.snapshot())?),
            Value::Dict(d) => match self.identity().and_then(ReprGuard::enter) {
                Some(_guard) => {
                    let mut parts = Vec::with_capacity(d.len());
                    for (k, v) in d.items() {
                        parts.push(format!("{}: {}", k.repr()?, v.repr()?));
                    }
                    format!("{{{}}}", parts.join(", "))
                }
                None => "{...}".to_string(),
            },
            Value::Slice(s) => s.to_string(),
            Value::Instance(inst) => match special(inst.class(), self, "__repr__") {
                Some(repr) => expect_str(repr.call(&[])?, "__repr__")?,
                None => format!("<{} object>", inst.class().name()),
            },
            Value::Class(c) => format!("<class '{}'>", c.name()),
            Value::Function(f) => format!("<function {}>", f.qualname()),
            Value::BoundMethod(m) => format!(
                "<bound method {} of {}>",
                m.function().qualname(),
                m.receiver().repr()?
            ),
            Value::Property(_) => "<property object>".to_string(),
            Value::Proxy(p) => p.repr()?,
        })
    }

    /// `str(obj)`.
    pub fn py_str(&self) -> RuntimeResult<String> {
        match self {
            Value::Str(s) => Ok(s.to_string()),
            Value::Proxy(p) => p.str(),
            Value::Instance(inst) => match special(inst.class(), self, "__str__") {
                Some(str_fn) => expect_str(str_fn.call(&[])?, "__str__"),
                None => self.repr(),
            },
            other => other.repr(),
        }
    }

    /// `format(obj, spec)`.
    pub fn format(&self, spec: &str) -> RuntimeResult<String> {
        self.format_as(spec, self)
    }

    pub(crate) fn format_as(&self, spec: &str, receiver: &Value) -> RuntimeResult<String> {
        match self {
            Value::Proxy(p) => p.format(spec),
            Value::Instance(inst) => match special(inst.class(), receiver, "__format__") {
                Some(format_fn) => expect_str(format_fn.call(&[Value::from(spec)])?, "__format__"),
                None if spec.is_empty() => self.py_str(),
                None => Err(unsupported_format(self)),
            },
            other => format_builtin(other, spec),
        }
    }
}

/// The small subset of the format mini-language builtin scalars accept:
/// integer bases (`d`, `x`, `X`, `o`, `b`), fixed-point and percent floats
/// with an optional precision, and `s` for strings.
fn format_builtin(value: &Value, spec: &str) -> RuntimeResult<String> {
    if spec.is_empty() {
        return value.py_str();
    }
    let unknown = || {
        RuntimeError::value_error(format!(
            "Unknown format code '{spec}' for object of type '{}'",
            value.kind_name()
        ))
    };
    match value {
        Value::Int(i) => {
            let sign = if *i < 0 { "-" } else { "" };
            let n = i.unsigned_abs();
            Ok(match spec {
                "d" => i.to_string(),
                "x" => format!("{sign}{n:x}"),
                "X" => format!("{sign}{n:X}"),
                "o" => format!("{sign}{n:o}"),
                "b" => format!("{sign}{n:b}"),
                _ => return Err(unknown()),
            })
        }
        Value::Float(f) => {
            let (precision, kind) = match spec.strip_prefix('.') {
                Some(rest) => {
                    let split = rest.char_indices().last().map_or(0, |(i, _)| i);
                    let digits = rest[..split].parse::<usize>().map_err(|_| unknown())?;
                    (digits, &rest[split..])
                }
                None => (6, spec),
            };
            match kind {
                "f" => Ok(format!("{f:.precision$}")),
                "%" => Ok(format!("{:.precision$}%", f * 100.0)),
                _ => Err(unknown()),
            }
        }
        Value::Str(s) if spec == "s" => Ok(s.to_string()),
        other => Err(unsupported_format(other)),
    }
}

fn unsupported_format(value: &Value) -> RuntimeError {
    RuntimeError::type_error(format!(
        "unsupported format string passed to {}.__format__",
        value.kind_name()
    ))
}

fn expect_str(value: Value, method: &str) -> RuntimeResult<String> {
    match value {
        Value::Str(s) => Ok(s.to_string()),
        other => Err(RuntimeError::type_error(format!(
            "{method} returned non-string (type {})",
            other.kind_name()
        ))),
    }
}

fn join_reprs(items: &[Value]) -> RuntimeResult<String> {
    let parts = items.iter().map(Value::repr).collect::<RuntimeResult<Vec<_>>>()?;
    Ok(parts.join(", "))
}

// =============================================================================
// Scalars
// =============================================================================

/// Shortest round-tripping float text, switching to exponent notation
/// outside `1e-4 <= |f| < 1e16`.
pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let abs = f.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let text = format!("{f:e}");
        let (mantissa, exp) = text.split_once('e').unwrap_or((text.as_str(), "0"));
        let exp: i32 = exp.parse().unwrap_or(0);
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exp.abs());
    }
    let text = f.to_string();
    if text.contains('.') { text } else { format!("{text}.0") }
}

fn format_complex(c: &Complex) -> String {
    fn part(x: f64) -> String {
        if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
            format!("{}", x as i64)
        } else {
            format_float(x)
        }
    }
    if c.re == 0.0 && c.re.is_sign_positive() {
        return format!("{}j", part(c.im));
    }
    let sign = if c.im.is_sign_negative() { '-' } else { '+' };
    format!("({}{sign}{}j)", part(c.re), part(c.im.abs()))
}

/// Quote a string, preferring single quotes.
pub(crate) fn quote_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn quote_bytes(b: &[u8]) -> String {
    let quote = if b.contains(&b'\'') && !b.contains(&b'"') { b'"' } else { b'\'' };
    let mut out = String::with_capacity(b.len() + 3);
    out.push('b');
    out.push(quote as char);
    for &byte in b {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            q if q == quote => {
                out.push('\\');
                out.push(q as char);
            }
            0x20..=0x7e => out.push(byte as char),
            _ => out.push_str(&format!("\\x{byte:02x}")),
        }
    }
    out.push(quote as char);
    out
}

// =============================================================================
// Limited Repr
// =============================================================================

/// Size-bounded `repr` of `value`.
///
/// Containers show at most the configured number of items and nest at most
/// `max_level` deep; long strings, integers and other objects are cut in the
/// middle with `...`.
pub fn limited_repr(value: &Value, limits: &ReprLimits) -> RuntimeResult<String> {
    repr1(value, limits.max_level, limits)
}

fn repr1(value: &Value, level: usize, limits: &ReprLimits) -> RuntimeResult<String> {
    match value {
        Value::Tuple(t) => {
            repr_iterable(t.as_slice(), level, ("(", ")"), limits.max_tuple, true, limits)
        }
        Value::List(l) => repr_iterable(&l.snapshot(), level, ("[", "]"), limits.max_list, false, limits),
        Value::Set(s) if s.is_empty() => Ok("set()".to_string()),
        Value::Set(s) => repr_iterable(&s.snapshot(), level, ("{", "}"), limits.max_set, false, limits),
        Value::Dict(d) => {
            let n = d.len();
            if n == 0 {
                return Ok("{}".to_string());
            }
            if level == 0 {
                return Ok("{...}".to_string());
            }
            let mut pieces = Vec::new();
            for (k, v) in d.items().into_iter().take(limits.max_dict) {
                pieces.push(format!(
                    "{}: {}",
                    repr1(&k, level - 1, limits)?,
                    repr1(&v, level - 1, limits)?
                ));
            }
            if n > limits.max_dict {
                pieces.push("...".to_string());
            }
            Ok(format!("{{{}}}", pieces.join(", ")))
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            if chars.len() <= limits.max_string {
                return Ok(quote_str(s));
            }
            let (i, j) = split_points(limits.max_string);
            let kept: String = chars[..i].iter().chain(&chars[chars.len() - j..]).collect();
            Ok(cut_middle(&quote_str(&kept), i, j))
        }
        Value::Int(n) => Ok(truncate(n.to_string(), limits.max_long)),
        other => Ok(truncate(other.repr()?, limits.max_other)),
    }
}

fn repr_iterable(
    items: &[Value],
    level: usize,
    (left, right): (&str, &str),
    max_items: usize,
    trailing_comma: bool,
    limits: &ReprLimits,
) -> RuntimeResult<String> {
    let n = items.len();
    let body = if level == 0 && n > 0 {
        "...".to_string()
    } else {
        let mut pieces = Vec::new();
        for item in items.iter().take(max_items) {
            pieces.push(repr1(item, level.saturating_sub(1), limits)?);
        }
        if n > max_items {
            pieces.push("...".to_string());
        }
        pieces.join(", ")
    };
    let trail = if n == 1 && trailing_comma { "," } else { "" };
    Ok(format!("{left}{body}{trail}{right}"))
}

/// Characters kept before and after the `...` for a limit of `max`.
fn split_points(max: usize) -> (usize, usize) {
    let i = max.saturating_sub(3) / 2;
    let j = max.saturating_sub(3).saturating_sub(i);
    (i, j)
}

fn cut_middle(s: &str, i: usize, j: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    let tail = chars.len().saturating_sub(j).max(i);
    let mut out: String = chars[..i.min(chars.len())].iter().collect();
    out.push_str("...");
    out.extend(&chars[tail..]);
    out
}

fn truncate(s: String, max: usize) -> String {
    if s.chars().count() <= max {
        return s;
    }
    let (i, j) = split_points(max);
    cut_middle(&s, i, j)
}
