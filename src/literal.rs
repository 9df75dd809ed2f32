//! Lua literal serialization for host values.
//!
//! Turns plain data into Lua source that evaluates to an equal value,
//! for emitting configuration or data files.

use std::fmt::Write;

use crate::token::is_identifier;

/// A value representable as a Lua literal.
#[derive(Debug, Clone, PartialEq)]
pub enum LuaValue {
    Nil,
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
    /// Key/value pairs in insertion order.
    Table(Vec<(LuaValue, LuaValue)>),
}

impl LuaValue {
    /// A sequence table with keys `1..=n`.
    #[must_use]
    pub fn list(items: impl IntoIterator<Item = Self>) -> Self {
        Self::Table(
            items
                .into_iter()
                .zip(1..)
                .map(|(value, key)| (Self::Integer(key), value))
                .collect(),
        )
    }

    /// A table with string keys.
    #[must_use]
    pub fn record<K: Into<String>>(entries: impl IntoIterator<Item = (K, Self)>) -> Self {
        Self::Table(
            entries
                .into_iter()
                .map(|(k, v)| (Self::String(k.into()), v))
                .collect(),
        )
    }
}

impl From<bool> for LuaValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for LuaValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for LuaValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for LuaValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for LuaValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for LuaValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Nil, Into::into)
    }
}

/// Serialize `value` as a Lua expression.
///
/// Leading entries keyed `1, 2, ...` are written positionally; the rest
/// as `name = v` or `[key] = v`. Entries whose key is `nil` or NaN
/// cannot exist in a Lua table and are skipped.
#[must_use]
pub fn to_lua_literal(value: &LuaValue) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &LuaValue) {
    match value {
        LuaValue::Nil => out.push_str("nil"),
        LuaValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        LuaValue::Integer(i) => write_integer(out, *i),
        LuaValue::Number(n) => write_number(out, *n),
        LuaValue::String(s) => out.push_str(&quote_string(s)),
        LuaValue::Table(entries) => write_table(out, entries),
    }
}

fn write_integer(out: &mut String, value: i64) {
    if value == i64::MIN {
        out.push_str("math.mininteger");
    } else {
        let _ = write!(out, "{value}");
    }
}

fn write_number(out: &mut String, value: f64) {
    if value.is_nan() {
        out.push_str("0/0");
    } else if value.is_infinite() {
        out.push_str(if value > 0.0 { "math.huge" } else { "-math.huge" });
    } else {
        // `{:?}` keeps a fraction or exponent so the literal stays a float
        let _ = write!(out, "{value:?}");
    }
}

fn write_table(out: &mut String, entries: &[(LuaValue, LuaValue)]) {
    out.push('{');
    let mut next_index = Some(1);
    let mut first = true;
    for (key, value) in entries {
        if matches!(key, LuaValue::Nil) || matches!(key, LuaValue::Number(n) if n.is_nan()) {
            continue;
        }
        if !first {
            out.push_str(", ");
        }
        first = false;

        match key {
            LuaValue::Integer(i) if next_index == Some(*i) => {
                next_index = i.checked_add(1);
            }
            LuaValue::String(name) if is_identifier(name) => {
                next_index = None;
                out.push_str(name);
                out.push_str(" = ");
            }
            _ => {
                next_index = None;
                out.push('[');
                write_value(out, key);
                out.push_str("] = ");
            }
        }
        write_value(out, value);
    }
    out.push('}');
}

/// Quote `s` as a double-quoted Lua string.
///
/// Control bytes become three-digit decimal escapes so a following
/// digit cannot extend them.
#[must_use]
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\{:03}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Count the entries of any iterable container, stopping at `limit`.
#[must_use]
pub fn count_entries<I: IntoIterator>(container: I, limit: Option<usize>) -> usize {
    let iter = container.into_iter();
    match limit {
        Some(limit) => iter.take(limit).count(),
        None => iter.count(),
    }
}
