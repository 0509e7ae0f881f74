//! Assertion primitives
//!
//! Each check turns into exactly one `PASS` or `FAIL` entry. None of them
//! interrupts control flow; a test that cannot continue after a failed check
//! has to return on its own.

use std::fmt::Display;

use crate::log::{LogChannel, LogKind};

/// Equality with same-value semantics: `NaN` equals itself and the two
/// signed zeros are distinct.
pub trait SameValue<Rhs: ?Sized = Self> {
    fn same_value(&self, other: &Rhs) -> bool;
}

fn same_f64(a: f64, b: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    a == b && a.is_sign_negative() == b.is_sign_negative()
}

impl SameValue for f64 {
    fn same_value(&self, other: &f64) -> bool {
        same_f64(*self, *other)
    }
}

impl SameValue for f32 {
    fn same_value(&self, other: &f32) -> bool {
        same_f64(f64::from(*self), f64::from(*other))
    }
}

macro_rules! same_value_by_eq {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SameValue for $ty {
                fn same_value(&self, other: &$ty) -> bool {
                    self == other
                }
            }
        )*
    };
}

same_value_by_eq!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, str, String);

impl SameValue<&str> for String {
    fn same_value(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl SameValue<String> for &str {
    fn same_value(&self, other: &String) -> bool {
        *self == other.as_str()
    }
}

impl<T, U> SameValue<&U> for &T
where
    T: SameValue<U> + ?Sized,
    U: ?Sized,
{
    fn same_value(&self, other: &&U) -> bool {
        (**self).same_value(*other)
    }
}

impl SameValue for serde_json::Value {
    fn same_value(&self, other: &serde_json::Value) -> bool {
        use serde_json::Value;

        match (self, other) {
            (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => same_f64(a, b),
                _ => a == b,
            },
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_value(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, x)| b.get(key).map_or(false, |y| x.same_value(y)))
            }
            (a, b) => a == b,
        }
    }
}

/// `PASS msg` when `condition` holds, `FAIL msg` otherwise
pub fn ok(log: &LogChannel, condition: bool, msg: &str) {
    let kind = if condition { LogKind::Pass } else { LogKind::Fail };
    log.append(kind, msg);
}

/// `PASS msg` when `actual` is the same value as `expected`
pub fn is<A, E>(log: &LogChannel, actual: A, expected: E, msg: &str)
where
    A: SameValue<E> + Display,
    E: Display,
{
    if actual.same_value(&expected) {
        log.append(LogKind::Pass, msg);
    } else {
        log.append(
            LogKind::Fail,
            format!("{} - Got {}, expected {}", msg, actual, expected),
        );
    }
}

/// `PASS msg` when `actual` is not the same value as `unexpected`
pub fn isnot<A, E>(log: &LogChannel, actual: A, unexpected: E, msg: &str)
where
    A: SameValue<E> + Display,
    E: Display,
{
    if actual.same_value(&unexpected) {
        log.append(
            LogKind::Fail,
            format!("{} - Didn't expect {}, but got it", msg, actual),
        );
    } else {
        log.append(LogKind::Pass, msg);
    }
}

pub fn info(log: &LogChannel, msg: &str) {
    log.append(LogKind::Info, msg);
}
