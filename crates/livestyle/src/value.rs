//! Leaf values of a style definition.
//!
//! A leaf is either a [`CssValue`] fixed when the definition is built, or a
//! [`DynamicValue`] that produces a `CssValue` from the live component each
//! time dynamic rules are rendered.

use std::fmt;
use std::sync::Arc;

/// Error returned by a failing dynamic value producer.
pub type ValueError = Box<dyn std::error::Error + Send + Sync>;

/// A literal CSS value: text or a number.
///
/// Numbers print without a trailing `.0` when they are whole, so `0` renders
/// as `0` and `1.5` as `1.5`. No unit is ever appended.
///
/// # Example
///
/// ```rust
/// use livestyle::CssValue;
///
/// assert_eq!(CssValue::from("red").to_string(), "red");
/// assert_eq!(CssValue::from(12).to_string(), "12");
/// assert_eq!(CssValue::from(0.5).to_string(), "0.5");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum CssValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for CssValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssValue::Text(text) => f.write_str(text),
            CssValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
        }
    }
}

impl From<&str> for CssValue {
    fn from(text: &str) -> Self {
        CssValue::Text(text.to_string())
    }
}

impl From<String> for CssValue {
    fn from(text: String) -> Self {
        CssValue::Text(text)
    }
}

impl From<&String> for CssValue {
    fn from(text: &String) -> Self {
        CssValue::Text(text.clone())
    }
}

macro_rules! number_into_css_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for CssValue {
                fn from(n: $ty) -> Self {
                    CssValue::Number(n as f64)
                }
            }
        )*
    };
}

number_into_css_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

type Producer<C> = dyn Fn(&C) -> Result<CssValue, ValueError> + Send + Sync;

/// A value producer evaluated against the component on every render.
///
/// Producers are shared (`Arc`) so a rule set can be cloned between the
/// registry and each manager without copying closures.
///
/// # Example
///
/// ```rust
/// use livestyle::DynamicValue;
///
/// struct Panel { width: u32 }
///
/// let width = DynamicValue::new(|panel: &Panel| format!("{}px", panel.width));
/// assert_eq!(width.evaluate(&Panel { width: 40 }).unwrap().to_string(), "40px");
/// ```
pub struct DynamicValue<C> {
    producer: Arc<Producer<C>>,
}

impl<C> DynamicValue<C> {
    /// Wraps an infallible producer.
    pub fn new<F, V>(producer: F) -> Self
    where
        F: Fn(&C) -> V + Send + Sync + 'static,
        V: Into<CssValue>,
    {
        Self {
            producer: Arc::new(move |component: &C| -> Result<CssValue, ValueError> {
                Ok(producer(component).into())
            }),
        }
    }

    /// Wraps a producer that can fail.
    ///
    /// Failures surface from rendering as
    /// [`StyleError::DynamicValue`](crate::StyleError::DynamicValue).
    pub fn try_new<F, V>(producer: F) -> Self
    where
        F: Fn(&C) -> Result<V, ValueError> + Send + Sync + 'static,
        V: Into<CssValue>,
    {
        Self {
            producer: Arc::new(move |component: &C| -> Result<CssValue, ValueError> {
                producer(component).map(Into::into)
            }),
        }
    }

    /// Runs the producer against `component`.
    pub fn evaluate(&self, component: &C) -> Result<CssValue, ValueError> {
        (self.producer)(component)
    }
}

impl<C> Clone for DynamicValue<C> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
        }
    }
}

impl<C> fmt::Debug for DynamicValue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DynamicValue(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_numbers_print_without_fraction() {
        assert_eq!(CssValue::from(0).to_string(), "0");
        assert_eq!(CssValue::from(-3i64).to_string(), "-3");
        assert_eq!(CssValue::from(2.0f64).to_string(), "2");
    }

    #[test]
    fn test_fractional_numbers_keep_fraction() {
        assert_eq!(CssValue::from(0.25f64).to_string(), "0.25");
    }

    #[test]
    fn test_text_passes_through() {
        let value: CssValue = String::from("1px solid black").into();
        assert_eq!(value.to_string(), "1px solid black");
    }

    #[test]
    fn test_dynamic_value_reads_component() {
        let value = DynamicValue::new(|n: &i32| n * 2);
        assert_eq!(value.evaluate(&21).unwrap(), CssValue::Number(42.0));
    }

    #[test]
    fn test_try_new_propagates_failure() {
        let value = DynamicValue::try_new(|n: &i32| {
            if *n < 0 {
                Err("negative".into())
            } else {
                Ok(*n)
            }
        });
        assert!(value.evaluate(&1).is_ok());
        let err = value.evaluate(&-1).unwrap_err();
        assert_eq!(err.to_string(), "negative");
    }

    #[test]
    fn test_clone_shares_producer() {
        let value = DynamicValue::new(|_: &()| "shared");
        let copy = value.clone();
        assert!(Arc::ptr_eq(&value.producer, &copy.producer));
    }
}
