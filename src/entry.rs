use std::str::FromStr;

use crate::error::{Error, Result};

/// A single `key=value` pair inside a section.
///
/// The key is fixed at construction; only the value can change afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Entry {
    key: String,
    value: String,
}

impl Entry {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Whether neither a key nor a value have been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && self.value.is_empty()
    }

    /// # Errors
    ///
    /// Returns [`Error::BadLexicalCast`] unless the whole value is a 32-bit integer.
    pub fn as_int(&self) -> Result<i32> {
        self.cast("i32")
    }

    /// # Errors
    ///
    /// Returns [`Error::BadLexicalCast`] unless the whole value is a 64-bit integer.
    pub fn as_long(&self) -> Result<i64> {
        self.cast("i64")
    }

    /// # Errors
    ///
    /// Returns [`Error::BadLexicalCast`] unless the whole value is a floating-point number.
    pub fn as_double(&self) -> Result<f64> {
        self.cast("f64")
    }

    /// Split the value on `;`, the list separator of desktop entries.
    ///
    /// A single terminating `;` does not produce a trailing empty element, but any other empty
    /// element is kept: `"Utility;;"` yields `["Utility", ""]`.
    #[must_use]
    pub fn as_list(&self) -> Vec<String> {
        if self.value.is_empty() {
            return Vec::new();
        }

        let mut list = self.value.split(';').map(str::to_owned).collect::<Vec<_>>();

        if list.last().is_some_and(String::is_empty) {
            list.pop();
        }

        list
    }

    fn cast<T: FromStr>(&self, target: &'static str) -> Result<T> {
        // `str::parse` rejects empty input and trailing garbage, so a partial parse never succeeds.
        self.value.parse().map_err(|_| Error::BadLexicalCast {
            value: self.value.clone(),
            target,
        })
    }
}
