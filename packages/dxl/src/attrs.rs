//! Attribute sets and typed attribute conversion.
//!
//! Handlers read their attributes through [`Attrs`], which converts the raw
//! strings of one opening tag into typed values. Every conversion either
//! produces a value or fails with an error naming the element, the attribute
//! and the raw text that could not be converted.

use crate::config::{LIST_OF_LISTS_SEPARATOR, LIST_SEPARATOR};
use crate::error::{DxlError, Result};

/// A value that can be read from one attribute's raw string.
pub trait FromAttr: Sized {
    /// Human-readable description of the expected format, used in errors.
    const EXPECTED: &'static str;

    /// Convert a raw attribute value, returning `None` when it is malformed.
    fn from_attr(raw: &str) -> Option<Self>;
}

impl FromAttr for bool {
    const EXPECTED: &'static str = "boolean (true/false)";

    fn from_attr(raw: &str) -> Option<Self> {
        match raw {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

impl FromAttr for String {
    const EXPECTED: &'static str = "string";

    fn from_attr(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

macro_rules! from_attr_number {
    ($($ty:ty => $expected:literal),* $(,)?) => {
        $(
            impl FromAttr for $ty {
                const EXPECTED: &'static str = $expected;

                fn from_attr(raw: &str) -> Option<Self> {
                    raw.parse().ok()
                }
            }
        )*
    };
}

from_attr_number! {
    i16 => "16-bit integer",
    i32 => "integer",
    i64 => "64-bit integer",
    u32 => "unsigned integer",
    u64 => "unsigned 64-bit integer",
    usize => "unsigned integer",
    f64 => "floating point number",
}

/// Implement [`FromAttr`] for enums that derive `strum::EnumString`.
macro_rules! from_attr_enum {
    ($($ty:ty => $expected:literal),* $(,)?) => {
        $(
            impl $crate::attrs::FromAttr for $ty {
                const EXPECTED: &'static str = $expected;

                fn from_attr(raw: &str) -> Option<Self> {
                    raw.parse().ok()
                }
            }
        )*
    };
}

pub(crate) use from_attr_enum;

/// The ordered attributes of one opening tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs {
    element: String,
    entries: Vec<(String, String)>,
}

impl Attrs {
    /// Create an empty attribute set for the named element.
    #[must_use]
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            entries: Vec::new(),
        }
    }

    /// Create an attribute set from (name, value) pairs.
    pub fn from_pairs<K, V>(element: impl Into<String>, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            element: element.into(),
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Add an attribute, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Append an attribute.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Name of the element these attributes belong to.
    #[must_use]
    pub fn element(&self) -> &str {
        &self.element
    }

    /// Raw value of an attribute; the first occurrence wins.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Check whether an attribute is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over (name, value) pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read a required attribute.
    ///
    /// # Errors
    /// `MissingRequiredAttribute` when absent, `MalformedAttributeValue` when
    /// the value cannot be converted.
    pub fn required<T: FromAttr>(&self, name: &str) -> Result<T> {
        let raw = self.get(name).ok_or_else(|| self.missing(name))?;
        self.convert(name, raw)
    }

    /// Read an optional attribute.
    ///
    /// # Errors
    /// `MalformedAttributeValue` when present but unconvertible.
    pub fn optional<T: FromAttr>(&self, name: &str) -> Result<Option<T>> {
        self.get(name).map(|raw| self.convert(name, raw)).transpose()
    }

    /// Read an optional attribute, falling back to `default` when absent.
    ///
    /// # Errors
    /// `MalformedAttributeValue` when present but unconvertible.
    pub fn optional_or<T: FromAttr>(&self, name: &str, default: T) -> Result<T> {
        Ok(self.optional(name)?.unwrap_or(default))
    }

    /// Read a required comma-separated list.
    ///
    /// An empty value yields an empty list. The whole list fails on the first
    /// malformed item.
    ///
    /// # Errors
    /// `MissingRequiredAttribute` or `MalformedAttributeValue`.
    pub fn list<T: FromAttr>(&self, name: &str) -> Result<Vec<T>> {
        let raw = self.get(name).ok_or_else(|| self.missing(name))?;
        self.split_list(name, raw, 0)
    }

    /// Read an optional comma-separated list; absent means empty.
    ///
    /// # Errors
    /// `MalformedAttributeValue` when any item is malformed.
    pub fn optional_list<T: FromAttr>(&self, name: &str) -> Result<Vec<T>> {
        match self.get(name) {
            Some(raw) => self.split_list(name, raw, 0),
            None => Ok(Vec::new()),
        }
    }

    /// Read a required list of lists (`1,2;3,4`).
    ///
    /// # Errors
    /// `MissingRequiredAttribute` or `MalformedAttributeValue`.
    pub fn list_of_lists<T: FromAttr>(&self, name: &str) -> Result<Vec<Vec<T>>> {
        let raw = self.get(name).ok_or_else(|| self.missing(name))?;
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        let mut offset = 0;
        raw.split(LIST_OF_LISTS_SEPARATOR)
            .map(|inner| {
                let items = self.split_list(name, inner, offset)?;
                offset += items.len();
                Ok(items)
            })
            .collect()
    }

    /// Read an optional list of lists; absent means empty.
    ///
    /// # Errors
    /// `MalformedAttributeValue` when any item is malformed.
    pub fn optional_list_of_lists<T: FromAttr>(&self, name: &str) -> Result<Vec<Vec<T>>> {
        if self.contains(name) {
            self.list_of_lists(name)
        } else {
            Ok(Vec::new())
        }
    }

    /// Split one comma-separated list; `offset` is the flat index of its first item.
    fn split_list<T: FromAttr>(&self, name: &str, list: &str, offset: usize) -> Result<Vec<T>> {
        if list.is_empty() {
            return Ok(Vec::new());
        }
        list.split(LIST_SEPARATOR)
            .enumerate()
            .map(|(i, item)| {
                T::from_attr(item).ok_or_else(|| DxlError::MalformedListItem {
                    element: self.element.clone(),
                    attribute: name.to_string(),
                    index: offset + i,
                    item: item.to_string(),
                    expected: T::EXPECTED,
                })
            })
            .collect()
    }

    fn convert<T: FromAttr>(&self, name: &str, raw: &str) -> Result<T> {
        T::from_attr(raw).ok_or_else(|| self.malformed(name, raw, T::EXPECTED))
    }

    /// Build a `MissingRequiredAttribute` error for this element.
    pub fn missing(&self, name: &str) -> DxlError {
        DxlError::MissingRequiredAttribute {
            element: self.element.clone(),
            attribute: name.to_string(),
        }
    }

    /// Build a `MalformedAttributeValue` error for this element.
    pub fn malformed(&self, name: &str, raw: &str, expected: &'static str) -> DxlError {
        DxlError::MalformedAttributeValue {
            element: self.element.clone(),
            attribute: name.to_string(),
            value: raw.to_string(),
            expected,
        }
    }
}
