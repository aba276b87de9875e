//! Specifier-driven formatting of domain values.
//!
//! A format string is a sequence of single-letter specifiers, each selecting
//! one field of the value. Providers implement [`FormatProvider`] and can be
//! stacked: a decorator recognises its own letters and hands everything
//! else to the provider it wraps, which may itself be a decorator.

mod culture;
mod customer;
mod short_name;

use std::{any::Any, collections::HashSet, fmt};

use derive_more::{Display, Error};

use crate::domain::ErrorKind;

pub use self::culture::*;
pub use self::customer::*;
pub use self::short_name::*;

/// Joins the rendered fields.
pub const SEPARATOR: &str = ", ";

/// Whole-string specifier for the general representation.
pub const GENERAL: char = 'G';

pub trait FormatProvider: Send + Sync {
    /// Renders `value` according to `format`.
    ///
    /// An absent or empty `format` means `"G"`. When `culture` is `None`
    /// the provider picks its own default.
    fn format(
        &self,
        format: Option<&str>,
        value: &dyn Any,
        culture: Option<&Culture>,
    ) -> Result<String, FormatError>;

    /// Renders the single field selected by `specifier`.
    ///
    /// Returns `Ok(None)` when neither this provider nor anything it wraps
    /// knows the letter. Decorators use this to rearrange fields without
    /// re-parsing joined output.
    fn resolve(
        &self,
        specifier: char,
        value: &dyn Any,
        culture: Option<&Culture>,
    ) -> Result<Option<String>, FormatError>;
}

impl<P: FormatProvider + ?Sized> FormatProvider for std::sync::Arc<P> {
    fn format(
        &self,
        format: Option<&str>,
        value: &dyn Any,
        culture: Option<&Culture>,
    ) -> Result<String, FormatError> {
        (**self).format(format, value, culture)
    }

    fn resolve(
        &self,
        specifier: char,
        value: &dyn Any,
        culture: Option<&Culture>,
    ) -> Result<Option<String>, FormatError> {
        (**self).resolve(specifier, value, culture)
    }
}

pub trait FormatProviderExt: FormatProvider {
    /// Wraps `value` so it can be interpolated with `format!` or `write!`.
    ///
    /// The adapter reports `fmt::Error` when formatting fails, which makes
    /// `format!` panic; validate unknown format strings with
    /// [`FormatProvider::format`] first.
    fn display<'a>(&'a self, format: &'a str, value: &'a dyn Any) -> Formatted<'a, Self> {
        Formatted {
            provider: self,
            format,
            value,
            culture: None,
        }
    }
}

impl<P: FormatProvider + ?Sized> FormatProviderExt for P {}

pub struct Formatted<'a, P: ?Sized> {
    provider: &'a P,
    format: &'a str,
    value: &'a dyn Any,
    culture: Option<&'a Culture>,
}

impl<'a, P: ?Sized> Formatted<'a, P> {
    pub fn with_culture(mut self, culture: &'a Culture) -> Self {
        self.culture = Some(culture);
        self
    }
}

impl<P: FormatProvider + ?Sized> fmt::Display for Formatted<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .provider
            .format(Some(self.format), self.value, self.culture)
            .map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[display(
        fmt = "The \"{}\" format string is not supported: unknown specifier '{}'",
        format,
        specifier
    )]
    UnsupportedSpecifier { format: String, specifier: char },
    #[display(
        fmt = "The \"{}\" format string repeats the '{}' specifier",
        format,
        specifier
    )]
    DuplicateSpecifier { format: String, specifier: char },
    #[display(
        fmt = "The \"{}\" format string combines 'G' with other specifiers",
        format
    )]
    GeneralIsCombined { format: String },
    #[display(
        fmt = "The \"{}\" format string cannot contain '{}' and '{}' at the same time",
        format,
        first,
        second
    )]
    ConflictingSpecifiers {
        format: String,
        first: char,
        second: char,
    },
    #[display(fmt = "Value must have type {}", expected)]
    UnsupportedValue { expected: &'static str },
}

impl FormatError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::FormatInvalid
    }
}

/// Applies the `"G"` default and case-folds the specifier letters.
pub fn normalize(format: Option<&str>) -> String {
    match format {
        None | Some("") => GENERAL.to_string(),
        Some(format) => format.to_ascii_uppercase(),
    }
}

/// Splits a normalized format string into its specifiers.
///
/// Rejects repeated letters and a `G` that is not the whole string. Whether
/// each letter is actually supported is left to the provider.
pub fn specifiers(format: &str) -> Result<Vec<char>, FormatError> {
    let mut seen = HashSet::new();
    let mut specifiers = Vec::with_capacity(format.len());
    for specifier in format.chars() {
        if specifier == GENERAL && format.len() > 1 {
            return Err(FormatError::GeneralIsCombined {
                format: format.to_owned(),
            });
        }
        if !seen.insert(specifier) {
            return Err(FormatError::DuplicateSpecifier {
                format: format.to_owned(),
                specifier,
            });
        }
        specifiers.push(specifier);
    }
    Ok(specifiers)
}

pub(crate) fn unsupported(format: &str, specifier: char) -> FormatError {
    FormatError::UnsupportedSpecifier {
        format: format.to_owned(),
        specifier,
    }
}
