use std::{cell::RefCell, fmt, str::FromStr, sync::RwLock};

use derive_more::{Display, Error};
use num_format::Locale;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;

use crate::domain::ErrorKind;

static DEFAULT_CULTURE: Lazy<RwLock<Culture>> = Lazy::new(|| RwLock::new(Culture::invariant()));

thread_local! {
    static CURRENT_CULTURE: RefCell<Option<Culture>> = RefCell::new(None);
}

/// Number-formatting conventions of a language or region.
///
/// Backed by the CLDR tables of `num_format`. Only the parts needed to
/// render a revenue are exposed: the decimal separator and the minus sign.
#[derive(Clone, Debug)]
pub struct Culture {
    name: String,
    locale: Locale,
}

impl Culture {
    /// Culture-neutral conventions (`.` as decimal separator).
    pub fn invariant() -> Self {
        Self {
            name: String::new(),
            locale: Locale::en,
        }
    }

    /// Looks a culture up by name, e.g. `"ru-RU"` or `"de"`.
    ///
    /// Region tags unknown to the CLDR tables fall back to the language.
    pub fn new(name: &str) -> Result<Self, CultureError> {
        let name = name.trim();
        let locale = Locale::from_name(name)
            .ok()
            .or_else(|| {
                let language = name.split(['-', '_']).next()?.to_ascii_lowercase();
                Locale::from_name(language).ok()
            })
            .ok_or_else(|| CultureError::Unknown {
                name: name.to_owned(),
            })?;
        Ok(Self {
            name: name.to_owned(),
            locale,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_invariant(&self) -> bool {
        self.name.is_empty()
    }

    pub fn decimal_separator(&self) -> &'static str {
        self.locale.decimal()
    }

    /// Renders `value` in general form: every stored fractional digit is
    /// kept, no digit grouping, culture decimal separator and minus sign.
    pub fn format_decimal(&self, value: &Decimal) -> String {
        let raw = value.to_string();
        let (sign, digits) = match raw.strip_prefix('-') {
            Some(digits) => (self.locale.minus_sign(), digits),
            None => ("", raw.as_str()),
        };
        format!("{}{}", sign, digits.replacen('.', self.locale.decimal(), 1))
    }

    /// Culture of the calling thread, or the process default when the
    /// thread never set one.
    pub fn current() -> Culture {
        CURRENT_CULTURE
            .with(|current| current.borrow().clone())
            .unwrap_or_else(Self::process_default)
    }

    pub fn set_current(culture: Culture) {
        CURRENT_CULTURE.with(|current| *current.borrow_mut() = Some(culture));
    }

    pub fn reset_current() {
        CURRENT_CULTURE.with(|current| *current.borrow_mut() = None);
    }

    pub fn process_default() -> Culture {
        match DEFAULT_CULTURE.read() {
            Ok(culture) => culture.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_default(culture: Culture) {
        let mut guard = match DEFAULT_CULTURE.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = culture;
    }
}

impl Default for Culture {
    fn default() -> Self {
        Self::invariant()
    }
}

impl PartialEq for Culture {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.locale.name() == other.locale.name()
    }
}

impl Eq for Culture {}

impl FromStr for Culture {
    type Err = CultureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("invariant") {
            Ok(Self::invariant())
        } else {
            Self::new(s)
        }
    }
}

impl fmt::Display for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
pub enum CultureError {
    #[display(fmt = "Culture \"{}\" is not supported", name)]
    Unknown { name: String },
}

impl CultureError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

/// Held by tests that change or compare against the process default.
#[cfg(test)]
pub(crate) static DEFAULT_CULTURE_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
