use std::any::{type_name, Any};

use tracing::trace;

use super::{
    normalize, specifiers, unsupported, Culture, FormatError, FormatProvider, GENERAL, SEPARATOR,
};
use crate::domain::Customer;

/// Base formatter for [`Customer`].
///
/// Supported specifiers:
///
/// * `N` - name
/// * `P` - phone
/// * `R` - revenue, rendered with the culture's decimal separator
/// * `G` - general, same as `NPR`; cannot be combined with anything
///
/// `N`, `P` and `R` may appear in any order, each at most once.
#[derive(Clone, Debug, Default)]
pub struct CustomerFormatter {
    culture: Option<Culture>,
}

impl CustomerFormatter {
    pub const NAME: char = 'N';
    pub const PHONE: char = 'P';
    pub const REVENUE: char = 'R';

    const GENERAL_EXPANSION: [char; 3] = [Self::NAME, Self::PHONE, Self::REVENUE];

    /// Formatter falling back to [`Culture::current`] when the caller
    /// passes no culture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Formatter falling back to `culture` when the caller passes none.
    pub fn with_culture(culture: Culture) -> Self {
        Self {
            culture: Some(culture),
        }
    }

    pub fn culture(&self) -> Option<&Culture> {
        self.culture.as_ref()
    }

    pub fn format_customer(
        &self,
        customer: &Customer,
        format: Option<&str>,
        culture: Option<&Culture>,
    ) -> Result<String, FormatError> {
        let format = normalize(format);
        let culture = self.effective_culture(culture);
        let letters = match specifiers(&format)?.as_slice() {
            [GENERAL] => Self::GENERAL_EXPANSION.to_vec(),
            other => other.to_vec(),
        };
        trace!(format = %format, culture = %culture, "formatting customer");
        let parts = letters
            .into_iter()
            .map(|specifier| {
                Self::field(customer, specifier, &culture)
                    .ok_or_else(|| unsupported(&format, specifier))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(SEPARATOR))
    }

    /// Renders one field, or `None` for a letter outside the table.
    pub fn field(customer: &Customer, specifier: char, culture: &Culture) -> Option<String> {
        match specifier {
            Self::NAME => Some(customer.name().to_owned()),
            Self::PHONE => Some(customer.phone().to_owned()),
            Self::REVENUE => Some(culture.format_decimal(&customer.revenue())),
            _ => None,
        }
    }

    fn effective_culture(&self, culture: Option<&Culture>) -> Culture {
        culture
            .or(self.culture.as_ref())
            .cloned()
            .unwrap_or_else(Culture::current)
    }
}

impl FormatProvider for CustomerFormatter {
    fn format(
        &self,
        format: Option<&str>,
        value: &dyn Any,
        culture: Option<&Culture>,
    ) -> Result<String, FormatError> {
        self.format_customer(downcast_customer(value)?, format, culture)
    }

    fn resolve(
        &self,
        specifier: char,
        value: &dyn Any,
        culture: Option<&Culture>,
    ) -> Result<Option<String>, FormatError> {
        let customer = downcast_customer(value)?;
        Ok(Self::field(
            customer,
            specifier.to_ascii_uppercase(),
            &self.effective_culture(culture),
        ))
    }
}

pub(crate) fn downcast_customer(value: &dyn Any) -> Result<&Customer, FormatError> {
    value
        .downcast_ref::<Customer>()
        .ok_or(FormatError::UnsupportedValue {
            expected: type_name::<Customer>(),
        })
}
