use std::{any::Any, fmt, sync::Arc};

use tracing::trace;

use super::customer::downcast_customer;
use super::{
    normalize, specifiers, unsupported, Culture, CustomerFormatter, FormatError, FormatProvider,
    SEPARATOR,
};

/// Adds the `S` (short name) specifier on top of another provider.
///
/// `S` renders every word of the name but the last as its initial followed
/// by a period: `John Clark Robin Doe` becomes `J. C. R. Doe`. It cannot be
/// combined with `N`. Every other letter is resolved by the wrapped
/// provider, and format strings without `S` are handed to it untouched.
#[derive(Clone)]
pub struct ShortNameFormatProvider {
    inner: Arc<dyn FormatProvider>,
}

impl ShortNameFormatProvider {
    pub const SHORT_NAME: char = 'S';

    /// Wraps a [`CustomerFormatter`] pinned to the invariant culture.
    pub fn new() -> Self {
        Self::wrap(CustomerFormatter::with_culture(Culture::invariant()))
    }

    pub fn wrap<P: FormatProvider + 'static>(inner: P) -> Self {
        Self::from_shared(Arc::new(inner))
    }

    pub fn from_shared(inner: Arc<dyn FormatProvider>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Arc<dyn FormatProvider> {
        &self.inner
    }

    pub fn short_name(name: &str) -> String {
        let words: Vec<&str> = name.split_whitespace().collect();
        let Some((last, initials)) = words.split_last() else {
            return String::new();
        };
        initials
            .iter()
            .filter_map(|word| word.chars().next())
            .map(|initial| format!("{}.", initial))
            .chain(std::iter::once(last.to_string()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn check_combination(format: &str) -> Result<(), FormatError> {
        if format.contains(CustomerFormatter::NAME) {
            return Err(FormatError::ConflictingSpecifiers {
                format: format.to_owned(),
                first: CustomerFormatter::NAME,
                second: Self::SHORT_NAME,
            });
        }
        if format.matches(Self::SHORT_NAME).count() > 1 {
            return Err(FormatError::DuplicateSpecifier {
                format: format.to_owned(),
                specifier: Self::SHORT_NAME,
            });
        }
        Ok(())
    }
}

impl Default for ShortNameFormatProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ShortNameFormatProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortNameFormatProvider").finish_non_exhaustive()
    }
}

impl FormatProvider for ShortNameFormatProvider {
    fn format(
        &self,
        format: Option<&str>,
        value: &dyn Any,
        culture: Option<&Culture>,
    ) -> Result<String, FormatError> {
        let normalized = normalize(format);
        if !normalized.contains(Self::SHORT_NAME) {
            trace!(format = %normalized, "delegating to wrapped provider");
            return self.inner.format(format, value, culture);
        }

        let customer = downcast_customer(value)?;
        Self::check_combination(&normalized)?;

        let parts = specifiers(&normalized)?
            .into_iter()
            .map(|specifier| match specifier {
                Self::SHORT_NAME => Ok(Self::short_name(customer.name())),
                other => self
                    .inner
                    .resolve(other, value, culture)?
                    .ok_or_else(|| unsupported(&normalized, other)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(SEPARATOR))
    }

    fn resolve(
        &self,
        specifier: char,
        value: &dyn Any,
        culture: Option<&Culture>,
    ) -> Result<Option<String>, FormatError> {
        match specifier.to_ascii_uppercase() {
            Self::SHORT_NAME => {
                let customer = downcast_customer(value)?;
                Ok(Some(Self::short_name(customer.name())))
            }
            _ => self.inner.resolve(specifier, value, culture),
        }
    }
}

#[cfg(test)]
mod tests {
    use num_format::{CustomFormat, Grouping, ToFormattedString};
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::{Customer, ErrorKind};
    use crate::format::FormatProviderExt;

    fn customer(name: &str) -> Customer {
        Customer::new(Some(name), Some("+1 (425) 555-0100"), dec!(1000.52)).unwrap()
    }

    fn short(name: &str, format: &str) -> Result<String, FormatError> {
        ShortNameFormatProvider::new().format(Some(format), &customer(name), None)
    }

    #[test]
    fn test_short_name_formats() {
        assert_eq!(
            short("John Doe", "SP").unwrap(),
            "J. Doe, +1 (425) 555-0100"
        );
        assert_eq!(
            short("John Doe", "sPR").unwrap(),
            "J. Doe, +1 (425) 555-0100, 1000.52"
        );
        assert_eq!(short("John Doe", "rs").unwrap(), "1000.52, J. Doe");
        assert_eq!(
            short("John Doe", "PSR").unwrap(),
            "+1 (425) 555-0100, J. Doe, 1000.52"
        );
        assert_eq!(short("John Clark Robin Doe", "S").unwrap(), "J. C. R. Doe");
        assert_eq!(
            short("Кирилл Александрович Севкович", "S").unwrap(),
            "К. А. Севкович"
        );
    }

    #[test]
    fn test_invalid_combinations() {
        for format in ["SS", "NS", "NSR", "SN", "SG", "SPP", "SX"] {
            let error = short("John Doe", format).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::FormatInvalid, "{}", format);
        }
        assert_eq!(
            short("John Doe", "NS"),
            Err(FormatError::ConflictingSpecifiers {
                format: "NS".to_owned(),
                first: 'N',
                second: 'S'
            })
        );
        assert_eq!(
            short("John Doe", "ss"),
            Err(FormatError::DuplicateSpecifier {
                format: "SS".to_owned(),
                specifier: 'S'
            })
        );
    }

    #[test]
    fn test_without_short_name_delegates() {
        let provider = ShortNameFormatProvider::new();
        let customer = customer("John Doe");
        assert_eq!(
            provider.format(Some("G"), &customer, None).unwrap(),
            "John Doe, +1 (425) 555-0100, 1000.52"
        );
        assert_eq!(
            provider.format(None, &customer, None).unwrap(),
            "John Doe, +1 (425) 555-0100, 1000.52"
        );
        assert_eq!(
            provider.format(Some("rn"), &customer, None).unwrap(),
            "1000.52, John Doe"
        );
    }

    #[test]
    fn test_value_type() {
        let provider = ShortNameFormatProvider::new();
        let error = provider.format(Some("S"), &"John Doe", None).unwrap_err();
        assert!(matches!(error, FormatError::UnsupportedValue { .. }));
        // without S the wrapped formatter decides
        let error = provider.format(Some("P"), &17_i64, None).unwrap_err();
        assert!(matches!(error, FormatError::UnsupportedValue { .. }));
    }

    #[test]
    fn test_wrapped_culture() {
        let provider = ShortNameFormatProvider::wrap(CustomerFormatter::with_culture(
            Culture::new("ru-RU").unwrap(),
        ));
        assert_eq!(
            provider
                .format(Some("SR"), &customer("John Doe"), None)
                .unwrap(),
            "J. Doe, 1000,52"
        );
        assert_eq!(
            provider
                .format(Some("SR"), &customer("John Doe"), Some(&Culture::invariant()))
                .unwrap(),
            "J. Doe, 1000.52"
        );
    }

    #[test]
    fn test_display_adapter() {
        let provider = ShortNameFormatProvider::new();
        let customer = customer("John Alex Doe");
        assert_eq!(
            format!("Customer: {}", provider.display("SP", &customer)),
            "Customer: J. A. Doe, +1 (425) 555-0100"
        );
        let russian = Culture::new("ru").unwrap();
        assert_eq!(
            provider.display("RS", &customer).with_culture(&russian).to_string(),
            "1000,52, J. A. Doe"
        );
    }

    #[test]
    fn test_display_adapter_checked_path() {
        let provider = ShortNameFormatProvider::new();
        let customer = customer("John Doe");
        assert!(provider.format(Some("NS"), &customer, None).is_err());
    }

    #[test]
    #[should_panic]
    fn test_display_adapter_panics_on_invalid_format() {
        let provider = ShortNameFormatProvider::new();
        let customer = customer("John Doe");
        let _ = format!("{}", provider.display("NS", &customer));
    }

    /// Groups revenue thousands with ", " so that the rendered field itself
    /// contains the separator used to join fields.
    struct GroupedRevenue(CustomerFormatter);

    impl FormatProvider for GroupedRevenue {
        fn format(
            &self,
            format: Option<&str>,
            value: &dyn Any,
            culture: Option<&Culture>,
        ) -> Result<String, FormatError> {
            self.0.format(format, value, culture)
        }

        fn resolve(
            &self,
            specifier: char,
            value: &dyn Any,
            culture: Option<&Culture>,
        ) -> Result<Option<String>, FormatError> {
            if specifier != CustomerFormatter::REVENUE {
                return self.0.resolve(specifier, value, culture);
            }
            let grouping = CustomFormat::builder()
                .grouping(Grouping::Standard)
                .separator(", ")
                .build()
                .unwrap();
            let revenue = downcast_customer(value)?.revenue();
            let whole = revenue.trunc().to_u64().unwrap();
            Ok(Some(whole.to_formatted_string(&grouping)))
        }
    }

    #[test]
    fn test_field_containing_separator() {
        let provider = ShortNameFormatProvider::wrap(GroupedRevenue(CustomerFormatter::new()));
        let customer = Customer::new(
            Some("John Doe"),
            Some("+1 (425) 555-0100"),
            dec!(1234567.89),
        )
        .unwrap();
        assert_eq!(
            provider.format(Some("RSP"), &customer, None).unwrap(),
            "1, 234, 567, J. Doe, +1 (425) 555-0100"
        );
    }

    #[test]
    fn test_stacked_providers() {
        let inner = ShortNameFormatProvider::new();
        let outer = ShortNameFormatProvider::from_shared(Arc::new(inner.clone()));
        let customer = customer("John Clark Doe");
        assert_eq!(
            outer
                .inner()
                .resolve('S', &customer, None)
                .unwrap()
                .as_deref(),
            Some("J. C. Doe")
        );
        assert_eq!(
            outer.format(Some("PS"), &customer, None).unwrap(),
            "+1 (425) 555-0100, J. C. Doe"
        );
        assert_eq!(
            outer.resolve('s', &customer, None).unwrap().as_deref(),
            Some("J. C. Doe")
        );
        assert_eq!(
            outer.format(Some("G"), &customer, None),
            inner.format(Some("G"), &customer, None)
        );
    }

    #[test]
    fn test_short_name() {
        assert_eq!(ShortNameFormatProvider::short_name("John Doe"), "J. Doe");
        assert_eq!(ShortNameFormatProvider::short_name("Doe"), "Doe");
        assert_eq!(ShortNameFormatProvider::short_name(""), "");
    }
}
