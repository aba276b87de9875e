use std::fmt;

use derive_more::{Display, Error};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ErrorKind;
use crate::format::{Culture, CustomerFormatter, FormatError};

static LATIN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][a-z]* )+[A-Z][a-z]*$").expect("latin name pattern"));

static CYRILLIC_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([А-ЯЁ][а-яё]* )+[А-ЯЁ][а-яё]*$").expect("cyrillic name pattern"));

static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+\d \(\d{3}\) \d{3}-\d{4}$").expect("phone pattern"));

/// A customer described by name, contact phone and revenue.
///
/// Every field is validated on construction and on each change; a rejected
/// change leaves the customer as it was. Mutation goes through `&mut self`,
/// so sharing one customer between threads needs a lock held by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CustomerRecord")]
pub struct Customer {
    name: String,
    phone: String,
    revenue: Decimal,
}

#[derive(Deserialize)]
struct CustomerRecord {
    name: Option<String>,
    phone: Option<String>,
    revenue: Decimal,
}

impl TryFrom<CustomerRecord> for Customer {
    type Error = CustomerError;

    fn try_from(value: CustomerRecord) -> Result<Self, Self::Error> {
        Self::new(value.name.as_deref(), value.phone.as_deref(), value.revenue)
    }
}

impl Customer {
    /// Validates name, phone and revenue, in that order, and stops at the
    /// first failure.
    pub fn new(
        name: Option<&str>,
        phone: Option<&str>,
        revenue: Decimal,
    ) -> Result<Self, CustomerError> {
        let name = Self::validate_name(name)?;
        let phone = Self::validate_phone(phone)?;
        Self::validate_revenue(&revenue)?;
        Ok(Self {
            name: name.to_owned(),
            phone: phone.to_owned(),
            revenue,
        })
    }

    pub fn change_name(&mut self, name: Option<&str>) -> Result<(), CustomerError> {
        self.name = Self::validate_name(name)?.to_owned();
        Ok(())
    }

    pub fn change_phone(&mut self, phone: Option<&str>) -> Result<(), CustomerError> {
        self.phone = Self::validate_phone(phone)?.to_owned();
        Ok(())
    }

    pub fn change_revenue(&mut self, revenue: Decimal) -> Result<(), CustomerError> {
        Self::validate_revenue(&revenue)?;
        self.revenue = revenue;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn revenue(&self) -> Decimal {
        self.revenue
    }

    /// Renders the customer through [`CustomerFormatter`].
    ///
    /// `None` or an empty format means `"G"`; `None` culture means
    /// [`Culture::current`].
    pub fn to_formatted_string(
        &self,
        format: Option<&str>,
        culture: Option<&Culture>,
    ) -> Result<String, FormatError> {
        CustomerFormatter::new().format_customer(self, format, culture)
    }

    fn validate_name(name: Option<&str>) -> Result<&str, CustomerError> {
        let name = name.ok_or(CustomerError::NameIsMissing)?;
        match LATIN_NAME.is_match(name) || CYRILLIC_NAME.is_match(name) {
            true => Ok(name),
            false => {
                debug!(name, "rejected customer name");
                Err(CustomerError::NameIsMalformed)
            }
        }
    }

    fn validate_phone(phone: Option<&str>) -> Result<&str, CustomerError> {
        let phone = phone.ok_or(CustomerError::PhoneIsMissing)?;
        match PHONE.is_match(phone) {
            true => Ok(phone),
            false => {
                debug!(phone, "rejected customer phone");
                Err(CustomerError::PhoneIsMalformed)
            }
        }
    }

    fn validate_revenue(revenue: &Decimal) -> Result<(), CustomerError> {
        if revenue.is_sign_negative() && !revenue.is_zero() {
            debug!(%revenue, "rejected negative revenue");
            return Err(CustomerError::RevenueIsNegative);
        }
        let whole_cents = match revenue.checked_mul(Decimal::ONE_HUNDRED) {
            Some(cents) => cents.fract().is_zero(),
            None => revenue.normalize().scale() <= 2,
        };
        match whole_cents {
            true => Ok(()),
            false => {
                debug!(%revenue, "rejected revenue with more than two decimal places");
                Err(CustomerError::RevenueIsTooPrecise)
            }
        }
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .to_formatted_string(None, None)
            .map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

#[derive(Error, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerError {
    #[display(fmt = "Name cannot be missing")]
    NameIsMissing,
    #[display(fmt = "Phone cannot be missing")]
    PhoneIsMissing,
    #[display(
        fmt = "Name must be in English or in Russian, contain at least two words separated by a single space and only the first letter of each word must be uppercase"
    )]
    NameIsMalformed,
    #[display(fmt = "Phone must be in form \"+X (XXX) XXX-XXXX\"")]
    PhoneIsMalformed,
    #[display(fmt = "Revenue cannot be negative")]
    RevenueIsNegative,
    #[display(fmt = "Revenue cannot have more than two decimal places")]
    RevenueIsTooPrecise,
}

impl CustomerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NameIsMissing | Self::PhoneIsMissing => ErrorKind::NullArgument,
            Self::NameIsMalformed
            | Self::PhoneIsMalformed
            | Self::RevenueIsNegative
            | Self::RevenueIsTooPrecise => ErrorKind::InvalidArgument,
        }
    }
}
