pub mod customer;

use derive_more::Display;

pub use self::customer::*;

/// Coarse classification shared by every error the crate returns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum ErrorKind {
    /// A required argument was not supplied at all.
    #[display(fmt = "null argument")]
    NullArgument,
    /// A supplied argument breaks a field invariant.
    #[display(fmt = "invalid argument")]
    InvalidArgument,
    /// A format string is malformed or conflicts with the value being formatted.
    #[display(fmt = "invalid format")]
    FormatInvalid,
}
