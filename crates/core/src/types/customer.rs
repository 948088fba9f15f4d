//! Customer name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CustomerName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CustomerNameError {
    /// The input is empty or only whitespace.
    #[error("customer name cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("customer name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// The name of the customer a shipment is addressed to.
///
/// ## Constraints
///
/// - Must contain at least one non-whitespace character
/// - At most 200 characters
///
/// The value is stored exactly as supplied; surrounding whitespace is not
/// stripped.
///
/// ```
/// use lastmile_core::CustomerName;
///
/// assert!(CustomerName::parse("Alice").is_ok());
/// assert!(CustomerName::parse("").is_err());
/// assert!(CustomerName::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CustomerName(String);

impl CustomerName {
    /// Maximum length of a customer name, in characters.
    pub const MAX_LENGTH: usize = 200;

    /// Parse a `CustomerName` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is blank or longer than 200 characters.
    pub fn parse(s: &str) -> Result<Self, CustomerNameError> {
        if s.trim().is_empty() {
            return Err(CustomerNameError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(CustomerNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `CustomerName` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CustomerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CustomerName {
    type Err = CustomerNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for CustomerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
