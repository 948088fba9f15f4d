//! External shipment identifiers.
//!
//! A [`ShipmentId`] is the tracking handle shown to customers and couriers.
//! It is separate from any storage key the persistence layer keeps.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

/// A shipment tracking identifier, e.g. `SHIP-3f2a9c0d41b84e1e9a51c2d07f6b8e44`.
///
/// Generated identifiers are a random 128-bit token in UUIDv4 layout, so
/// concurrent creates never depend on clock resolution for uniqueness.
/// Identifiers received from callers are accepted verbatim; an unknown
/// identifier is a lookup miss, not a parse error.
///
/// ```
/// use lastmile_core::{SeededRandom, ShipmentId};
///
/// let rng = SeededRandom::new(7);
/// let id = ShipmentId::generate(&rng);
/// assert!(id.as_str().starts_with("SHIP-"));
/// assert_eq!(id.as_str().len(), ShipmentId::PREFIX.len() + 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipmentId(String);

impl ShipmentId {
    /// Prefix of every generated identifier.
    pub const PREFIX: &'static str = "SHIP-";

    /// Wrap an identifier supplied by a caller or read from storage.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier from the given random source.
    #[must_use]
    pub fn generate<R: RandomSource + ?Sized>(rng: &R) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        let token = uuid::Builder::from_random_bytes(bytes).into_uuid();
        Self(format!("{}{}", Self::PREFIX, token.simple()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ShipmentId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ShipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ShipmentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ShipmentId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for ShipmentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ShipmentId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ShipmentId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ShipmentId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::random::SeededRandom;

    #[test]
    fn test_generate_format() {
        let id = ShipmentId::generate(&SeededRandom::new(1));
        let token = id.as_str().strip_prefix(ShipmentId::PREFIX);
        assert!(token.is_some_and(|t| t.len() == 32
            && t.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())));
    }

    #[test]
    fn test_generate_is_deterministic_for_seed() {
        let a = ShipmentId::generate(&SeededRandom::new(42));
        let b = ShipmentId::generate(&SeededRandom::new(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_distinct_from_one_source() {
        let rng = SeededRandom::new(9);
        let ids: HashSet<_> = (0..500).map(|_| ShipmentId::generate(&rng)).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_caller_supplied_ids_are_verbatim() {
        let id = ShipmentId::from(" SHIP1700000000000 ");
        assert_eq!(id.as_str(), " SHIP1700000000000 ");
    }

    #[test]
    fn test_serde_transparent() {
        let id = ShipmentId::new("SHIP-ab12cd34");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"SHIP-ab12cd34\""));
    }
}
