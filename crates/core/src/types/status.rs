//! Shipment lifecycle status.

use serde::{Deserialize, Serialize};

/// Where a shipment is in its lifecycle.
///
/// Statuses are ordered: a shipment only ever moves to a later status, and
/// [`ShipmentStatus::Delivered`] is terminal. `Pending` may skip straight to
/// `Delivered`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shipment_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    /// Created, waiting for dispatch.
    #[default]
    Pending,
    /// Handed to a courier.
    InTransit,
    /// Confirmed delivered with the shipment's OTP.
    Delivered,
}

impl ShipmentStatus {
    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InTransit | Self::Delivered) | (Self::InTransit, Self::Delivered)
        )
    }

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InTransit => "IN_TRANSIT",
            Self::Delivered => "DELIVERED",
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "IN_TRANSIT" => Ok(Self::InTransit),
            "DELIVERED" => Ok(Self::Delivered),
            _ => Err(format!("invalid shipment status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ALL: [ShipmentStatus; 3] = [
        ShipmentStatus::Pending,
        ShipmentStatus::InTransit,
        ShipmentStatus::Delivered,
    ];

    #[test]
    fn test_allowed_transitions() {
        assert!(ShipmentStatus::Pending.can_transition_to(ShipmentStatus::InTransit));
        assert!(ShipmentStatus::Pending.can_transition_to(ShipmentStatus::Delivered));
        assert!(ShipmentStatus::InTransit.can_transition_to(ShipmentStatus::Delivered));
    }

    #[test]
    fn test_never_moves_backward_or_stays() {
        for from in ALL {
            for to in ALL {
                if to <= from {
                    assert!(!from.can_transition_to(to), "{from} -> {to}");
                }
            }
        }
    }

    #[test]
    fn test_delivered_is_terminal() {
        assert!(ShipmentStatus::Delivered.is_terminal());
        assert!(!ShipmentStatus::Pending.is_terminal());
        assert!(!ShipmentStatus::InTransit.is_terminal());
        for to in ALL {
            assert!(!ShipmentStatus::Delivered.can_transition_to(to));
        }
    }

    #[test]
    fn test_serde_wire_names() {
        assert_eq!(
            serde_json::to_string(&ShipmentStatus::InTransit).unwrap(),
            "\"IN_TRANSIT\""
        );
        let parsed: ShipmentStatus = serde_json::from_str("\"DELIVERED\"").unwrap();
        assert_eq!(parsed, ShipmentStatus::Delivered);
    }

    #[test]
    fn test_from_str_matches_display() {
        for status in ALL {
            assert_eq!(status.to_string().parse::<ShipmentStatus>().unwrap(), status);
        }
        assert!("pending".parse::<ShipmentStatus>().is_err());
    }

    #[test]
    fn test_default_is_pending() {
        assert_eq!(ShipmentStatus::default(), ShipmentStatus::Pending);
    }
}
