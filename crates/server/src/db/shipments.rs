//! Shipment repository backed by `PostgreSQL`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use lastmile_core::{
    CustomerName, OtpCode, Shipment, ShipmentId, ShipmentStatus, ShipmentStore, StoreError,
    UpdateOutcome,
};

use super::store_error;

const UPSERT_SHIPMENT: &str = r"
    INSERT INTO shipments (
        shipment_id, customer_name, otp_code, status, created_at, delivered_at, delivered_by
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    ON CONFLICT (shipment_id) DO UPDATE SET
        customer_name = EXCLUDED.customer_name,
        otp_code = EXCLUDED.otp_code,
        status = EXCLUDED.status,
        created_at = EXCLUDED.created_at,
        delivered_at = EXCLUDED.delivered_at,
        delivered_by = EXCLUDED.delivered_by,
        updated_at = NOW()
    RETURNING shipment_id, customer_name, otp_code, status,
              created_at, delivered_at, delivered_by
";

const SELECT_BY_SHIPMENT_ID: &str = r"
    SELECT shipment_id, customer_name, otp_code, status,
           created_at, delivered_at, delivered_by
    FROM shipments
    WHERE shipment_id = $1
";

const UPDATE_IF_STATUS: &str = r"
    UPDATE shipments
    SET status = $3, delivered_at = $4, delivered_by = $5, updated_at = NOW()
    WHERE shipment_id = $1 AND status = $2
    RETURNING shipment_id, customer_name, otp_code, status,
              created_at, delivered_at, delivered_by
";

/// Raw `shipments` row.
#[derive(Debug, sqlx::FromRow)]
struct ShipmentRow {
    shipment_id: ShipmentId,
    customer_name: String,
    otp_code: String,
    status: ShipmentStatus,
    created_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
    delivered_by: Option<String>,
}

impl TryFrom<ShipmentRow> for Shipment {
    type Error = StoreError;

    fn try_from(row: ShipmentRow) -> Result<Self, Self::Error> {
        let corrupt = |what: String| {
            StoreError::DataCorruption(format!("shipment {}: {what}", row.shipment_id))
        };

        let customer_name = CustomerName::parse(&row.customer_name)
            .map_err(|e| corrupt(format!("invalid customer name: {e}")))?;
        let otp_code =
            OtpCode::parse(&row.otp_code).map_err(|e| corrupt(format!("invalid otp: {e}")))?;

        Self::restore(
            row.shipment_id.clone(),
            customer_name,
            otp_code,
            row.status,
            row.created_at,
            row.delivered_at,
            row.delivered_by.clone(),
        )
        .map_err(|e| corrupt(e.to_string()))
    }
}

/// Shipment store over a `PostgreSQL` pool.
///
/// The conditional update is a single `UPDATE ... WHERE status = $2`, so the
/// database row lock serializes racing transitions.
#[derive(Debug, Clone)]
pub struct PgShipmentStore {
    pool: PgPool,
}

impl PgShipmentStore {
    /// Create a new shipment store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl ShipmentStore for PgShipmentStore {
    async fn put(&self, shipment: &Shipment) -> Result<Shipment, StoreError> {
        let row = sqlx::query_as::<_, ShipmentRow>(UPSERT_SHIPMENT)
            .bind(shipment.shipment_id())
            .bind(shipment.customer_name().as_str())
            .bind(shipment.otp_code().as_str())
            .bind(shipment.status())
            .bind(shipment.created_at())
            .bind(shipment.delivered_at())
            .bind(shipment.delivered_by())
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;

        row.try_into()
    }

    async fn get_by_shipment_id(
        &self,
        shipment_id: &ShipmentId,
    ) -> Result<Option<Shipment>, StoreError> {
        let row = sqlx::query_as::<_, ShipmentRow>(SELECT_BY_SHIPMENT_ID)
            .bind(shipment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.map(Shipment::try_from).transpose()
    }

    async fn compare_and_update(
        &self,
        expected: ShipmentStatus,
        next: &Shipment,
    ) -> Result<UpdateOutcome, StoreError> {
        let row = sqlx::query_as::<_, ShipmentRow>(UPDATE_IF_STATUS)
            .bind(next.shipment_id())
            .bind(expected)
            .bind(next.status())
            .bind(next.delivered_at())
            .bind(next.delivered_by())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        match row {
            Some(row) => Ok(UpdateOutcome::Applied(row.try_into()?)),
            None => Ok(UpdateOutcome::Conflict),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(store_error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(status: ShipmentStatus, delivered_at: Option<DateTime<Utc>>) -> ShipmentRow {
        ShipmentRow {
            shipment_id: ShipmentId::new("SHIP-row"),
            customer_name: "Alice".to_owned(),
            otp_code: "004521".to_owned(),
            status,
            created_at: Utc::now(),
            delivered_at,
            delivered_by: None,
        }
    }

    #[test]
    fn test_row_converts_to_shipment() {
        let shipment = Shipment::try_from(row(ShipmentStatus::Pending, None)).unwrap();
        assert_eq!(shipment.shipment_id().as_str(), "SHIP-row");
        assert_eq!(shipment.otp_code().as_str(), "004521");
        assert_eq!(shipment.status(), ShipmentStatus::Pending);
    }

    #[test]
    fn test_row_with_bad_otp_is_corruption() {
        let mut bad = row(ShipmentStatus::Pending, None);
        bad.otp_code = "4521".to_owned();
        let err = Shipment::try_from(bad).unwrap_err();
        assert!(matches!(err, StoreError::DataCorruption(ref msg) if msg.contains("SHIP-row")));
    }

    #[test]
    fn test_row_with_blank_name_is_corruption() {
        let mut bad = row(ShipmentStatus::Pending, None);
        bad.customer_name = String::new();
        assert!(matches!(
            Shipment::try_from(bad),
            Err(StoreError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_row_breaking_delivery_invariant_is_corruption() {
        assert!(matches!(
            Shipment::try_from(row(ShipmentStatus::Delivered, None)),
            Err(StoreError::DataCorruption(_))
        ));
        assert!(matches!(
            Shipment::try_from(row(ShipmentStatus::InTransit, Some(Utc::now()))),
            Err(StoreError::DataCorruption(_))
        ));
    }
}
