use crate::database::ObservationStore;
use crate::error::Result;
use crate::types::{NewObservation, Parcel};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

/// Postgres-backed observation store.
///
/// The `"Farm"` and `"FarmData"` tables are owned and migrated externally;
/// this store only reads parcels and appends observation rows.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ObservationStore for PostgresStore {
    async fn list_monitored_parcels(&self) -> Result<Vec<Parcel>> {
        let parcels = sqlx::query_as::<_, Parcel>(
            r#"
            SELECT id, name, "polygonId"
            FROM "Farm"
            WHERE "polygonId" IS NOT NULL
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        Ok(parcels)
    }

    async fn append_observation(
        &self,
        parcel_id: &str,
        observation: NewObservation,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO "FarmData" (id, "farmId", ndvi, weather, "soilMoisture", "droughtRisk", "createdAt")
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, NOW())
            "#,
        )
        .bind(parcel_id)
        .bind(observation.ndvi)
        .bind(observation.weather)
        .bind(observation.soil_moisture)
        .bind(observation.drought_risk)
        .execute(self.pool())
        .await?;

        debug!(parcel_id, "stored observation");
        Ok(())
    }
}
