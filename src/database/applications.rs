use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::report::model::{ApplicationRecord, ApplicatorRef, CustomerRef, TreatedArea, WeatherSnapshot};
use crate::report::source::{ApplicationSource, ReportQuery};

const SELECT_APPLICATIONS: &str = r#"
    SELECT
        a.id, a.applied_at, a.chemical_name, a.epa_reg_number,
        a.quantity, a.unit, a.target_pest, a.method,
        a.area_treated, a.area_unit,
        a.temperature, a.humidity, a.wind_speed, a.wind_direction, a.weather_condition,
        a.reentry_interval, a.customer_consent,
        c.id AS customer_id, c.name AS customer_name, c.address AS customer_address,
        c.city AS customer_city, c.state AS customer_state, c.zip AS customer_zip,
        u.id AS applicator_id, u.first_name, u.last_name, u.license_number, u.license_state
    FROM applications a
    JOIN customers c ON c.id = a.customer_id AND c.company_id = a.company_id
    JOIN users u ON u.id = a.applicator_id AND u.company_id = a.company_id
    WHERE a.company_id = $1
      AND a.status = $2
      AND a.applied_at >= $3
      AND ($4::timestamptz IS NULL OR a.applied_at < $4)
      AND ($5::uuid IS NULL OR a.customer_id = $5)
      AND ($6::uuid IS NULL OR a.applicator_id = $6)
    ORDER BY a.applied_at DESC
"#;

/// Postgres-backed [`ApplicationSource`]. Every query filters on `company_id`.
#[derive(Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<ApplicationRecord, sqlx::Error> {
        let area = match (
            row.try_get::<Option<f64>, _>("area_treated")?,
            row.try_get::<Option<String>, _>("area_unit")?,
        ) {
            (Some(value), unit) => Some(TreatedArea {
                value,
                unit: unit.unwrap_or_default(),
            }),
            (None, _) => None,
        };

        let weather = WeatherSnapshot {
            temperature: row.try_get("temperature")?,
            humidity: row.try_get("humidity")?,
            wind_speed: row.try_get("wind_speed")?,
            wind_direction: row.try_get("wind_direction")?,
            condition: row.try_get("weather_condition")?,
        };
        let weather = (weather != WeatherSnapshot::default()).then_some(weather);

        Ok(ApplicationRecord {
            id: row.try_get("id")?,
            applied_at: row.try_get("applied_at")?,
            chemical_name: row.try_get("chemical_name")?,
            epa_reg_number: row.try_get("epa_reg_number")?,
            quantity: row.try_get("quantity")?,
            unit: row.try_get("unit")?,
            target_pest: row.try_get("target_pest")?,
            method: row.try_get("method")?,
            area,
            weather,
            reentry_interval: row.try_get("reentry_interval")?,
            customer_consent: row.try_get::<Option<bool>, _>("customer_consent")?.unwrap_or(false),
            customer: CustomerRef {
                id: row.try_get("customer_id")?,
                name: row.try_get("customer_name")?,
                address: row.try_get("customer_address")?,
                city: row.try_get("customer_city")?,
                state: row.try_get("customer_state")?,
                zip: row.try_get("customer_zip")?,
            },
            applicator: ApplicatorRef {
                id: row.try_get("applicator_id")?,
                first_name: row.try_get("first_name")?,
                last_name: row.try_get("last_name")?,
                license_number: row.try_get("license_number")?,
                license_state: row.try_get("license_state")?,
            },
        })
    }

    async fn exists(&self, sql: &str, tenant_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let row = sqlx::query(sql)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl ApplicationSource for PgApplicationStore {
    async fn fetch_applications(&self, query: &ReportQuery) -> Result<Vec<ApplicationRecord>, DatabaseError> {
        let (start, end) = query.window();

        let records = sqlx::query(SELECT_APPLICATIONS)
            .bind(query.tenant_id)
            .bind(query.status.as_str())
            .bind(start)
            .bind(end)
            .bind(query.customer_id)
            .bind(query.applicator_id)
            .fetch(&self.pool)
            .map_err(DatabaseError::from)
            .and_then(|row| async move { Self::map_row(&row).map_err(DatabaseError::from) })
            .try_collect::<Vec<_>>()
            .await?;

        tracing::debug!(
            "Loaded {} {} applications for tenant {}",
            records.len(),
            query.status.as_str(),
            query.tenant_id
        );
        Ok(records)
    }

    async fn customer_exists(&self, tenant_id: Uuid, customer_id: Uuid) -> Result<bool, DatabaseError> {
        self.exists(
            "SELECT 1 FROM customers WHERE id = $1 AND company_id = $2",
            tenant_id,
            customer_id,
        )
        .await
    }

    async fn applicator_exists(&self, tenant_id: Uuid, applicator_id: Uuid) -> Result<bool, DatabaseError> {
        self.exists(
            "SELECT 1 FROM users WHERE id = $1 AND company_id = $2",
            tenant_id,
            applicator_id,
        )
        .await
    }
}
