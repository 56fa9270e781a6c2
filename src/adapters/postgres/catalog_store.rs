//! PostgreSQL implementation of the catalog store.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::domain::catalog::Plan;
use crate::domain::foundation::{ClientId, PlanId, ProviderId, StoreError};
use crate::ports::CatalogStore;

/// Plan documents in a JSONB column, keyed by plan id.
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinguishes "plan missing" from "guard not satisfied" after a
    /// guarded UPDATE touched zero rows.
    async fn require_plan_exists(&self, id: &PlanId) -> Result<(), StoreError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM plans WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        if !exists {
            return Err(StoreError::not_found("plan", id.to_string()));
        }
        Ok(())
    }
}

fn db_error(err: sqlx::Error) -> StoreError {
    StoreError::backend(err.to_string())
}

fn decode_plan(id: &PlanId, doc: serde_json::Value) -> Result<Plan, StoreError> {
    serde_json::from_value(doc)
        .map_err(|e| StoreError::invalid_document("plan", id.to_string(), e.to_string()))
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn get_plan(&self, id: &PlanId) -> Result<Option<Plan>, StoreError> {
        let doc = sqlx::query_scalar::<_, Json<serde_json::Value>>(
            "SELECT doc FROM plans WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        doc.map(|Json(doc)| decode_plan(id, doc)).transpose()
    }

    async fn list_plans_by_provider(
        &self,
        provider_id: &ProviderId,
    ) -> Result<Vec<Plan>, StoreError> {
        let rows = sqlx::query_as::<_, (uuid::Uuid, Json<serde_json::Value>)>(
            "SELECT id, doc FROM plans WHERE provider_id = $1 ORDER BY doc->>'created_at'",
        )
        .bind(provider_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter()
            .map(|(id, Json(doc))| decode_plan(&PlanId::from_uuid(id), doc))
            .collect()
    }

    async fn create_plan(&self, plan: &Plan) -> Result<(), StoreError> {
        let doc = serde_json::to_value(plan)
            .map_err(|e| StoreError::invalid_document("plan", plan.id.to_string(), e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO plans (id, provider_id, doc) VALUES ($1, $2, $3)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(plan.id.as_uuid())
        .bind(plan.provider_id.as_str())
        .bind(Json(doc))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::already_exists("plan", plan.id.to_string()));
        }
        Ok(())
    }

    async fn update_plan(&self, plan: &Plan) -> Result<(), StoreError> {
        let editable = serde_json::json!({
            "title": plan.title,
            "description": plan.description,
            "grace_period_days": plan.grace_period_days,
        });
        let priceable = serde_json::json!({
            "price": plan.price,
            "billing_cycle": plan.billing_cycle,
        });

        // Merges profile fields only. The subscriber set and gateway price id
        // belong to their dedicated primitives; a stale read must never
        // clobber them. Price and cycle merge only while the plan is
        // unpriced, so a concurrent first subscribe keeps its price.
        let result = sqlx::query(
            "UPDATE plans
             SET doc = doc || $2 ||
                 CASE WHEN doc->>'gateway_price_id' IS NULL THEN $3 ELSE '{}'::jsonb END
             WHERE id = $1",
        )
        .bind(plan.id.as_uuid())
        .bind(Json(editable))
        .bind(Json(priceable))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("plan", plan.id.to_string()));
        }
        Ok(())
    }

    async fn set_gateway_price(&self, id: &PlanId, price_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE plans
             SET doc = jsonb_set(doc, '{gateway_price_id}', to_jsonb($2::text))
             WHERE id = $1 AND doc->>'gateway_price_id' IS NULL",
        )
        .bind(id.as_uuid())
        .bind(price_id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            self.require_plan_exists(id).await?;
            return Ok(false);
        }
        Ok(true)
    }

    async fn add_subscriber(
        &self,
        id: &PlanId,
        client_id: &ClientId,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE plans
             SET doc = jsonb_set(doc, '{subscribers}', (doc->'subscribers') || to_jsonb($2::text))
             WHERE id = $1 AND NOT doc->'subscribers' ? $2",
        )
        .bind(id.as_uuid())
        .bind(client_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            self.require_plan_exists(id).await?;
            return Ok(false);
        }
        Ok(true)
    }

    async fn remove_subscriber(
        &self,
        id: &PlanId,
        client_id: &ClientId,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE plans
             SET doc = jsonb_set(doc, '{subscribers}', (doc->'subscribers') - $2::text)
             WHERE id = $1 AND doc->'subscribers' ? $2",
        )
        .bind(id.as_uuid())
        .bind(client_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            self.require_plan_exists(id).await?;
            return Ok(false);
        }
        Ok(true)
    }

    async fn delete_plan(&self, id: &PlanId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM plans WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
