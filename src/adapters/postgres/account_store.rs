//! PostgreSQL implementation of the account store.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::domain::account::{Client, Provider};
use crate::domain::foundation::{ClientId, PlanId, ProviderId, StoreError};
use crate::domain::subscription::SubscriptionEntry;
use crate::ports::AccountStore;

/// Client and provider documents in JSONB columns, keyed by account id.
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn require_client_exists(&self, id: &ClientId) -> Result<(), StoreError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                .bind(id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?;
        if !exists {
            return Err(StoreError::not_found("client", id.to_string()));
        }
        Ok(())
    }

    async fn require_provider_exists(&self, id: &ProviderId) -> Result<(), StoreError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM providers WHERE id = $1)")
                .bind(id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?;
        if !exists {
            return Err(StoreError::not_found("provider", id.to_string()));
        }
        Ok(())
    }
}

fn db_error(err: sqlx::Error) -> StoreError {
    StoreError::backend(err.to_string())
}

fn decode_client(id: &ClientId, doc: serde_json::Value) -> Result<Client, StoreError> {
    serde_json::from_value(doc)
        .map_err(|e| StoreError::invalid_document("client", id.to_string(), e.to_string()))
}

fn decode_provider(id: &ProviderId, doc: serde_json::Value) -> Result<Provider, StoreError> {
    serde_json::from_value(doc)
        .map_err(|e| StoreError::invalid_document("provider", id.to_string(), e.to_string()))
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn get_client(&self, id: &ClientId) -> Result<Option<Client>, StoreError> {
        let doc = sqlx::query_scalar::<_, Json<serde_json::Value>>(
            "SELECT doc FROM clients WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        doc.map(|Json(doc)| decode_client(id, doc)).transpose()
    }

    async fn create_client(&self, client: &Client) -> Result<(), StoreError> {
        let doc = serde_json::to_value(client).map_err(|e| {
            StoreError::invalid_document("client", client.id.to_string(), e.to_string())
        })?;

        let result = sqlx::query(
            "INSERT INTO clients (id, doc) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(client.id.as_str())
        .bind(Json(doc))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::already_exists("client", client.id.to_string()));
        }
        Ok(())
    }

    async fn update_client(&self, client: &Client) -> Result<(), StoreError> {
        // Profile fields only; subscriptions and the gateway customer id are
        // owned by their dedicated primitives, so a stale read here cannot
        // clobber them.
        let profile = serde_json::json!({
            "first_name": client.first_name,
            "last_name": client.last_name,
            "preferences": client.preferences,
        });

        let result = sqlx::query("UPDATE clients SET doc = doc || $2 WHERE id = $1")
            .bind(client.id.as_str())
            .bind(Json(profile))
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("client", client.id.to_string()));
        }
        Ok(())
    }

    async fn add_subscription(
        &self,
        id: &ClientId,
        entry: &SubscriptionEntry,
    ) -> Result<bool, StoreError> {
        let entry_doc = serde_json::to_value(entry)
            .map_err(|e| StoreError::invalid_document("client", id.to_string(), e.to_string()))?;

        // Guard on the plan id only; a retried add with a fresh joined_at
        // must still be a no-op.
        let result = sqlx::query(
            "UPDATE clients
             SET doc = jsonb_set(doc, '{subscriptions}', (doc->'subscriptions') || $3::jsonb)
             WHERE id = $1
               AND NOT doc->'subscriptions' @> jsonb_build_array(jsonb_build_object('plan_id', $2::text))",
        )
        .bind(id.as_str())
        .bind(entry.plan_id.to_string())
        .bind(Json(entry_doc))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            self.require_client_exists(id).await?;
            return Ok(false);
        }
        Ok(true)
    }

    async fn remove_subscription(
        &self,
        id: &ClientId,
        plan_id: &PlanId,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE clients
             SET doc = jsonb_set(doc, '{subscriptions}', COALESCE(
                 (SELECT jsonb_agg(e) FROM jsonb_array_elements(doc->'subscriptions') e
                  WHERE e->>'plan_id' <> $2),
                 '[]'::jsonb))
             WHERE id = $1
               AND doc->'subscriptions' @> jsonb_build_array(jsonb_build_object('plan_id', $2::text))",
        )
        .bind(id.as_str())
        .bind(plan_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            self.require_client_exists(id).await?;
            return Ok(false);
        }
        Ok(true)
    }

    async fn set_gateway_customer(
        &self,
        id: &ClientId,
        customer_id: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE clients
             SET doc = jsonb_set(doc, '{gateway_customer_id}', to_jsonb($2::text))
             WHERE id = $1 AND doc->>'gateway_customer_id' IS NULL",
        )
        .bind(id.as_str())
        .bind(customer_id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            self.require_client_exists(id).await?;
            return Ok(false);
        }
        Ok(true)
    }

    async fn list_clients_with_subscription(
        &self,
        plan_id: &PlanId,
    ) -> Result<Vec<Client>, StoreError> {
        let rows = sqlx::query_as::<_, (String, Json<serde_json::Value>)>(
            "SELECT id, doc FROM clients
             WHERE doc->'subscriptions' @> jsonb_build_array(jsonb_build_object('plan_id', $1::text))
             ORDER BY id",
        )
        .bind(plan_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter()
            .map(|(id, Json(doc))| {
                let id = ClientId::new(id)
                    .map_err(|e| StoreError::backend(format!("bad client id in store: {e}")))?;
                decode_client(&id, doc)
            })
            .collect()
    }

    async fn get_provider(&self, id: &ProviderId) -> Result<Option<Provider>, StoreError> {
        let doc = sqlx::query_scalar::<_, Json<serde_json::Value>>(
            "SELECT doc FROM providers WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        doc.map(|Json(doc)| decode_provider(id, doc)).transpose()
    }

    async fn create_provider(&self, provider: &Provider) -> Result<(), StoreError> {
        let doc = serde_json::to_value(provider).map_err(|e| {
            StoreError::invalid_document("provider", provider.id.to_string(), e.to_string())
        })?;

        let result = sqlx::query(
            "INSERT INTO providers (id, doc) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(provider.id.as_str())
        .bind(Json(doc))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::already_exists(
                "provider",
                provider.id.to_string(),
            ));
        }
        Ok(())
    }

    async fn update_provider(&self, provider: &Provider) -> Result<(), StoreError> {
        // Profile fields only; the plan set and merchant id are owned by
        // their dedicated primitives.
        let profile = serde_json::json!({
            "business_name": provider.business_name,
            "category": provider.category,
            "bio": provider.bio,
            "website": provider.website,
            "cover_image": provider.cover_image,
        });

        let result = sqlx::query("UPDATE providers SET doc = doc || $2 WHERE id = $1")
            .bind(provider.id.as_str())
            .bind(Json(profile))
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("provider", provider.id.to_string()));
        }
        Ok(())
    }

    async fn add_plan(&self, id: &ProviderId, plan_id: &PlanId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE providers
             SET doc = jsonb_set(doc, '{plans}', (doc->'plans') || to_jsonb($2::text))
             WHERE id = $1 AND NOT doc->'plans' ? $2",
        )
        .bind(id.as_str())
        .bind(plan_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            self.require_provider_exists(id).await?;
            return Ok(false);
        }
        Ok(true)
    }

    async fn remove_plan(&self, id: &ProviderId, plan_id: &PlanId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE providers
             SET doc = jsonb_set(doc, '{plans}', (doc->'plans') - $2::text)
             WHERE id = $1 AND doc->'plans' ? $2",
        )
        .bind(id.as_str())
        .bind(plan_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            self.require_provider_exists(id).await?;
            return Ok(false);
        }
        Ok(true)
    }

    async fn set_merchant_account(
        &self,
        id: &ProviderId,
        merchant_id: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE providers
             SET doc = jsonb_set(doc, '{gateway_merchant_id}', to_jsonb($2::text))
             WHERE id = $1 AND doc->>'gateway_merchant_id' IS NULL",
        )
        .bind(id.as_str())
        .bind(merchant_id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            self.require_provider_exists(id).await?;
            return Ok(false);
        }
        Ok(true)
    }

    async fn list_providers_by_categories(
        &self,
        categories: &[String],
    ) -> Result<Vec<Provider>, StoreError> {
        let rows = sqlx::query_as::<_, (String, Json<serde_json::Value>)>(
            "SELECT id, doc FROM providers
             WHERE cardinality($1::text[]) = 0 OR doc->>'category' = ANY($1)
             ORDER BY id",
        )
        .bind(categories)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter()
            .map(|(id, Json(doc))| {
                let id = ProviderId::new(id)
                    .map_err(|e| StoreError::backend(format!("bad provider id in store: {e}")))?;
                decode_provider(&id, doc)
            })
            .collect()
    }
}
