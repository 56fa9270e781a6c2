//! Subscription lifecycle coordinator.
//!
//! All writes to the subscriber mirror (a plan's subscriber set and its
//! clients' subscription sets) go through this coordinator. Within one
//! process, operations on the same (client, plan) pair are serialized by a
//! per-pair lock; across crashes, the fixed write order plus idempotent store
//! primitives and the gateway idempotency key make retries converge.
//!
//! Write order on subscribe: plan side, then client side, then gateway. A
//! crash or gateway outage can therefore leave the plan side ahead of the
//! client side, or both sides ahead of the gateway; never the reverse.
//! `reconcile_plan` repairs the former, a retried subscribe the latter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, error, warn};

use crate::domain::account::Client;
use crate::domain::catalog::Plan;
use crate::domain::foundation::{ClientId, PlanId};
use crate::domain::subscription::{SubscriptionEntry, SubscriptionError};
use crate::ports::{AccountStore, CatalogStore, PaymentGateway, RecurringInterval};

/// Result of a subscribe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeOutcome {
    /// `false` when the client was already subscribed and nothing was done.
    pub newly_subscribed: bool,
    /// The gateway subscription id, when this call created one.
    pub gateway_subscription_id: Option<String>,
}

/// What `reconcile_plan` found and repaired.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Plan-side subscribers with no matching client entry, dropped from the
    /// plan.
    pub removed_stale_subscribers: usize,
    /// Client entries with no matching plan-side subscriber, mirrored back
    /// onto the plan.
    pub restored_subscribers: usize,
    /// Client entries referencing a plan that no longer exists, removed.
    pub removed_dangling_entries: usize,
}

type PairLocks = Mutex<HashMap<(ClientId, PlanId), Arc<tokio::sync::Mutex<()>>>>;

/// Serializes and executes subscription lifecycle operations.
pub struct SubscriptionCoordinator {
    catalog: Arc<dyn CatalogStore>,
    accounts: Arc<dyn AccountStore>,
    gateway: Arc<dyn PaymentGateway>,
    pair_locks: PairLocks,
}

impl SubscriptionCoordinator {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        accounts: Arc<dyn AccountStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            catalog,
            accounts,
            gateway,
            pair_locks: Mutex::new(HashMap::new()),
        }
    }

    fn pair_lock(&self, client_id: &ClientId, plan_id: &PlanId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = match self.pair_locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        locks
            .entry((client_id.clone(), *plan_id))
            .or_default()
            .clone()
    }

    /// Subscribes a client to a plan.
    ///
    /// Idempotent: a client already on both sides of the mirror returns
    /// without touching the gateway. The first subscriber to an unpriced plan
    /// triggers creation of the gateway recurring price.
    pub async fn subscribe(
        &self,
        client_id: &ClientId,
        plan_id: &PlanId,
        client_email: &str,
    ) -> Result<SubscribeOutcome, SubscriptionError> {
        let lock = self.pair_lock(client_id, plan_id);
        let _guard = lock.lock().await;

        let client = self
            .accounts
            .get_client(client_id)
            .await?
            .ok_or_else(|| SubscriptionError::ClientNotFound(client_id.clone()))?;
        let plan = self
            .catalog
            .get_plan(plan_id)
            .await?
            .ok_or_else(|| SubscriptionError::PlanNotFound(*plan_id))?;

        if plan.subscribers.contains(client_id) && client.has_subscription(plan_id) {
            debug!(%client_id, %plan_id, "already subscribed, nothing to do");
            return Ok(SubscribeOutcome {
                newly_subscribed: false,
                gateway_subscription_id: None,
            });
        }

        let customer_id = self.ensure_customer(&client, plan_id, client_email).await?;
        let price_id = self.ensure_price(client_id, &plan).await?;

        // Plan side first, then client side. Both are idempotent, so a retry
        // after a crash between the two writes completes the pair.
        self.catalog.add_subscriber(plan_id, client_id).await?;
        let entry = SubscriptionEntry::new(*plan_id);
        self.accounts.add_subscription(client_id, &entry).await?;

        let idempotency_key = format!("sub-{client_id}-{plan_id}");
        match self
            .gateway
            .create_subscription(&customer_id, &price_id, &idempotency_key)
            .await
        {
            Ok(sub) => {
                debug!(%client_id, %plan_id, gateway_subscription = %sub.id, "subscribed");
                Ok(SubscribeOutcome {
                    newly_subscribed: true,
                    gateway_subscription_id: Some(sub.id),
                })
            }
            Err(err) if err.is_retryable() => {
                // Local mirror entries stay in place. A retried subscribe
                // reuses the same idempotency key, so the gateway side
                // catches up without double billing.
                error!(
                    %client_id, %plan_id, error = %err,
                    "gateway unavailable after local writes; retry will converge"
                );
                Err(err.into())
            }
            Err(err) => {
                warn!(%client_id, %plan_id, error = %err, "gateway rejected, compensating");
                self.compensate(client_id, plan_id).await;
                Err(err.into())
            }
        }
    }

    /// Removes a client's subscription to a plan. Idempotent; tolerates a
    /// plan that no longer exists (dangling entry cleanup). The plan's
    /// gateway price id is left untouched.
    pub async fn unsubscribe(
        &self,
        client_id: &ClientId,
        plan_id: &PlanId,
    ) -> Result<(), SubscriptionError> {
        let lock = self.pair_lock(client_id, plan_id);
        let _guard = lock.lock().await;

        self.accounts
            .get_client(client_id)
            .await?
            .ok_or_else(|| SubscriptionError::ClientNotFound(client_id.clone()))?;

        let removed = self.accounts.remove_subscription(client_id, plan_id).await?;

        match self.catalog.get_plan(plan_id).await? {
            Some(_) => {
                self.catalog.remove_subscriber(plan_id, client_id).await?;
            }
            None if removed => {
                debug!(%client_id, %plan_id, "removed dangling entry for deleted plan");
            }
            None => {}
        }

        Ok(())
    }

    /// Compares a plan's subscriber set against the clients holding entries
    /// for it and repairs both sides. When the plan is gone, every entry
    /// referencing it is dangling and gets removed.
    pub async fn reconcile_plan(
        &self,
        plan_id: &PlanId,
    ) -> Result<ReconcileReport, SubscriptionError> {
        let mut report = ReconcileReport::default();
        let holders = self.accounts.list_clients_with_subscription(plan_id).await?;

        let plan = match self.catalog.get_plan(plan_id).await? {
            Some(plan) => plan,
            None => {
                for client in &holders {
                    if self.accounts.remove_subscription(&client.id, plan_id).await? {
                        report.removed_dangling_entries += 1;
                    }
                }
                return Ok(report);
            }
        };

        let holder_ids: Vec<&ClientId> = holders.iter().map(|c| &c.id).collect();

        // A subscriber with no client entry is a half-finished write; the
        // client side records the completed intent, so converge to it.
        for subscriber in &plan.subscribers {
            if !holder_ids.contains(&subscriber) {
                if self.catalog.remove_subscriber(plan_id, subscriber).await? {
                    report.removed_stale_subscribers += 1;
                }
            }
        }
        for holder in &holder_ids {
            if !plan.subscribers.contains(holder) {
                if self.catalog.add_subscriber(plan_id, holder).await? {
                    report.restored_subscribers += 1;
                }
            }
        }

        Ok(report)
    }

    async fn ensure_customer(
        &self,
        client: &Client,
        plan_id: &PlanId,
        email: &str,
    ) -> Result<String, SubscriptionError> {
        if let Some(id) = &client.gateway_customer_id {
            return Ok(id.clone());
        }

        let created = self.gateway.create_customer(email).await?;
        if self
            .accounts
            .set_gateway_customer(&client.id, &created)
            .await?
        {
            return Ok(created);
        }

        // Another writer assigned a customer first; use theirs.
        self.accounts
            .get_client(&client.id)
            .await?
            .and_then(|c| c.gateway_customer_id)
            .ok_or_else(|| SubscriptionError::Consistency {
                client_id: client.id.clone(),
                plan_id: *plan_id,
                detail: "gateway customer assignment lost and not readable".to_string(),
            })
    }

    async fn ensure_price(
        &self,
        client_id: &ClientId,
        plan: &Plan,
    ) -> Result<String, SubscriptionError> {
        if let Some(id) = &plan.gateway_price_id {
            return Ok(id.clone());
        }

        let interval = RecurringInterval::from_billing_cycle(&plan.billing_cycle);
        let created = self
            .gateway
            .create_recurring_price(&plan.title, &plan.price, interval)
            .await?;
        if self.catalog.set_gateway_price(&plan.id, &created).await? {
            return Ok(created);
        }

        self.catalog
            .get_plan(&plan.id)
            .await?
            .and_then(|p| p.gateway_price_id)
            .ok_or_else(|| SubscriptionError::Consistency {
                client_id: client_id.clone(),
                plan_id: plan.id,
                detail: "gateway price assignment lost and not readable".to_string(),
            })
    }

    async fn compensate(&self, client_id: &ClientId, plan_id: &PlanId) {
        if let Err(e) = self.accounts.remove_subscription(client_id, plan_id).await {
            error!(%client_id, %plan_id, error = %e, "compensation failed on client side");
        }
        if let Err(e) = self.catalog.remove_subscriber(plan_id, client_id).await {
            error!(%client_id, %plan_id, error = %e, "compensation failed on plan side");
        }
    }
}
