//! End-to-end subscription lifecycle tests over the in-memory stores and the
//! scriptable mock gateway, driven through the public handler API.

use std::collections::BTreeSet;
use std::sync::Arc;

use submarket::adapters::memory::{InMemoryAccountStore, InMemoryCatalogStore};
use submarket::adapters::stripe::MockGateway;
use submarket::application::handlers::account::{RegisterClientHandler, RegisterProviderHandler};
use submarket::application::handlers::catalog::{CreatePlanHandler, DeletePlanHandler};
use submarket::application::handlers::subscription::SubscriptionCoordinator;
use submarket::domain::account::{NewClient, NewProvider};
use submarket::domain::catalog::{BillingCycle, NewPlan};
use submarket::domain::foundation::{ClientId, Money, PlanId, ProviderId};
use submarket::domain::subscription::SubscriptionError;
use submarket::ports::{AccountStore, CatalogStore, GatewayError};

struct Harness {
    catalog: Arc<InMemoryCatalogStore>,
    accounts: Arc<InMemoryAccountStore>,
    gateway: Arc<MockGateway>,
    coordinator: SubscriptionCoordinator,
}

impl Harness {
    fn new() -> Self {
        let catalog = Arc::new(InMemoryCatalogStore::new());
        let accounts = Arc::new(InMemoryAccountStore::new());
        let gateway = Arc::new(MockGateway::new());
        let coordinator =
            SubscriptionCoordinator::new(catalog.clone(), accounts.clone(), gateway.clone());
        Self {
            catalog,
            accounts,
            gateway,
            coordinator,
        }
    }

    async fn register_client(&self, id: &str) -> ClientId {
        let handler = RegisterClientHandler::new(self.accounts.clone());
        let client = handler
            .execute(
                ClientId::new(id).unwrap(),
                NewClient {
                    first_name: "Ada".to_string(),
                    last_name: "Lovelace".to_string(),
                    preferences: BTreeSet::new(),
                },
            )
            .await
            .unwrap();
        client.id
    }

    async fn register_provider(&self, id: &str) -> ProviderId {
        let handler = RegisterProviderHandler::new(self.accounts.clone());
        let provider = handler
            .execute(
                ProviderId::new(id).unwrap(),
                NewProvider {
                    business_name: "Morning Flow Yoga".to_string(),
                    category: "fitness".to_string(),
                    bio: None,
                    website: None,
                    cover_image: None,
                },
            )
            .await
            .unwrap();
        provider.id
    }

    async fn create_plan(&self, provider_id: &ProviderId, price: &str) -> PlanId {
        let handler = CreatePlanHandler::new(self.catalog.clone(), self.accounts.clone());
        let plan = handler
            .execute(
                provider_id,
                NewPlan {
                    title: "Weekly Yoga".to_string(),
                    description: Some("Two classes a week".to_string()),
                    price: Money::parse_decimal(price, "CAD").unwrap(),
                    billing_cycle: BillingCycle::Monthly,
                    grace_period_days: 3,
                },
            )
            .await
            .unwrap();
        plan.id
    }

    async fn assert_mirrored(&self, client_id: &ClientId, plan_id: &PlanId, subscribed: bool) {
        let plan = self.catalog.get_plan(plan_id).await.unwrap().unwrap();
        let client = self.accounts.get_client(client_id).await.unwrap().unwrap();
        assert_eq!(
            plan.subscribers.contains(client_id),
            subscribed,
            "plan-side subscriber mismatch"
        );
        assert_eq!(
            client.has_subscription(plan_id),
            subscribed,
            "client-side entry mismatch"
        );
    }
}

#[tokio::test]
async fn full_lifecycle_mirrors_both_sides() {
    let h = Harness::new();
    let provider = h.register_provider("prov-1").await;
    let plan = h.create_plan(&provider, "10.00").await;
    let client = h.register_client("client-1").await;

    let outcome = h
        .coordinator
        .subscribe(&client, &plan, "ada@example.com")
        .await
        .unwrap();
    assert!(outcome.newly_subscribed);
    h.assert_mirrored(&client, &plan, true).await;

    h.coordinator.unsubscribe(&client, &plan).await.unwrap();
    h.assert_mirrored(&client, &plan, false).await;
}

#[tokio::test]
async fn first_subscriber_prices_plan_exactly_once() {
    let h = Harness::new();
    let provider = h.register_provider("prov-1").await;
    let plan_id = h.create_plan(&provider, "10.00").await;

    // Creating the plan does not touch the gateway.
    assert_eq!(h.gateway.price_creates(), 0);
    let plan = h.catalog.get_plan(&plan_id).await.unwrap().unwrap();
    assert!(plan.gateway_price_id.is_none());
    assert_eq!(plan.price.minor_units(), 1000);

    let a = h.register_client("client-a").await;
    let b = h.register_client("client-b").await;
    h.coordinator
        .subscribe(&a, &plan_id, "a@example.com")
        .await
        .unwrap();
    h.coordinator
        .subscribe(&b, &plan_id, "b@example.com")
        .await
        .unwrap();

    assert_eq!(h.gateway.price_creates(), 1);
    let plan = h.catalog.get_plan(&plan_id).await.unwrap().unwrap();
    assert!(plan.gateway_price_id.is_some());
    assert_eq!(plan.subscribers.len(), 2);
}

#[tokio::test]
async fn repeated_subscribe_does_not_touch_gateway_again() {
    let h = Harness::new();
    let provider = h.register_provider("prov-1").await;
    let plan = h.create_plan(&provider, "10.00").await;
    let client = h.register_client("client-1").await;

    let first = h
        .coordinator
        .subscribe(&client, &plan, "ada@example.com")
        .await
        .unwrap();
    let second = h
        .coordinator
        .subscribe(&client, &plan, "ada@example.com")
        .await
        .unwrap();

    assert!(first.newly_subscribed);
    assert!(!second.newly_subscribed);
    assert_eq!(h.gateway.subscription_creates(), 1);
    assert_eq!(h.gateway.customer_creates(), 1);
}

#[tokio::test]
async fn one_gateway_customer_across_plans() {
    let h = Harness::new();
    let provider = h.register_provider("prov-1").await;
    let plan_a = h.create_plan(&provider, "10.00").await;
    let plan_b = h.create_plan(&provider, "25.50").await;
    let client = h.register_client("client-1").await;

    h.coordinator
        .subscribe(&client, &plan_a, "ada@example.com")
        .await
        .unwrap();
    h.coordinator
        .subscribe(&client, &plan_b, "ada@example.com")
        .await
        .unwrap();

    assert_eq!(h.gateway.customer_creates(), 1);
    assert_eq!(h.gateway.price_creates(), 2);
}

#[tokio::test]
async fn unsubscribe_keeps_the_price_for_later_subscribers() {
    let h = Harness::new();
    let provider = h.register_provider("prov-1").await;
    let plan_id = h.create_plan(&provider, "10.00").await;
    let client = h.register_client("client-1").await;

    h.coordinator
        .subscribe(&client, &plan_id, "ada@example.com")
        .await
        .unwrap();
    let priced = h.catalog.get_plan(&plan_id).await.unwrap().unwrap();
    let price_id = priced.gateway_price_id.clone().unwrap();

    h.coordinator.unsubscribe(&client, &plan_id).await.unwrap();
    h.coordinator
        .subscribe(&client, &plan_id, "ada@example.com")
        .await
        .unwrap();

    let plan = h.catalog.get_plan(&plan_id).await.unwrap().unwrap();
    assert_eq!(plan.gateway_price_id.as_deref(), Some(price_id.as_str()));
    assert_eq!(h.gateway.price_creates(), 1);
}

#[tokio::test]
async fn gateway_rejection_rolls_back_both_mirror_sides() {
    let h = Harness::new();
    let provider = h.register_provider("prov-1").await;
    let plan = h.create_plan(&provider, "10.00").await;
    let client = h.register_client("client-1").await;

    h.gateway
        .fail_next_subscription(GatewayError::Rejected("card declined".to_string()));
    let err = h
        .coordinator
        .subscribe(&client, &plan, "ada@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, SubscriptionError::GatewayRejected(_)));
    h.assert_mirrored(&client, &plan, false).await;

    // The price survives the rollback, so the retry reuses it.
    assert_eq!(h.gateway.price_creates(), 1);
    h.coordinator
        .subscribe(&client, &plan, "ada@example.com")
        .await
        .unwrap();
    assert_eq!(h.gateway.price_creates(), 1);
    h.assert_mirrored(&client, &plan, true).await;
}

#[tokio::test]
async fn gateway_outage_leaves_consistent_local_state() {
    let h = Harness::new();
    let provider = h.register_provider("prov-1").await;
    let plan = h.create_plan(&provider, "10.00").await;
    let client = h.register_client("client-1").await;

    h.gateway
        .fail_next_subscription(GatewayError::Unavailable("connect timeout".to_string()));
    let err = h
        .coordinator
        .subscribe(&client, &plan, "ada@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, SubscriptionError::GatewayUnavailable(_)));

    // Both local sides stay in place, so the mirror remains consistent and a
    // reconcile pass has nothing to repair.
    h.assert_mirrored(&client, &plan, true).await;
    let report = h.coordinator.reconcile_plan(&plan).await.unwrap();
    assert_eq!(report.removed_stale_subscribers, 0);
    assert_eq!(report.restored_subscribers, 0);

    // The retry sees a complete mirror and never bills twice.
    let retry = h
        .coordinator
        .subscribe(&client, &plan, "ada@example.com")
        .await
        .unwrap();
    assert!(!retry.newly_subscribed);
    assert!(h.gateway.subscription_creates() <= 1);
}

#[tokio::test]
async fn deleting_a_plan_cascades_to_all_subscribers() {
    let h = Harness::new();
    let provider = h.register_provider("prov-1").await;
    let plan = h.create_plan(&provider, "10.00").await;
    let a = h.register_client("client-a").await;
    let b = h.register_client("client-b").await;

    h.coordinator
        .subscribe(&a, &plan, "a@example.com")
        .await
        .unwrap();
    h.coordinator
        .subscribe(&b, &plan, "b@example.com")
        .await
        .unwrap();

    let handler = DeletePlanHandler::new(h.catalog.clone(), h.accounts.clone());
    handler.execute(&provider, &plan).await.unwrap();

    assert!(h.catalog.get_plan(&plan).await.unwrap().is_none());
    for client_id in [&a, &b] {
        let client = h.accounts.get_client(client_id).await.unwrap().unwrap();
        assert!(!client.has_subscription(&plan));
    }
    let provider_doc = h.accounts.get_provider(&provider).await.unwrap().unwrap();
    assert!(!provider_doc.plans.contains(&plan));
}

#[tokio::test]
async fn unsubscribe_after_plan_deletion_cleans_the_dangling_entry() {
    let h = Harness::new();
    let provider = h.register_provider("prov-1").await;
    let plan = h.create_plan(&provider, "10.00").await;
    let client = h.register_client("client-1").await;

    h.coordinator
        .subscribe(&client, &plan, "ada@example.com")
        .await
        .unwrap();

    // Simulate a crash remnant: plan doc removed without the cascade.
    h.catalog.delete_plan(&plan).await.unwrap();

    h.coordinator.unsubscribe(&client, &plan).await.unwrap();
    let doc = h.accounts.get_client(&client).await.unwrap().unwrap();
    assert!(!doc.has_subscription(&plan));
}

#[tokio::test]
async fn subscribe_to_unknown_plan_is_not_found() {
    let h = Harness::new();
    let client = h.register_client("client-1").await;
    let missing = PlanId::new();

    let err = h
        .coordinator
        .subscribe(&client, &missing, "ada@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, SubscriptionError::PlanNotFound(_)));
    assert_eq!(h.gateway.customer_creates(), 0);
}

#[tokio::test]
async fn reconcile_repairs_a_half_written_mirror() {
    let h = Harness::new();
    let provider = h.register_provider("prov-1").await;
    let plan = h.create_plan(&provider, "10.00").await;
    let client = h.register_client("client-1").await;

    h.coordinator
        .subscribe(&client, &plan, "ada@example.com")
        .await
        .unwrap();

    // Simulate a crash remnant: client entry lost, plan side kept. The client
    // side records completed intent, so the stale subscriber is dropped.
    h.accounts
        .remove_subscription(&client, &plan)
        .await
        .unwrap();

    let report = h.coordinator.reconcile_plan(&plan).await.unwrap();
    assert_eq!(report.removed_stale_subscribers, 1);
    assert_eq!(report.restored_subscribers, 0);
    h.assert_mirrored(&client, &plan, false).await;
}
