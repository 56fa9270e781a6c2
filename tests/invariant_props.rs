//! Property tests for the value-object encodings and the subscriber mirror.

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use submarket::adapters::memory::{InMemoryAccountStore, InMemoryCatalogStore};
use submarket::adapters::stripe::MockGateway;
use submarket::application::handlers::subscription::SubscriptionCoordinator;
use submarket::domain::account::{Client, NewClient};
use submarket::domain::catalog::{BillingCycle, NewPlan, Plan};
use submarket::domain::foundation::{ClientId, Money, ProviderId};
use submarket::ports::{AccountStore, CatalogStore};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn billing_cycle_string_roundtrip(weeks in 0u32..520) {
        let cycle = BillingCycle::CustomWeeks(weeks);
        let encoded = cycle.to_string();
        prop_assert_eq!(encoded, format!("{} weeks", weeks));
        let decoded: BillingCycle = cycle.to_string().parse().unwrap();
        prop_assert_eq!(cycle, decoded);
    }

    #[test]
    fn money_decimal_roundtrip(whole in 0u64..1_000_000, cents in 0u64..100) {
        let decimal = format!("{}.{:02}", whole, cents);
        let money = Money::parse_decimal(&decimal, "CAD").unwrap();
        prop_assert_eq!(money.minor_units(), whole * 100 + cents);

        // Display re-encodes the same decimal.
        prop_assert_eq!(money.to_string(), format!("{} CAD", decimal));
    }

    #[test]
    fn money_rejects_excess_precision(frac in "[0-9]{3,6}") {
        let decimal = format!("1.{frac}");
        prop_assert!(Money::parse_decimal(&decimal, "CAD").is_err());
    }

    #[test]
    fn mirror_stays_bidirectional_under_random_operations(
        ops in prop::collection::vec((0usize..3, 0usize..2, prop::bool::ANY), 1..40)
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let catalog = Arc::new(InMemoryCatalogStore::new());
            let accounts = Arc::new(InMemoryAccountStore::new());
            let gateway = Arc::new(MockGateway::new());
            let coordinator =
                SubscriptionCoordinator::new(catalog.clone(), accounts.clone(), gateway.clone());

            let mut clients = Vec::new();
            for i in 0..3 {
                let client = Client::new(
                    ClientId::new(format!("client-{i}")).unwrap(),
                    NewClient {
                        first_name: "Ada".to_string(),
                        last_name: "Lovelace".to_string(),
                        preferences: BTreeSet::new(),
                    },
                )
                .unwrap();
                accounts.create_client(&client).await.unwrap();
                clients.push(client.id);
            }

            let mut plans = Vec::new();
            for _ in 0..2 {
                let plan = Plan::new(
                    ProviderId::new("prov-1").unwrap(),
                    NewPlan {
                        title: "Plan".to_string(),
                        description: None,
                        price: Money::parse_decimal("10.00", "CAD").unwrap(),
                        billing_cycle: BillingCycle::Monthly,
                        grace_period_days: 0,
                    },
                )
                .unwrap();
                catalog.create_plan(&plan).await.unwrap();
                plans.push(plan.id);
            }

            for (client_ix, plan_ix, is_subscribe) in ops {
                let client_id = &clients[client_ix];
                let plan_id = &plans[plan_ix];
                if is_subscribe {
                    coordinator
                        .subscribe(client_id, plan_id, "ada@example.com")
                        .await
                        .unwrap();
                } else {
                    coordinator.unsubscribe(client_id, plan_id).await.unwrap();
                }
            }

            // Both directions of the mirror agree for every (client, plan).
            for plan_id in &plans {
                let plan = catalog.get_plan(plan_id).await.unwrap().unwrap();
                for client_id in &clients {
                    let client = accounts.get_client(client_id).await.unwrap().unwrap();
                    assert_eq!(
                        plan.subscribers.contains(client_id),
                        client.has_subscription(plan_id),
                        "mirror out of sync for {client_id} / {plan_id}"
                    );
                }
            }
        });
    }
}
