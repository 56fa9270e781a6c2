//! Deserialization shapes for the slice of the Stripe API we call.
//!
//! Only the fields we read are declared; the API returns much more.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct StripeAccount {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct StripeAccountLink {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripePrice {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct StripePaymentMethod {
    pub id: String,
    pub card: Option<StripeCard>,
}

#[derive(Debug, Deserialize)]
pub struct StripeCard {
    pub brand: String,
    pub last4: String,
    pub exp_month: u32,
    pub exp_year: u32,
}

#[derive(Debug, Deserialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_payment_method_list() {
        let json = r#"{
            "data": [
                {"id": "pm_1", "card": {"brand": "visa", "last4": "4242", "exp_month": 12, "exp_year": 2030}},
                {"id": "pm_2", "card": null}
            ]
        }"#;
        let list: StripeList<StripePaymentMethod> = serde_json::from_str(json).unwrap();
        assert_eq!(list.data.len(), 2);
        assert_eq!(list.data[0].card.as_ref().unwrap().last4, "4242");
        assert!(list.data[1].card.is_none());
    }

    #[test]
    fn parses_event_envelope() {
        let json = r#"{
            "id": "evt_1",
            "type": "setup_intent.succeeded",
            "data": {"object": {"id": "seti_1"}}
        }"#;
        let event: StripeEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, "setup_intent.succeeded");
        assert_eq!(event.data.object["id"], "seti_1");
    }
}
