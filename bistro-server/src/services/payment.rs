//! Stripe integration via REST API (no SDK dependency)

use super::{ChargeOutcome, PaymentGateway, ServiceError, ServiceResult};
use async_trait::async_trait;

/// Stripe payment gateway
///
/// Uses PaymentIntents with automatic confirmation; amounts are converted
/// to the smallest currency unit as the API requires.
#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    currency: String,
}

impl StripeGateway {
    pub fn new(secret_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key,
            currency: "usd".into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn charge(&self, amount: f64, order_ref: &str) -> ServiceResult<ChargeOutcome> {
        let amount_minor = (amount * 100.0).round() as i64;
        let resp: serde_json::Value = self
            .client
            .post("https://api.stripe.com/v1/payment_intents")
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&[
                ("amount", amount_minor.to_string().as_str()),
                ("currency", self.currency.as_str()),
                ("confirm", "true"),
                ("automatic_payment_methods[enabled]", "true"),
                ("automatic_payment_methods[allow_redirects]", "never"),
                ("metadata[order_ref]", order_ref),
            ])
            .send()
            .await?
            .json()
            .await?;

        match resp["status"].as_str() {
            Some("succeeded") => Ok(ChargeOutcome {
                success: true,
                transaction_id: resp["id"].as_str().map(String::from),
                decline_reason: None,
            }),
            Some(status) => Ok(ChargeOutcome {
                success: false,
                transaction_id: resp["id"].as_str().map(String::from),
                decline_reason: Some(
                    resp["last_payment_error"]["message"]
                        .as_str()
                        .unwrap_or(status)
                        .to_string(),
                ),
            }),
            None => Err(ServiceError::BadResponse(format!(
                "Stripe payment_intents failed: {resp}"
            ))),
        }
    }

    async fn refund(&self, transaction_id: &str) -> ServiceResult<()> {
        let resp: serde_json::Value = self
            .client
            .post("https://api.stripe.com/v1/refunds")
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&[("payment_intent", transaction_id)])
            .send()
            .await?
            .json()
            .await?;

        match resp["status"].as_str() {
            Some("succeeded") | Some("pending") => Ok(()),
            Some(status) => Err(ServiceError::Declined(format!(
                "Stripe refund not accepted: {status}"
            ))),
            None => Err(ServiceError::BadResponse(format!(
                "Stripe refunds failed: {resp}"
            ))),
        }
    }
}
