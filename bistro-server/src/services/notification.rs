//! Twilio SMS integration via REST API

use super::{ServiceError, ServiceResult, SmsSender};
use async_trait::async_trait;

#[derive(Clone)]
pub struct TwilioSender {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioSender {
    pub fn new(account_sid: String, auth_token: String, from_number: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            account_sid,
            auth_token,
            from_number,
        }
    }
}

#[async_trait]
impl SmsSender for TwilioSender {
    async fn send(&self, to: &str, body: &str) -> ServiceResult<()> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        );
        let resp: serde_json::Value = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", to),
                ("From", self.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await?
            .json()
            .await?;

        if resp["sid"].as_str().is_some() {
            Ok(())
        } else {
            Err(ServiceError::BadResponse(format!(
                "Twilio send failed: {resp}"
            )))
        }
    }
}

/// Message templates used by the order pipeline
pub mod templates {
    /// Order confirmation, sent after a successful create
    pub fn order_confirmed(order_ref: &str, total: f64, cooking_minutes: i64) -> String {
        format!(
            "Your order {order_ref} is confirmed! Total: ${total:.2}. \
             Estimated preparation time: {cooking_minutes} min."
        )
    }

    /// Sent when the kitchen marks the order completed
    pub fn order_completed(order_ref: &str) -> String {
        format!("Your order {order_ref} is ready. Enjoy!")
    }

    /// Sent after a cancellation
    pub fn order_cancelled(order_ref: &str, refunded: bool) -> String {
        if refunded {
            format!("Your order {order_ref} was cancelled and your payment refunded.")
        } else {
            format!("Your order {order_ref} was cancelled.")
        }
    }

    /// Sent to the rider on assignment
    pub fn delivery_assigned(order_ref: &str, address: &str) -> String {
        format!("New delivery for order {order_ref}: {address}")
    }
}
