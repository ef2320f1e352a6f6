//! Payment service client.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use shopfront_core::{CustomerId, DomainError, OrderId};

use crate::error::GatewayError;

/// Accepted payment methods, serialized with the display strings the
/// payment service expects.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Paypal")]
    Paypal,
}

impl core::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PaymentMethod::CreditCard => f.write_str("Credit Card"),
            PaymentMethod::Paypal => f.write_str("Paypal"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "creditcard" | "card" => Ok(PaymentMethod::CreditCard),
            "paypal" => Ok(PaymentMethod::Paypal),
            other => Err(DomainError::validation(format!(
                "unknown payment method: {other}"
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct SubmitPaymentRequest {
    order_id: OrderId,
    method: PaymentMethod,
    customer_id: CustomerId,
}

/// Client for the payment service.
pub struct PaymentGateway {
    client: reqwest::Client,
    base_url: String,
}

impl PaymentGateway {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Submit payment for a placed order.
    pub async fn submit_payment(
        &self,
        owner: CustomerId,
        order_id: OrderId,
        method: PaymentMethod,
    ) -> Result<(), GatewayError> {
        let url = format!("{}/payment/payment/payments/", self.base_url);
        let payload = SubmitPaymentRequest {
            order_id,
            method,
            customer_id: owner,
        };
        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(GatewayError::network)?;

        if !resp.status().is_success() {
            return Err(GatewayError::api(resp).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods_serialize_with_display_strings() {
        let payload = SubmitPaymentRequest {
            order_id: OrderId::new(41),
            method: PaymentMethod::CreditCard,
            customer_id: CustomerId::new(3),
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "order_id": 41,
                "method": "Credit Card",
                "customer_id": 3
            })
        );
    }

    #[test]
    fn parses_cli_spellings() {
        assert_eq!(
            "credit-card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CreditCard
        );
        assert_eq!(
            "Credit Card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CreditCard
        );
        assert_eq!("card".parse::<PaymentMethod>().unwrap(), PaymentMethod::CreditCard);
        assert_eq!("PayPal".parse::<PaymentMethod>().unwrap(), PaymentMethod::Paypal);
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }
}
