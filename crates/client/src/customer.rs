//! Customer service client (login and registration).

use serde::{Deserialize, Serialize};

use shopfront_core::{CustomerId, Session, UserProfile};

use crate::error::GatewayError;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access: Option<String>,
    #[serde(default)]
    user: Option<LoginUser>,
}

#[derive(Debug, Deserialize)]
struct LoginUser {
    #[serde(deserialize_with = "customer_id_from_wire")]
    id: CustomerId,
    username: String,
}

/// The service is inconsistent about whether `user.id` is a number or a
/// string; accept both.
fn customer_id_from_wire<'de, D>(deserializer: D) -> Result<CustomerId, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Num(u64),
        Text(String),
    }

    match Wire::deserialize(deserializer)? {
        Wire::Num(id) => Ok(CustomerId::new(id)),
        Wire::Text(text) => text.parse::<CustomerId>().map_err(serde::de::Error::custom),
    }
}

/// Registration payload the customer service expects; the password is sent
/// twice by contract.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
    pub password2: String,
    pub customer_type: String,
    pub phone_number: String,
}

/// Client for the customer service.
pub struct CustomerGateway {
    client: reqwest::Client,
    base_url: String,
}

impl CustomerGateway {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Exchange credentials for a session (bearer token plus the profile it
    /// was issued for).
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, GatewayError> {
        let url = format!("{}/customer/api/login/", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(GatewayError::network)?;

        if !resp.status().is_success() {
            return Err(GatewayError::api(resp).await);
        }

        let body: LoginResponse = resp.json().await.map_err(GatewayError::parse)?;
        let token = body
            .access
            .ok_or_else(|| GatewayError::Parse("login response missing access token".to_string()))?;
        let user = body
            .user
            .ok_or_else(|| GatewayError::Parse("login response missing user profile".to_string()))?;

        Ok(Session {
            token,
            profile: UserProfile {
                id: user.id,
                username: user.username,
            },
        })
    }

    /// Create an account. The caller logs in separately afterwards.
    pub async fn register(&self, registration: &Registration) -> Result<(), GatewayError> {
        let url = format!("{}/customer/api/register/", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(registration)
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
    fn login_response_accepts_numeric_user_ids() {
        let raw = serde_json::json!({
            "access": "jwt-a",
            "refresh": "jwt-r",
            "user": { "id": 5, "username": "ada" }
        });
        let parsed: LoginResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.user.unwrap().id, CustomerId::new(5));
    }

    #[test]
    fn login_response_accepts_string_user_ids() {
        let raw = serde_json::json!({
            "access": "jwt-a",
            "user": { "id": "5", "username": "ada" }
        });
        let parsed: LoginResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.user.unwrap().id, CustomerId::new(5));
    }

    #[test]
    fn non_numeric_string_ids_fail_parsing() {
        let raw = serde_json::json!({
            "access": "jwt-a",
            "user": { "id": "abc", "username": "ada" }
        });
        assert!(serde_json::from_value::<LoginResponse>(raw).is_err());
    }

    #[test]
    fn registration_serializes_with_both_password_fields() {
        let registration = Registration {
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            password: "hunter2hunter2".to_string(),
            password2: "hunter2hunter2".to_string(),
            customer_type: "customer".to_string(),
            phone_number: "+15550100".to_string(),
        };

        let json = serde_json::to_value(&registration).unwrap();
        assert_eq!(json["password"], json["password2"]);
        assert_eq!(json["customer_type"], "customer");
        assert_eq!(json["phone_number"], "+15550100");
    }
}
