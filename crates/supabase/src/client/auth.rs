//! Email/password auth over `GoTrue`.

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::SupabaseClient;
use crate::backend::AuthService;
use crate::error::BackendError;
use crate::types::{AccessToken, AuthSession, SignUpOutcome, User};

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

/// `/signup` answers with a session when the project auto-confirms accounts,
/// and with the bare user otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(AuthSession),
    User(User),
}

#[async_trait]
impl AuthService for SupabaseClient {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let request = self
            .request(Method::POST, "auth/v1/token", None)
            .query(&[("grant_type", "password")])
            .json(&Credentials { email, password });

        let session: AuthSession = Self::send_json(request).await?;
        info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, BackendError> {
        let request = self
            .request(Method::POST, "auth/v1/signup", None)
            .json(&Credentials { email, password });

        let outcome = match Self::send_json::<SignUpResponse>(request).await? {
            SignUpResponse::Session(session) => SignUpOutcome::SignedIn(session),
            SignUpResponse::User(user) => SignUpOutcome::ConfirmationRequired(user),
        };
        info!(user_id = %outcome.user().id, "Account registered");
        Ok(outcome)
    }

    #[instrument(skip_all)]
    async fn current_user(&self, token: &AccessToken) -> Result<Option<User>, BackendError> {
        let request = self.request(Method::GET, "auth/v1/user", Some(token));

        match Self::send_json::<User>(request).await {
            Ok(user) => Ok(Some(user)),
            Err(e) if e.is_unauthorized() => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, token: &AccessToken) -> Result<(), BackendError> {
        let request = self.request(Method::POST, "auth/v1/logout", Some(token));

        match Self::send(request).await {
            // Already expired or revoked: the session is gone either way.
            Err(e) if e.is_unauthorized() => Ok(()),
            Err(e) => Err(e),
            Ok(_) => Ok(()),
        }
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &AccessToken) -> Result<AuthSession, BackendError> {
        let request = self
            .request(Method::POST, "auth/v1/token", None)
            .query(&[("grant_type", "refresh_token")])
            .json(&RefreshGrant {
                refresh_token: refresh_token.expose(),
            });

        let session: AuthSession = Self::send_json(request).await?;
        debug!(user_id = %session.user.id, "Session refreshed");
        Ok(session)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_up_response_without_session() {
        let body = r#"{"id":"11aa","email":"novo@linhaverde.com.br","confirmation_sent_at":"2024-05-01T12:00:00Z"}"#;
        let parsed: SignUpResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(parsed, SignUpResponse::User(user) if user.id == "11aa"));
    }

    #[test]
    fn test_sign_up_response_with_session() {
        let body = r#"{"access_token":"jwt","expires_in":3600,"refresh_token":"rt","user":{"id":"11aa","email":"novo@linhaverde.com.br"}}"#;
        let parsed: SignUpResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(
            parsed,
            SignUpResponse::Session(s)
                if s.access_token.expose() == "jwt"
                    && s.refresh_token.as_ref().map(AccessToken::expose) == Some("rt")
        ));
    }
}
