use crate::api::{ApiResult, LoginRequest, ProfileUpdateRequest, RegisterRequest};
use crate::models::User;
use crate::state::{note_unauthorized, AppContext};
use crate::storage::load_token_from_storage;
use crate::util::now_ms;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use leptos::prelude::*;

/// Decode a JWT's payload segment without verifying the signature. Good
/// enough to peek at claims client-side; the backend is the authority.
pub(crate) fn jwt_payload(token: &str) -> Option<serde_json::Value> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

pub(crate) fn jwt_exp_seconds(payload: &serde_json::Value) -> Option<i64> {
    let exp = payload.get("exp")?;
    exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64))
}

/// Auth operations over the shared app state. Token persists in
/// localStorage; the user object lives only in memory.
#[derive(Clone)]
pub(crate) struct AuthStore {
    ctx: AppContext,
}

impl AuthStore {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    fn adopt_session(&self, token: String, user: User) {
        let state = &self.ctx.0;
        state.api_client.update(|c| c.set_token(token));
        state.api_client.get_untracked().save_to_storage();
        state.current_user.set(Some(user));
    }

    pub fn is_authenticated(&self) -> bool {
        self.ctx.0.api_client.with_untracked(|c| c.is_authenticated())
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> ApiResult<()> {
        let state = &self.ctx.0;
        state.auth_loading.set(true);
        state.auth_error.set(None);

        let client = state.api_client.get_untracked();
        let result = client
            .register(&RegisterRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await;
        state.auth_loading.set(false);

        match result {
            Ok(session) => {
                self.adopt_session(session.token, session.user);
                Ok(())
            }
            Err(err) => {
                state
                    .auth_error
                    .set(Some(err.user_message("Registration failed")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<()> {
        let state = &self.ctx.0;
        state.auth_loading.set(true);
        state.auth_error.set(None);

        let client = state.api_client.get_untracked();
        let result = client
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await;
        state.auth_loading.set(false);

        match result {
            Ok(session) => {
                self.adopt_session(session.token, session.user);
                Ok(())
            }
            Err(err) => {
                state.auth_error.set(Some(err.user_message("Login failed")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }

    /// Clears the session everywhere; never calls the server.
    pub fn logout(&self) {
        let state = &self.ctx.0;
        state.api_client.update(|c| c.logout());
        state.current_user.set(None);
    }

    /// Validates the persisted token and re-derives the user. Returns
    /// false (after logging out) on a missing/expired/undecodable token
    /// or any profile-fetch failure.
    pub async fn check_auth(&self) -> bool {
        let token = match load_token_from_storage() {
            Some(t) if !t.trim().is_empty() => t,
            _ => {
                self.logout();
                return false;
            }
        };

        let Some(payload) = jwt_payload(&token) else {
            self.logout();
            return false;
        };
        if let Some(exp) = jwt_exp_seconds(&payload) {
            if exp <= now_ms() / 1000 {
                self.logout();
                return false;
            }
        }

        let state = &self.ctx.0;
        state.api_client.update(|c| c.set_token(token));

        let client = state.api_client.get_untracked();
        match client.me().await {
            Ok(user) => {
                state.current_user.set(Some(user));
                true
            }
            Err(_) => {
                self.logout();
                false
            }
        }
    }

    pub async fn update_profile(&self, req: &ProfileUpdateRequest) -> ApiResult<User> {
        let state = &self.ctx.0;
        state.auth_loading.set(true);
        state.auth_error.set(None);

        let client = state.api_client.get_untracked();
        let result = client.update_profile(req).await;
        state.auth_loading.set(false);

        match result {
            Ok(user) => {
                state.current_user.set(Some(user.clone()));
                Ok(user)
            }
            Err(err) => {
                state
                    .auth_error
                    .set(Some(err.user_message("Failed to update profile")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_payload(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(b"{\"alg\":\"HS256\",\"typ\":\"JWT\"}");
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());
        format!("{header}.{body}.sig")
    }

    #[test]
    fn payload_decodes_exp_claim() {
        let token = token_with_payload(serde_json::json!({"sub": "u1", "exp": 1700000000}));
        let payload = jwt_payload(&token).unwrap();
        assert_eq!(jwt_exp_seconds(&payload), Some(1_700_000_000));
    }

    #[test]
    fn float_exp_is_accepted() {
        let token = token_with_payload(serde_json::json!({"exp": 1700000000.5}));
        let payload = jwt_payload(&token).unwrap();
        assert_eq!(jwt_exp_seconds(&payload), Some(1_700_000_000));
    }

    #[test]
    fn malformed_tokens_yield_none() {
        assert!(jwt_payload("not-a-jwt").is_none());
        assert!(jwt_payload("a.!!!.c").is_none());
        assert!(jwt_payload("").is_none());
    }

    #[test]
    fn missing_exp_claim_is_none_but_decodable() {
        let token = token_with_payload(serde_json::json!({"sub": "u1"}));
        let payload = jwt_payload(&token).unwrap();
        assert_eq!(jwt_exp_seconds(&payload), None);
    }

    #[test]
    fn padded_base64_is_tolerated() {
        // Some encoders emit padded base64url; the decoder strips it.
        let body = base64::engine::general_purpose::URL_SAFE
            .encode(serde_json::to_vec(&serde_json::json!({"exp": 42})).unwrap());
        let token = format!("h.{body}.s");
        let payload = jwt_payload(&token).unwrap();
        assert_eq!(jwt_exp_seconds(&payload), Some(42));
    }
}
