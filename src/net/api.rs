//! REST API client for the account endpoints.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR): stubs reporting [`ApiError::Unavailable`] since these
//! endpoints are only meaningful in the browser.
//!
//! The [`AuthApi`] trait is the seam between the session service and the
//! wire: the service never constructs requests itself, so tests drive it
//! with a scripted implementation.

#![allow(clippy::unused_async)]

use super::types::{Account, AccountFilter, FullAccount, LoginRequest, ProfileUpdate, RegisterRequest};

/// Transport-level failure reported by the API client.
///
/// Rejected requests and unreachable servers are not distinguished further;
/// the session service collapses both into per-operation messages.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("malformed response payload: {0}")]
    Decode(String),
    #[error("not available on server")]
    Unavailable,
}

/// The account endpoints the session service consumes.
pub trait AuthApi {
    /// `POST /api/v1/accounts/` — create a new account.
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError>;

    /// `POST /api/v1/auth/login/` — submit credentials, returning the
    /// lightweight account on success.
    async fn login(&self, email: &str, password: &str) -> Result<Account, ApiError>;

    /// `POST /api/v1/auth/logout/` — end the server-side session.
    async fn logout(&self) -> Result<(), ApiError>;

    /// `POST /api/v1/auth/update-profile/` — profile edit or credit top-up.
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), ApiError>;

    /// `POST /api/v1/auth/fullaccount/` — fetch the full record by email.
    async fn full_account(&self, email: &str) -> Result<FullAccount, ApiError>;

    /// `GET /api/v1/auth/accounts/` — search accounts by optional filters.
    async fn search_accounts(&self, filter: &AccountFilter) -> Result<Vec<FullAccount>, ApiError>;
}

impl<T: AuthApi + ?Sized> AuthApi for std::rc::Rc<T> {
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        (**self).register(request).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<Account, ApiError> {
        (**self).login(email, password).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        (**self).logout().await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), ApiError> {
        (**self).update_profile(update).await
    }

    async fn full_account(&self, email: &str) -> Result<FullAccount, ApiError> {
        (**self).full_account(email).await
    }

    async fn search_accounts(&self, filter: &AccountFilter) -> Result<Vec<FullAccount>, ApiError> {
        (**self).search_accounts(filter).await
    }
}

/// gloo-net backed [`AuthApi`] implementation for real browser sessions.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpApi;

#[cfg(feature = "hydrate")]
impl HttpApi {
    async fn post_json<B, T>(url: &str, body: &B) -> Result<T, ApiError>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        let response = gloo_net::http::Request::post(url)
            .json(body)
            .map_err(|e| ApiError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        if !response.ok() {
            return Err(ApiError::Status(response.status()));
        }
        response.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn post_json_unit<B>(url: &str, body: &B) -> Result<(), ApiError>
    where
        B: serde::Serialize,
    {
        let response = gloo_net::http::Request::post(url)
            .json(body)
            .map_err(|e| ApiError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        if response.ok() {
            Ok(())
        } else {
            Err(ApiError::Status(response.status()))
        }
    }
}

#[cfg(feature = "hydrate")]
impl AuthApi for HttpApi {
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        Self::post_json_unit("/api/v1/accounts/", request).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<Account, ApiError> {
        let body = LoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        Self::post_json("/api/v1/auth/login/", &body).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let response = gloo_net::http::Request::post("/api/v1/auth/logout/")
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        if response.ok() {
            Ok(())
        } else {
            Err(ApiError::Status(response.status()))
        }
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), ApiError> {
        Self::post_json_unit("/api/v1/auth/update-profile/", update).await
    }

    async fn full_account(&self, email: &str) -> Result<FullAccount, ApiError> {
        let body = serde_json::json!({ "email": email });
        Self::post_json("/api/v1/auth/fullaccount/", &body).await
    }

    async fn search_accounts(&self, filter: &AccountFilter) -> Result<Vec<FullAccount>, ApiError> {
        let response = gloo_net::http::Request::get("/api/v1/auth/accounts/")
            .query(filter.query_pairs())
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        if !response.ok() {
            return Err(ApiError::Status(response.status()));
        }
        response
            .json::<Vec<FullAccount>>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(not(feature = "hydrate"))]
impl AuthApi for HttpApi {
    async fn register(&self, _request: &RegisterRequest) -> Result<(), ApiError> {
        Err(ApiError::Unavailable)
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<Account, ApiError> {
        Err(ApiError::Unavailable)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        Err(ApiError::Unavailable)
    }

    async fn update_profile(&self, _update: &ProfileUpdate) -> Result<(), ApiError> {
        Err(ApiError::Unavailable)
    }

    async fn full_account(&self, _email: &str) -> Result<FullAccount, ApiError> {
        Err(ApiError::Unavailable)
    }

    async fn search_accounts(&self, _filter: &AccountFilter) -> Result<Vec<FullAccount>, ApiError> {
        Err(ApiError::Unavailable)
    }
}
