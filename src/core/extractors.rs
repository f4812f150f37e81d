//! Axum extractors for request bodies and caller identity
//!
//! - [`JsonBody`] reads a JSON body, turning rejections into the service's
//!   error shape instead of axum's plain-text responses
//! - [`Caller`] resolves the request's [`AuthContext`] through the
//!   configured [`AuthProvider`]

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::core::auth::{AuthContext, AuthProvider};
use crate::core::error::{SchoolError, ValidationError};

/// JSON body extractor with service-shaped rejections
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = SchoolError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> SchoolError {
    ValidationError::InvalidJson {
        message: rejection.body_text(),
    }
    .into()
}

/// The resolved caller of the current request
#[derive(Debug, Clone)]
pub struct Caller(pub AuthContext);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
    Arc<dyn AuthProvider>: FromRef<S>,
{
    type Rejection = SchoolError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let provider = Arc::<dyn AuthProvider>::from_ref(state);
        let context = provider.extract_context(&parts.headers).await?;
        Ok(Caller(context))
    }
}
