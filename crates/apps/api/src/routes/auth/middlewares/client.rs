use crate::api_state::ApiContext;
use crate::auth::middlewares::common::{extract_context, extract_token};
use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
};
use common_services::api::auth::error::AuthError;
use common_services::api::auth::interfaces::AuthRole;
use common_services::api::auth::token::decode_token;
use common_services::database::client::Client;
use common_services::database::client_store::ClientStore;

/// The authenticated client. Also inserted into request extensions.
#[derive(Clone, Debug)]
pub struct ApiClient(pub Client);

impl<S> FromRequestParts<S> for ApiClient
where
    S: Send + Sync,
    State<ApiContext>: FromRequestParts<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;
        let context = extract_context(parts, state).await?;
        let claims = decode_token(&token, &context.settings.secrets.jwt)?;
        if claims.role != AuthRole::Client {
            return Err(AuthError::PermissionDenied {
                subject: format!("{} {}", claims.role, claims.sub),
                path: parts.uri.to_string(),
            });
        }

        let client = ClientStore::find_by_id(&context.pool, claims.sub)
            .await?
            .ok_or(AuthError::ClientNotFound)?;
        parts.extensions.insert(client.clone());
        Ok(Self(client))
    }
}
