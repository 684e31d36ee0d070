//! Forwarding pipeline handler

use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use crate::api::server::AppState;
use crate::error::WxrError;
use crate::proxy::ForwardParams;

impl From<QueryRejection> for WxrError {
    fn from(rejection: QueryRejection) -> Self {
        WxrError::InvalidRequest(rejection.body_text())
    }
}

/// Forward a request to the target named in the query string
pub async fn forward(
    State(state): State<AppState>,
    params: Result<Query<ForwardParams>, QueryRejection>,
    req: Request<Body>,
) -> Result<Response, WxrError> {
    let Query(params) = params.map_err(|rejection| {
        warn!(status = %rejection.status(), "Rejected forwarding query");
        WxrError::from(rejection)
    })?;

    match state.proxy.handle(&params, req).await {
        Ok(response) => Ok(response.into_response()),
        Err(e) => {
            error!(error = %e, "Forwarding failed");
            Err(e)
        }
    }
}
