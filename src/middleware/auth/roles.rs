//! Role gate: `require_roles(Role::holding(Capability::DeleteUsers))` -> middleware.
//!
//! access middleware の後ろで使う前提 (AuthCtx が extensions に無ければ 401)。

use std::{future::Future, pin::Pin, sync::Arc};

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::authz::Role;

type GateFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Build a middleware fn for `axum::middleware::from_fn`.
///
/// ```ignore
/// delete(delete_user.layer(middleware::from_fn(require_roles(
///     Role::holding(Capability::DeleteUsers),
/// ))))
/// ```
pub fn require_roles(
    allowed: impl Into<Arc<[Role]>>,
) -> impl Fn(Request, Next) -> GateFuture + Clone + Send + Sync + 'static {
    let allowed: Arc<[Role]> = allowed.into();

    move |req: Request, next: Next| {
        let decision = authorize_roles(req.extensions().get::<AuthCtx>(), &allowed);
        Box::pin(async move {
            match decision {
                Ok(()) => next.run(req).await,
                Err(err) => err.into_response(),
            }
        })
    }
}

pub fn authorize_roles(ctx: Option<&AuthCtx>, allowed: &[Role]) -> Result<(), AppError> {
    let ctx = ctx.ok_or(AppError::Unauthorized(AppError::AUTH_REQUIRED))?;

    if !allowed.contains(&ctx.role) {
        tracing::info!(
            user_id = ctx.user_id,
            role = %ctx.role,
            "insufficient role"
        );
        return Err(AppError::Forbidden(AppError::INSUFFICIENT_PERMISSIONS));
    }

    Ok(())
}
