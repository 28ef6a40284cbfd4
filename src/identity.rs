use std::{error::Error, fmt::Debug};

use actix_web::{HttpResponse, ResponseError};
use anyhow::Context;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};
use thiserror::Error;
use uuid::Uuid;

use crate::{auth::jwt::UserRole, telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, DbConnection}};

// The owner scope every query is filtered by. For an Owner it is their own
// id, for a Cashier it is the stored owner link.
#[derive(Debug, Clone, Copy)]
pub struct OwnerScope{
    pub user_id: Uuid,
    pub owner_id: Uuid,
    pub role: UserRole
}

#[derive(Error)]
pub enum IdentityError{
    #[error("account no longer exists")]
    UnknownUser,
    #[error("cashier account has no owner link")]
    MissingOwnerLink,
    #[error("unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for IdentityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for IdentityError {
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self {
            // Never leak which part of the identity lookup failed
            IdentityError::UnknownUser | IdentityError::MissingOwnerLink => {
                HttpResponse::Unauthorized().body("Invalid token")
            },
            IdentityError::UnexpectedError(_) => {
                HttpResponse::InternalServerError().body(format!("{}", self))
            }
        }
    }
}

#[tracing::instrument(
    "Resolving effective owner scope",
    skip(conn)
)]
pub async fn resolve_owner_scope(
    mut conn: DbConnection,
    user_id: Uuid,
    role: UserRole
) -> Result<OwnerScope, IdentityError> {

    let stored_owner_id: Option<Option<Uuid>> = spawn_blocking_with_tracing(move || {
        use crate::schema::users;

        users::table
            .select(users::owner_id)
            .filter(users::user_id.eq(user_id))
            .first::<Option<Uuid>>(&mut conn)
            .optional()
    })
    .await
    .context("Failed due to threadpool error")
    .map_err(IdentityError::UnexpectedError)?
    .context("Failed to look up user record")
    .map_err(IdentityError::UnexpectedError)?;

    let stored_owner_id = match stored_owner_id {
        Some(owner_id) => owner_id,
        None => return Err(IdentityError::UnknownUser)
    };

    let owner_id = match role {
        UserRole::Owner => user_id,
        UserRole::Cashier => stored_owner_id.ok_or(IdentityError::MissingOwnerLink)?
    };

    Ok(OwnerScope{ user_id, owner_id, role })
}
