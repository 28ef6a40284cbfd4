use std::{error::Error, fmt::Debug};

use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{auth::extractors::IsStaff, db_interaction::{self, TransactionCreateError, TransactionItem}, identity::{resolve_owner_scope, IdentityError}, utils::{error_fmt_chain, get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug)]
pub struct CreateTransactionRequest{
    pub payment: String,
    pub items: Vec<TransactionItem>
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TransactionResponse{
    pub transaction_id: Uuid,
    pub is_paid: bool,
    pub payment: String,
    pub code: String,
    pub created_at: DateTime<Utc>
}

#[derive(Error)]
pub enum PostTransactionError{
    #[error("Transaction must have at least one item")]
    EmptyItems,
    #[error("Item quantity must be at least 1")]
    InvalidQuantity,
    #[error("One or more product IDs are invalid or not owned by this user")]
    InvalidProducts(#[source] TransactionCreateError),
    #[error(transparent)]
    IdentityError(#[from] IdentityError),
    #[error("unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for PostTransactionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for PostTransactionError {
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self {
            PostTransactionError::EmptyItems
            | PostTransactionError::InvalidQuantity
            | PostTransactionError::InvalidProducts(_) => {
                HttpResponse::BadRequest().body(format!("{}", self))
            },
            PostTransactionError::IdentityError(e) => e.error_response(),
            PostTransactionError::UnexpectedError(_) => {
                HttpResponse::InternalServerError().body(format!("{}", self))
            }
        }
    }
}

// Cashiers register sales too, so any authenticated staff member may post;
// rows always land under the effective owner id.
#[tracing::instrument(
    "Creating transaction",
    skip(pool, staff)
)]
pub async fn post_transaction(
    pool: web::Data<DbPool>,
    form: web::Json<CreateTransactionRequest>,
    staff: IsStaff
) -> Result<HttpResponse, PostTransactionError> {
    if form.items.is_empty() {
        return Err(PostTransactionError::EmptyItems)
    }

    if form.items.iter().any(|item| item.quantity < 1) {
        return Err(PostTransactionError::InvalidQuantity)
    }

    let conn = get_pooled_connection(&pool)
        .await
        .context("Failed to get connection from pool")?;
    let scope = resolve_owner_scope(conn, staff.0, staff.1).await?;

    let conn = get_pooled_connection(&pool)
        .await
        .context("Failed to get connection from pool")?;

    let form = form.into_inner();
    let transaction = db_interaction::create_transaction(
        conn,
        scope.owner_id,
        form.payment,
        form.items
    )
    .await
    .map_err(|e| {
        match e {
            TransactionCreateError::InvalidProducts => {
                PostTransactionError::InvalidProducts(e)
            },
            _ => PostTransactionError::UnexpectedError(e.into())
        }
    })?;

    Ok(HttpResponse::Ok().json(TransactionResponse{
        transaction_id: transaction.transaction_id,
        is_paid: transaction.is_paid,
        payment: transaction.payment,
        code: transaction.code,
        created_at: transaction.created_at
    }))
}
