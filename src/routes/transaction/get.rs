use actix_web::{error::{ErrorInternalServerError, ErrorNotFound}, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::extractors::IsStaff, db_interaction::{self, SortBy, SortOrder, TransactionFilter, TransactionGetError}, identity::resolve_owner_scope, utils::{get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug)]
pub struct GetTransactionsQuery{
    pub search: Option<String>,
    pub is_paid: Option<bool>,
    pub payment: Option<String>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<i64>,
    pub page_size: Option<i64>
}

#[tracing::instrument(
    "Getting list of transactions",
    skip(pool, staff)
)]
pub async fn get_transactions(
    pool: web::Data<DbPool>,
    query: web::Query<GetTransactionsQuery>,
    staff: IsStaff
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;
    let scope = resolve_owner_scope(conn, staff.0, staff.1).await?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let query = query.into_inner();
    let filter = TransactionFilter{
        search: query.search,
        is_paid: query.is_paid,
        payment: query.payment,
        sort_by: query.sort_by.unwrap_or(SortBy::Date),
        // Newest first unless the caller asks otherwise
        sort_order: query.sort_order.unwrap_or(SortOrder::Desc),
        page: query.page.unwrap_or(1),
        page_size: query.page_size.unwrap_or(10)
    };

    let transactions = db_interaction::list_transactions(conn, scope, filter)
        .await
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(transactions))
}

#[tracing::instrument(
    "Getting transaction by id",
    skip(pool, staff)
)]
pub async fn get_transaction(
    pool: web::Data<DbPool>,
    transaction_id: web::Path<Uuid>,
    staff: IsStaff
) -> Result<HttpResponse, actix_web::Error> {
    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;
    let scope = resolve_owner_scope(conn, staff.0, staff.1).await?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let transaction = db_interaction::get_transaction(conn, scope, transaction_id.into_inner())
        .await
        .map_err(|e| {
            match e {
                TransactionGetError::NotFound => ErrorNotFound("Transaction not found"),
                _ => ErrorInternalServerError(e)
            }
        })?;

    Ok(HttpResponse::Ok().json(transaction))
}
