use std::{error::Error, fmt::Debug};

use anyhow::Context;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use diesel::{BoolExpressionMethods, Connection, ExpressionMethods, QueryDsl, RunQueryDsl};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{auth::jwt::UserRole, identity::OwnerScope, models::{Transaction, TransactionDetail}, telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, DbConnection}};

// One requested line of a new transaction
#[derive(Deserialize, Debug, Clone)]
pub struct TransactionItem{
    pub product_id: Uuid,
    pub quantity: i32
}

// One line of a stored transaction, priced at read time
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TransactionLine{
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: f64,
    pub discount: f64,
    pub subtotal: f64
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TransactionWithDetails{
    pub transaction_id: Uuid,
    pub code: String,
    pub payment: String,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
    pub total_amount: f64,
    pub details: Vec<TransactionLine>
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortBy{
    Date,
    Amount
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder{
    Asc,
    Desc
}

#[derive(Debug, Clone)]
pub struct TransactionFilter{
    pub search: Option<String>,
    pub is_paid: Option<bool>,
    pub payment: Option<String>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub page: i64,
    pub page_size: i64
}

fn generate_transaction_code() -> String {
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();

    format!("TRX-{}", suffix.to_uppercase())
}

// Error associated with creating a transaction with its detail lines
#[derive(Error)]
pub enum TransactionCreateError{
    #[error("One or more product IDs are invalid or not owned by this user")]
    InvalidProducts,
    #[error("Failed due to threadpool error")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error)
}

impl Debug for TransactionCreateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

// Parent row and every detail line commit as one unit; any invalid product
// reference aborts the whole insert.
#[tracing::instrument(
    "Creating transaction with detail lines",
    skip_all
)]
pub async fn create_transaction(
    mut conn: DbConnection,
    owner_id: Uuid,
    payment: String,
    items: Vec<TransactionItem>
) -> Result<Transaction, TransactionCreateError> {

    let ret = spawn_blocking_with_tracing(move || {
        use crate::schema::products;
        use crate::schema::transaction_details;
        use crate::schema::transactions;

        conn.transaction::<Transaction, TransactionCreateError, _>(|conn|{
            let mut requested_ids: Vec<Uuid> = items.iter()
                .map(|item| item.product_id)
                .collect();
            requested_ids.sort();
            requested_ids.dedup();

            let owned_ids: Vec<Uuid> = products::table
                .select(products::product_id)
                .filter(
                    products::user_id.eq(owner_id)
                        .and(products::product_id.eq_any(&requested_ids))
                )
                .load::<Uuid>(conn)?;

            if owned_ids.len() != requested_ids.len() {
                return Err(TransactionCreateError::InvalidProducts)
            }

            let transaction = Transaction{
                transaction_id: Uuid::new_v4(),
                user_id: owner_id,
                is_paid: false,
                payment,
                code: generate_transaction_code(),
                is_deleted: false,
                created_at: Utc::now(),
                updated_at: None
            };

            diesel::insert_into(transactions::table)
                .values(&transaction)
                .execute(conn)?;

            for item in items.iter(){
                let detail = TransactionDetail{
                    transaction_detail_id: Uuid::new_v4(),
                    transaction_id: transaction.transaction_id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    created_at: Utc::now(),
                    updated_at: None
                };

                diesel::insert_into(transaction_details::table)
                    .values(detail)
                    .execute(conn)?;
            }

            Ok(transaction)
        })
    })
    .await??;

    Ok(ret)
}

// Inclusive start of the current UTC calendar day and exclusive start of
// the next one; cashiers only ever see this window.
fn current_day_bounds() -> (DateTime<Utc>, DateTime<Utc>) {
    let day_start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
    (day_start, day_start + Duration::days(1))
}

fn load_transaction_lines(
    conn: &mut DbConnection,
    target_transaction_id: Uuid
) -> Result<Vec<TransactionLine>, diesel::result::Error> {
    use crate::schema::products;
    use crate::schema::transaction_details;

    let rows: Vec<(Uuid, String, i32, f64, f64)> = transaction_details::table
        .inner_join(products::table)
        .filter(transaction_details::transaction_id.eq(target_transaction_id))
        .select((
            transaction_details::product_id,
            products::name,
            transaction_details::quantity,
            products::price,
            products::discount,
        ))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(product_id, product_name, quantity, price, discount)| TransactionLine {
            product_id,
            product_name,
            quantity,
            price,
            discount,
            subtotal: quantity as f64 * (price - discount),
        })
        .collect())
}

fn assemble_with_details(
    conn: &mut DbConnection,
    transaction: Transaction
) -> Result<TransactionWithDetails, diesel::result::Error> {
    let details = load_transaction_lines(conn, transaction.transaction_id)?;
    let total_amount = details.iter().map(|line| line.subtotal).sum();

    Ok(TransactionWithDetails{
        transaction_id: transaction.transaction_id,
        code: transaction.code,
        payment: transaction.payment,
        is_paid: transaction.is_paid,
        created_at: transaction.created_at,
        total_amount,
        details
    })
}

fn matches_search(transaction: &TransactionWithDetails, search: &str) -> bool {
    let needle = search.to_lowercase();

    transaction.transaction_id.to_string().to_lowercase().contains(&needle)
        || transaction.payment.to_lowercase().contains(&needle)
        || transaction
            .details
            .iter()
            .any(|line| line.product_name.to_lowercase().contains(&needle))
}

#[tracing::instrument(
    "Getting transactions with detail lines",
    skip_all
)]
pub async fn list_transactions(
    mut conn: DbConnection,
    scope: OwnerScope,
    filter: TransactionFilter
) -> Result<Vec<TransactionWithDetails>, anyhow::Error> {

    let res = spawn_blocking_with_tracing(move || {
        use crate::schema::transactions;

        conn.transaction::<Vec<TransactionWithDetails>, anyhow::Error, _>(|conn|{
            let mut query = transactions::table
                .filter(
                    transactions::user_id.eq(scope.owner_id)
                        .and(transactions::is_deleted.eq(false))
                )
                .into_boxed();

            // Cashiers are limited to transactions created today (UTC)
            if scope.role == UserRole::Cashier {
                let (day_start, day_end) = current_day_bounds();
                query = query.filter(
                    transactions::created_at.ge(day_start)
                        .and(transactions::created_at.lt(day_end))
                );
            }

            if let Some(is_paid) = filter.is_paid {
                query = query.filter(transactions::is_paid.eq(is_paid));
            }

            if let Some(payment) = filter.payment.clone() {
                query = query.filter(transactions::payment.eq(payment));
            }

            query = match filter.sort_order {
                SortOrder::Asc => query.order(transactions::created_at.asc()),
                SortOrder::Desc => query.order(transactions::created_at.desc())
            };

            let rows = query
                .load::<Transaction>(conn)
                .context("Failed to load transactions")?;

            let mut ret: Vec<TransactionWithDetails> = Vec::new();
            for transaction in rows {
                ret.push(assemble_with_details(conn, transaction)?);
            }

            if let Some(search) = filter.search.as_deref() {
                if !search.trim().is_empty() {
                    ret.retain(|transaction| matches_search(transaction, search.trim()));
                }
            }

            if filter.sort_by == SortBy::Amount {
                match filter.sort_order {
                    SortOrder::Asc => {
                        ret.sort_by(|a, b| a.total_amount.total_cmp(&b.total_amount))
                    },
                    SortOrder::Desc => {
                        ret.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount))
                    }
                }
            }

            let offset = (filter.page.max(1) - 1) * filter.page_size;
            let ret = ret
                .into_iter()
                .skip(offset.max(0) as usize)
                .take(filter.page_size.max(0) as usize)
                .collect();

            Ok(ret)
        })
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

// Error associated with reading a single transaction
#[derive(Error)]
pub enum TransactionGetError{
    #[error("transaction not found")]
    NotFound,
    #[error("Failed due to threadpool error")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error)
}

impl Debug for TransactionGetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Getting transaction by id with detail lines",
    skip(conn)
)]
pub async fn get_transaction(
    mut conn: DbConnection,
    scope: OwnerScope,
    target_transaction_id: Uuid
) -> Result<TransactionWithDetails, TransactionGetError> {

    let res = spawn_blocking_with_tracing(move || {
        use crate::schema::transactions;

        conn.transaction::<Option<TransactionWithDetails>, diesel::result::Error, _>(|conn|{
            let mut query = transactions::table
                .filter(
                    transactions::transaction_id.eq(target_transaction_id)
                        .and(transactions::user_id.eq(scope.owner_id))
                        .and(transactions::is_deleted.eq(false))
                )
                .into_boxed();

            if scope.role == UserRole::Cashier {
                let (day_start, day_end) = current_day_bounds();
                query = query.filter(
                    transactions::created_at.ge(day_start)
                        .and(transactions::created_at.lt(day_end))
                );
            }

            let transaction: Vec<Transaction> = query.load::<Transaction>(conn)?;

            match transaction.into_iter().next() {
                Some(transaction) => Ok(Some(assemble_with_details(conn, transaction)?)),
                None => Ok(None)
            }
        })
    })
    .await??;

    res.ok_or(TransactionGetError::NotFound)
}

// Error associated with deleting a transaction
#[derive(Error)]
pub enum TransactionDeleteError{
    #[error("transaction not found")]
    NotFound,
    #[error("Failed due to threadpool error")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error)
}

impl Debug for TransactionDeleteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

// Ownership is checked before anything is removed; detail rows go first,
// then the parent, all inside one transaction.
#[tracing::instrument(
    "Deleting transaction with detail lines",
    skip(conn)
)]
pub async fn delete_transaction(
    mut conn: DbConnection,
    owner_id: Uuid,
    target_transaction_id: Uuid
) -> Result<(), TransactionDeleteError> {

    spawn_blocking_with_tracing(move || {
        use crate::schema::transaction_details;
        use crate::schema::transactions;

        conn.transaction::<(), TransactionDeleteError, _>(|conn|{
            let owned: i64 = transactions::table
                .filter(
                    transactions::transaction_id.eq(target_transaction_id)
                        .and(transactions::user_id.eq(owner_id))
                )
                .count()
                .get_result::<i64>(conn)?;

            if owned == 0 {
                return Err(TransactionDeleteError::NotFound)
            }

            diesel::delete(
                    transaction_details::table
                        .filter(transaction_details::transaction_id.eq(target_transaction_id))
                )
                .execute(conn)?;

            diesel::delete(
                    transactions::table
                        .filter(transactions::transaction_id.eq(target_transaction_id))
                )
                .execute(conn)?;

            Ok(())
        })
    })
    .await??;

    Ok(())
}
