use std::{error::Error, fmt::Debug};

use anyhow::Context;
use chrono::{DateTime, Utc};
use diesel::{AsChangeset, BoolExpressionMethods, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use uuid::Uuid;

use crate::{auth::jwt::UserRole, models::User, password::compute_password_hash, telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, DbConnection}};

#[tracing::instrument(
    "Getting cashiers for owner",
    skip(conn)
)]
pub async fn get_cashiers(
    mut conn: DbConnection,
    owner_id: Uuid
) -> Result<Vec<User>, anyhow::Error>{
    let res = spawn_blocking_with_tracing(move || {
        use crate::schema::users;

        users::table
            .filter(
                users::role.eq(UserRole::Cashier.as_str())
                    .and(users::owner_id.eq(owner_id))
            )
            .order(users::created_at.asc())
            .load::<User>(&mut conn)
            .context("Failed to load cashiers")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

// Error associated with inserting a cashier account
#[derive(Error)]
pub enum CashierInsertError{
    #[error("email field is not unique")]
    EmailNotUnique(#[source] diesel::result::Error),
    #[error("unexpected database / hashing error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for CashierInsertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

// Role and owner link are forced server side; whatever the client sent for
// either is ignored by the caller before we get here.
#[tracing::instrument(
    "Inserting cashier account into the database",
    skip(conn, password)
)]
pub async fn insert_cashier(
    mut conn: DbConnection,
    owner_id: Uuid,
    user_name: String,
    email: String,
    password: SecretString
) -> Result<User, CashierInsertError> {

    let password_hash = spawn_blocking_with_tracing(move || {
        compute_password_hash(password)
    })
    .await
    .context("Failed due to threadpool error")
    .map_err(CashierInsertError::UnexpectedError)?
    .map_err(CashierInsertError::UnexpectedError)?;

    let cashier = User{
        user_id: Uuid::new_v4(),
        user_name,
        email,
        password: password_hash.expose_secret().to_string(),
        business_name: String::new(),
        business_description: None,
        role: UserRole::Cashier.as_str().to_string(),
        owner_id: Some(owner_id),
        is_deactivated: false,
        is_deleted: false,
        created_at: Utc::now(),
        updated_at: None
    };

    let res = spawn_blocking_with_tracing(move || {
        use crate::schema::users;

        diesel::insert_into(users::table)
            .values(&cashier)
            .get_result::<User>(&mut conn)
            .map_err(|e|{
                match e {
                    diesel::result::Error::DatabaseError(
                        diesel::result::DatabaseErrorKind::UniqueViolation,
                        _
                    ) => CashierInsertError::EmailNotUnique(e),
                    _ => CashierInsertError::UnexpectedError(anyhow::anyhow!("Unexpected diesel / database error"))
                }
            })
    })
    .await
    .context("Failed due to threadpool error")
    .map_err(CashierInsertError::UnexpectedError)??;

    Ok(res)
}

// Only username, email, password and the deactivation flag can change;
// role and owner link are not part of the changeset at all.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::users)]
pub struct CashierChanges{
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_deactivated: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>
}

// Error associated with updating a cashier account
#[derive(Error)]
pub enum CashierUpdateError{
    #[error("Cashier not found or not owned by you")]
    NotFound,
    #[error("email field is not unique")]
    EmailNotUnique(#[source] diesel::result::Error),
    #[error("Failed due to threadpool error")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error)
}

impl Debug for CashierUpdateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Updating cashier account in the database",
    skip(conn, changes)
)]
pub async fn update_cashier(
    mut conn: DbConnection,
    owner_id: Uuid,
    cashier_id: Uuid,
    changes: CashierChanges
) -> Result<User, CashierUpdateError> {

    let res = spawn_blocking_with_tracing(move || {
        use crate::schema::users;

        diesel::update(
                users::table.filter(
                    users::user_id.eq(cashier_id)
                        .and(users::owner_id.eq(owner_id))
                        .and(users::role.eq(UserRole::Cashier.as_str()))
                )
            )
            .set(changes)
            .get_result::<User>(&mut conn)
            .optional()
            .map_err(|e|{
                match e {
                    diesel::result::Error::DatabaseError(
                        diesel::result::DatabaseErrorKind::UniqueViolation,
                        _
                    ) => CashierUpdateError::EmailNotUnique(e),
                    _ => CashierUpdateError::RunQueryError(e)
                }
            })
    })
    .await??;

    res.ok_or(CashierUpdateError::NotFound)
}

// Error associated with deleting a cashier account
#[derive(Error)]
pub enum CashierDeleteError{
    #[error("Cashier not found or not owned by you")]
    NotFound,
    #[error("Failed due to threadpool error")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error)
}

impl Debug for CashierDeleteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Deleting cashier account from the database",
    skip(conn)
)]
pub async fn delete_cashier(
    mut conn: DbConnection,
    owner_id: Uuid,
    cashier_id: Uuid
) -> Result<(), CashierDeleteError> {

    let affected_rows = spawn_blocking_with_tracing(move || {
        use crate::schema::users;

        diesel::delete(
                users::table.filter(
                    users::user_id.eq(cashier_id)
                        .and(users::owner_id.eq(owner_id))
                        .and(users::role.eq(UserRole::Cashier.as_str()))
                )
            )
            .execute(&mut conn)
    })
    .await??;

    if affected_rows == 0 {
        return Err(CashierDeleteError::NotFound)
    }

    Ok(())
}
