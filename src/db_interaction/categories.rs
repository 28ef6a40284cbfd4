use std::{error::Error, fmt::Debug};

use anyhow::Context;
use chrono::{DateTime, Utc};
use diesel::{AsChangeset, BoolExpressionMethods, Connection, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};
use thiserror::Error;
use uuid::Uuid;

use crate::{models::Category, telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, DbConnection}};

#[tracing::instrument(
    "Getting categories for owner",
    skip(conn)
)]
pub async fn get_categories(
    mut conn: DbConnection,
    owner_id: Uuid
) -> Result<Vec<Category>, anyhow::Error>{
    let res = spawn_blocking_with_tracing(move || {
        use crate::schema::categories;

        categories::table
            .filter(categories::user_id.eq(owner_id))
            .order(categories::created_at.asc())
            .load::<Category>(&mut conn)
            .context("Failed to load categories")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

// Error associated with inserting a category
#[derive(Error)]
pub enum CategoryInsertError{
    #[error("category name already exists")]
    DuplicateName(#[source] diesel::result::Error),
    #[error("Failed due to threadpool error")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error)
}

impl Debug for CategoryInsertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Inserting category into the database",
    skip(conn)
)]
pub async fn insert_category(
    mut conn: DbConnection,
    owner_id: Uuid,
    name: String,
    description: Option<String>
) -> Result<Category, CategoryInsertError> {

    let category = Category{
        category_id: Uuid::new_v4(),
        user_id: owner_id,
        name,
        description,
        created_at: Utc::now(),
        updated_at: None
    };

    let res = spawn_blocking_with_tracing(move || {
        use crate::schema::categories;

        diesel::insert_into(categories::table)
            .values(&category)
            .get_result::<Category>(&mut conn)
            .map_err(|e|{
                match e {
                    diesel::result::Error::DatabaseError(
                        diesel::result::DatabaseErrorKind::UniqueViolation,
                        _
                    ) => CategoryInsertError::DuplicateName(e),
                    _ => CategoryInsertError::RunQueryError(e)
                }
            })
    })
    .await??;

    Ok(res)
}

// Only fields carried by the request overwrite stored values
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::categories)]
pub struct CategoryChanges{
    pub name: Option<String>,
    pub description: Option<String>,
    pub updated_at: Option<DateTime<Utc>>
}

// Error associated with updating a category
#[derive(Error)]
pub enum CategoryUpdateError{
    #[error("category not found")]
    NotFound,
    #[error("category name already exists")]
    DuplicateName(#[source] diesel::result::Error),
    #[error("Failed due to threadpool error")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error)
}

impl Debug for CategoryUpdateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Updating category in the database",
    skip(conn, changes)
)]
pub async fn update_category(
    mut conn: DbConnection,
    owner_id: Uuid,
    category_id: Uuid,
    changes: CategoryChanges
) -> Result<Category, CategoryUpdateError> {

    let res = spawn_blocking_with_tracing(move || {
        use crate::schema::categories;

        diesel::update(
                categories::table.filter(
                    categories::category_id.eq(category_id)
                        .and(categories::user_id.eq(owner_id))
                )
            )
            .set(changes)
            .get_result::<Category>(&mut conn)
            .optional()
            .map_err(|e|{
                match e {
                    diesel::result::Error::DatabaseError(
                        diesel::result::DatabaseErrorKind::UniqueViolation,
                        _
                    ) => CategoryUpdateError::DuplicateName(e),
                    _ => CategoryUpdateError::RunQueryError(e)
                }
            })
    })
    .await??;

    res.ok_or(CategoryUpdateError::NotFound)
}

// Error associated with deleting a category
#[derive(Error)]
pub enum CategoryDeleteError{
    #[error("category not found")]
    NotFound,
    #[error("Cannot delete category with associated products")]
    HasProducts,
    #[error("Failed due to threadpool error")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error)
}

impl Debug for CategoryDeleteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Deleting category from the database",
    skip(conn)
)]
pub async fn delete_category(
    mut conn: DbConnection,
    owner_id: Uuid,
    category_id: Uuid
) -> Result<(), CategoryDeleteError> {

    spawn_blocking_with_tracing(move || {
        use crate::schema::categories;
        use crate::schema::products;

        conn.transaction::<(), CategoryDeleteError, _>(|conn| {
            let existing: i64 = categories::table
                .filter(
                    categories::category_id.eq(category_id)
                        .and(categories::user_id.eq(owner_id))
                )
                .count()
                .get_result::<i64>(conn)?;

            if existing == 0 {
                return Err(CategoryDeleteError::NotFound)
            }

            let referencing_products: i64 = products::table
                .filter(products::category_id.eq(category_id))
                .count()
                .get_result::<i64>(conn)?;

            if referencing_products > 0 {
                return Err(CategoryDeleteError::HasProducts)
            }

            diesel::delete(
                    categories::table.filter(categories::category_id.eq(category_id))
                )
                .execute(conn)?;

            Ok(())
        })
    })
    .await??;

    Ok(())
}
