use std::{error::Error, fmt::Debug};

use anyhow::Context;
use chrono::{DateTime, Utc};
use diesel::{AsChangeset, BoolExpressionMethods, Connection, ExpressionMethods, NullableExpressionMethods, OptionalExtension, PgTextExpressionMethods, QueryDsl, RunQueryDsl};
use thiserror::Error;
use uuid::Uuid;

use crate::{models::Product, telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, DbConnection}};

// A product together with its denormalized category name
pub type ProductWithCategory = (Product, Option<String>);

#[tracing::instrument(
    "Getting products for owner",
    skip(conn)
)]
pub async fn get_products(
    mut conn: DbConnection,
    owner_id: Uuid,
    search: Option<String>,
    category_id: Option<Uuid>
) -> Result<Vec<ProductWithCategory>, anyhow::Error>{

    let res = spawn_blocking_with_tracing(move || {
        use crate::schema::categories;
        use crate::schema::products;

        let mut query = products::table
            .left_join(categories::table)
            .select((products::all_columns, categories::name.nullable()))
            .filter(products::user_id.eq(owner_id))
            .into_boxed();

        if let Some(category_id) = category_id {
            query = query.filter(products::category_id.eq(category_id));
        }

        if let Some(search) = search {
            let pattern = format!("%{}%", search);
            query = query.filter(
                products::name.ilike(pattern.clone())
                    .or(products::description.ilike(pattern))
            );
        }

        query
            .order(products::created_at.asc())
            .load::<ProductWithCategory>(&mut conn)
            .context("Failed to load products")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

pub struct NewProductData{
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub discount: f64,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>
}

// Error associated with inserting a product
#[derive(Error)]
pub enum ProductInsertError{
    #[error("Failed due to threadpool error")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error)
}

impl Debug for ProductInsertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

// A category id that does not resolve within the owner scope is stored as
// NULL, keeping the handler behavior and the SET NULL constraint in
// agreement.
#[tracing::instrument(
    "Inserting product into the database",
    skip(conn, data)
)]
pub async fn insert_product(
    mut conn: DbConnection,
    owner_id: Uuid,
    data: NewProductData
) -> Result<ProductWithCategory, ProductInsertError> {

    let res = spawn_blocking_with_tracing(move || {
        use crate::schema::categories;
        use crate::schema::products;

        conn.transaction::<ProductWithCategory, diesel::result::Error, _>(|conn| {
            let category: Option<(Uuid, String)> = match data.category_id {
                Some(category_id) => {
                    categories::table
                        .select((categories::category_id, categories::name))
                        .filter(
                            categories::category_id.eq(category_id)
                                .and(categories::user_id.eq(owner_id))
                        )
                        .first::<(Uuid, String)>(conn)
                        .optional()?
                },
                None => None
            };

            let product = Product{
                product_id: Uuid::new_v4(),
                user_id: owner_id,
                name: data.name,
                description: data.description,
                price: data.price,
                discount: data.discount,
                category_id: category.as_ref().map(|(id, _)| *id),
                image_url: data.image_url,
                created_at: Utc::now(),
                updated_at: None
            };

            let inserted = diesel::insert_into(products::table)
                .values(&product)
                .get_result::<Product>(conn)?;

            Ok((inserted, category.map(|(_, name)| name)))
        })
    })
    .await??;

    Ok(res)
}

// Only fields carried by the request overwrite stored values; the category
// link is resolved separately because it needs an ownership check.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::products)]
pub struct ProductChanges{
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub discount: Option<f64>,
    pub category_id: Option<Option<Uuid>>,
    pub image_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>
}

// Error associated with updating a product
#[derive(Error)]
pub enum ProductUpdateError{
    #[error("product not found")]
    NotFound,
    #[error("Failed due to threadpool error")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error)
}

impl Debug for ProductUpdateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Updating product in the database",
    skip(conn, changes)
)]
pub async fn update_product(
    mut conn: DbConnection,
    owner_id: Uuid,
    product_id: Uuid,
    requested_category: Option<Uuid>,
    mut changes: ProductChanges
) -> Result<ProductWithCategory, ProductUpdateError> {

    let res = spawn_blocking_with_tracing(move || {
        use crate::schema::categories;
        use crate::schema::products;

        conn.transaction::<Option<ProductWithCategory>, diesel::result::Error, _>(|conn| {
            if let Some(category_id) = requested_category {
                let resolved: Option<Uuid> = categories::table
                    .select(categories::category_id)
                    .filter(
                        categories::category_id.eq(category_id)
                            .and(categories::user_id.eq(owner_id))
                    )
                    .first::<Uuid>(conn)
                    .optional()?;

                changes.category_id = Some(resolved);
            }

            let updated: Option<Product> = diesel::update(
                    products::table.filter(
                        products::product_id.eq(product_id)
                            .and(products::user_id.eq(owner_id))
                    )
                )
                .set(changes)
                .get_result::<Product>(conn)
                .optional()?;

            let updated = match updated {
                Some(product) => product,
                None => return Ok(None)
            };

            let category_name: Option<String> = match updated.category_id {
                Some(category_id) => {
                    categories::table
                        .select(categories::name)
                        .filter(categories::category_id.eq(category_id))
                        .first::<String>(conn)
                        .optional()?
                },
                None => None
            };

            Ok(Some((updated, category_name)))
        })
    })
    .await??;

    res.ok_or(ProductUpdateError::NotFound)
}

// Error associated with deleting a product
#[derive(Error)]
pub enum ProductDeleteError{
    #[error("product not found")]
    NotFound,
    #[error("Failed due to threadpool error")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error)
}

impl Debug for ProductDeleteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

// Associated transaction detail rows are removed by the store-level cascade.
#[tracing::instrument(
    "Deleting product from the database",
    skip(conn)
)]
pub async fn delete_product(
    mut conn: DbConnection,
    owner_id: Uuid,
    product_id: Uuid
) -> Result<(), ProductDeleteError> {

    let affected_rows = spawn_blocking_with_tracing(move || {
        use crate::schema::products;

        diesel::delete(
                products::table.filter(
                    products::product_id.eq(product_id)
                        .and(products::user_id.eq(owner_id))
                )
            )
            .execute(&mut conn)
    })
    .await??;

    if affected_rows == 0 {
        return Err(ProductDeleteError::NotFound)
    }

    Ok(())
}
