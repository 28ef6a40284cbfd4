use std::{error::Error, fmt::Debug};

use anyhow::Context;
use chrono::Utc;
use diesel::{ExpressionMethods, QueryDsl, QueryResult, RunQueryDsl};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use uuid::Uuid;

use crate::{auth::jwt::UserRole, models::User, password::compute_password_hash, telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, DbConnection}};

// Function to query user from email id
pub async fn get_user_from_email(
    mut conn: DbConnection,
    email_string: String
) -> Result<QueryResult<User>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        use crate::schema::users;

        let res: QueryResult<User> = users::table
            .filter(users::email.eq(email_string))
            .get_result::<User>(&mut conn);

        res
    })
    .await
    .context("Failed due to threadpool error")?;

    Ok(res)
}

// Error associated with inserting an owner account
#[derive(Error)]
pub enum UserInsertError{
    #[error("email field is not unique")]
    EmailNotUnique(#[from] diesel::result::Error),
    #[error("unexpected database / hashing error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for UserInsertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Inserting owner account into the database",
    skip(conn, password)
)]
pub async fn insert_owner(
    mut conn: DbConnection,
    user_name: String,
    email: String,
    password: SecretString,
    business_name: String,
    business_description: Option<String>
) -> Result<Uuid, UserInsertError> {

    let password_hash = spawn_blocking_with_tracing(move || {
        compute_password_hash(password)
    })
    .await
    .context("Failed due to threadpool error")
    .map_err(UserInsertError::UnexpectedError)?
    .map_err(UserInsertError::UnexpectedError)?;

    let uid = Uuid::new_v4();
    let user = User{
        user_id: uid,
        user_name,
        email,
        password: password_hash.expose_secret().to_string(),
        business_name,
        business_description,
        role: UserRole::Owner.as_str().to_string(),
        owner_id: None,
        is_deactivated: false,
        is_deleted: false,
        created_at: Utc::now(),
        updated_at: None
    };

    spawn_blocking_with_tracing(move || {
        use crate::schema::users;

        diesel::insert_into(users::table)
            .values(user)
            .execute(&mut conn)
            .map_err(|e|{
                match e {
                    diesel::result::Error::DatabaseError(
                        diesel::result::DatabaseErrorKind::UniqueViolation,
                        ref _a
                    ) => {
                        UserInsertError::EmailNotUnique(e)
                    },

                    _ => UserInsertError::UnexpectedError(anyhow::anyhow!("Unexpected diesel / database error"))
                }
            })
    })
    .await
    .context("Failed due to threadpool error")
    .map_err(UserInsertError::UnexpectedError)??;

    Ok(uid)
}
