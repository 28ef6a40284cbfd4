use std::{error::Error, fmt::Debug};

use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use crate::{db_interaction::{self, UserInsertError}, domain::UserEmail, utils::{error_fmt_chain, get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug)]
pub struct RegisterRequest{
    user_name: String,
    email: String,
    password: SecretString,
    business_name: String,
    business_description: Option<String>
}

#[derive(Error)]
pub enum RegisterError{
    #[error("{0}")]
    ValidationError(String),
    #[error("user already exists")]
    UserAlreadyExists(#[source] UserInsertError),
    #[error("unexpected error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for RegisterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for RegisterError{
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self {
            RegisterError::ValidationError(_) | RegisterError::UserAlreadyExists(_) => {
                HttpResponse::BadRequest().body(format!("{}", self))
            },
            RegisterError::UnexpectedError(_) => {
                HttpResponse::InternalServerError().body(format!("{}", self))
            }
        }
    }
}

fn validate_registration(form: &RegisterRequest) -> Result<UserEmail, RegisterError> {
    let user_name_length = form.user_name.trim().chars().count();
    if !(4..=64).contains(&user_name_length) {
        return Err(RegisterError::ValidationError(
            "user name must be between 4 and 64 characters".to_string()
        ))
    }

    let password_length = form.password.expose_secret().chars().count();
    if !(4..=32).contains(&password_length) {
        return Err(RegisterError::ValidationError(
            "password must be between 4 and 32 characters".to_string()
        ))
    }

    let business_name_length = form.business_name.trim().chars().count();
    if !(2..=32).contains(&business_name_length) {
        return Err(RegisterError::ValidationError(
            "business name must be between 2 and 32 characters".to_string()
        ))
    }

    UserEmail::parse(form.email.clone()).map_err(RegisterError::ValidationError)
}

// Registration always creates an Owner; cashier accounts only ever come
// from the cashiers endpoint.
#[tracing::instrument(
    "Owner registration started",
    skip(form, pool)
)]
pub async fn register(
    form: web::Json<RegisterRequest>,
    pool: web::Data<DbPool>
) -> Result<HttpResponse, RegisterError> {

    let email = validate_registration(&form)?;

    let conn = get_pooled_connection(&pool)
        .await
        .context("Failed to get connection from pool")?;

    let form = form.into_inner();
    db_interaction::insert_owner(
        conn,
        form.user_name.trim().to_string(),
        email.inner(),
        form.password,
        form.business_name.trim().to_string(),
        form.business_description
    )
    .await
    .map_err(|e| {
        match e {
            UserInsertError::EmailNotUnique(_) => RegisterError::UserAlreadyExists(e),
            UserInsertError::UnexpectedError(_) => RegisterError::UnexpectedError(e.into())
        }
    })?;

    Ok(HttpResponse::Ok().finish())
}
