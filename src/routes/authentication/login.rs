use actix_web::{error::{ErrorBadRequest, ErrorInternalServerError, ErrorUnauthorized}, web, HttpResponse};
use anyhow::Context;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::{auth::jwt::{Tokenizer, UserRole}, db_interaction, domain::UserEmail, password::verify_password, utils::{get_pooled_connection, DbPool}};

#[derive(Deserialize, Debug)]
pub struct LoginRequest{
    pub email: String,
    pub password: SecretString
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse{
    pub access_token: String,
    pub email: String,
    pub role: String
}

#[tracing::instrument(
    "Logging in user",
    skip(pool, tokenizer, form)
)]
pub async fn login(
    pool: web::Data<DbPool>,
    tokenizer: web::Data<Tokenizer>,
    form: web::Json<LoginRequest>
) -> Result<HttpResponse, actix_web::Error>{
    let email = UserEmail::parse(form.0.email)
                    .map_err(ErrorBadRequest)?;

    let conn = get_pooled_connection(&pool)
        .await
        .map_err(ErrorInternalServerError)?;

    let user = match db_interaction::get_user_from_email(conn, email.inner())
        .await
        .map_err(ErrorInternalServerError)?
    {
        Ok(user) => user,
        Err(diesel::result::Error::NotFound) => {
            return Err(ErrorBadRequest("No user registered with this email"))
        },
        Err(e) => {
            tracing::error!("{:?}", e);
            return Err(ErrorInternalServerError("Failed to login"))
        }
    };

    let password_matches = verify_password(form.0.password, user.password.clone())
        .await
        .map_err(ErrorInternalServerError)?;

    if !password_matches {
        tracing::info!("Passwords did not match");
        return Err(ErrorUnauthorized("Email or password is incorrect"))
    }

    let role = UserRole::parse(&user.role)
        .context("Stored user role is outside the supported set")
        .map_err(ErrorInternalServerError)?;

    let access_token = tokenizer.generate_key(user.user_id, user.email.clone(), role);

    Ok(HttpResponse::Ok().json(LoginResponse{
        access_token,
        email: user.email,
        role: user.role
    }))
}
