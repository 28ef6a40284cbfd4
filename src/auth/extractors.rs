use actix_web::{error::ErrorUnauthorized, web, FromRequest};
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use super::jwt::{Claims, Tokenizer, UserRole};

// Extractor for Owner-only routes
#[derive(Debug)]
pub struct IsOwner(pub Uuid);

// Extractor for routes any authenticated staff member may call
pub struct IsStaff(pub Uuid, pub UserRole);

fn decode_bearer_claims(req: &actix_web::HttpRequest) -> Result<Claims, actix_web::Error>{
    let tokenizer: &web::Data<Tokenizer> = req.app_data().unwrap();

    let auth = match req.headers().get("Authorization"){
        Some(header) => header,
        None => return Err(ErrorUnauthorized("Missing token"))
    };

    let auth = auth.to_str()
        .map_err(|_| ErrorUnauthorized("Invalid token"))?;

    let token = match auth.strip_prefix("Bearer"){
        Some(rest) => rest.trim(),
        None => return Err(ErrorUnauthorized("Invalid token"))
    };

    match tokenizer.decode_key(token.to_string()){
        Some(claims) => Ok(claims),
        None => Err(ErrorUnauthorized("Invalid token"))
    }
}

impl FromRequest for IsOwner {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(decode_bearer_claims(req).and_then(|claims| {
            match claims.role {
                UserRole::Owner => Ok(IsOwner(claims.sub)),
                _ => Err(ErrorUnauthorized("Unauthorized Role"))
            }
        }))
    }
}

impl FromRequest for IsStaff {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(decode_bearer_claims(req).map(|claims| IsStaff(claims.sub, claims.role)))
    }
}
