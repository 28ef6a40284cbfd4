pub mod delete;
pub mod get;
pub mod post;
pub mod update;

pub use delete::delete_cashier;
pub use get::get_cashiers;
pub use post::post_cashier;
pub use update::update_cashier;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::User;

// The password hash never leaves the store through this shape.
#[derive(Serialize, Deserialize, Debug)]
pub struct CashierResponse{
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    pub is_deactivated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>
}

impl From<User> for CashierResponse {
    fn from(user: User) -> Self {
        CashierResponse{
            user_id: user.user_id,
            user_name: user.user_name,
            email: user.email,
            is_deactivated: user.is_deactivated,
            created_at: user.created_at,
            updated_at: user.updated_at.unwrap_or(user.created_at)
        }
    }
}
