pub mod delete;
pub mod get;
pub mod post;

pub use delete::delete_transaction;
pub use get::{get_transaction, get_transactions};
pub use post::post_transaction;
