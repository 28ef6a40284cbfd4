pub mod revenue;
pub mod top_products;

pub use revenue::{get_revenue, RevenueResponse};
pub use top_products::get_top_products;
