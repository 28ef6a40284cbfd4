pub mod delete;
pub mod get;
pub mod post;
pub mod update;

pub use delete::delete_product;
pub use get::get_products;
pub use post::post_product;
pub use update::update_product;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db_interaction::ProductWithCategory;

#[derive(Serialize, Deserialize, Debug)]
pub struct ProductResponse{
    pub product_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub discount: f64,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub image_url: Option<String>
}

impl From<ProductWithCategory> for ProductResponse {
    fn from((product, category_name): ProductWithCategory) -> Self {
        ProductResponse{
            product_id: product.product_id,
            name: product.name,
            description: product.description,
            price: product.price,
            discount: product.discount,
            category_id: product.category_id,
            category_name,
            image_url: product.image_url
        }
    }
}
