pub mod delete;
pub mod get;
pub mod post;
pub mod update;

pub use delete::delete_category;
pub use get::get_categories;
pub use post::post_category;
pub use update::update_category;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Category;

#[derive(Serialize, Deserialize, Debug)]
pub struct CategoryResponse{
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        CategoryResponse{
            category_id: category.category_id,
            name: category.name,
            description: category.description
        }
    }
}
