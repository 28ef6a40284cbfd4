pub mod analytics;
pub mod cashiers;
pub mod categories;
pub mod products;
pub mod transactions;
pub mod users;

pub use analytics::*;
pub use cashiers::*;
pub use categories::*;
pub use products::*;
pub use transactions::*;
pub use users::*;
