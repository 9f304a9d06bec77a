pub mod ids;
pub mod order;

pub use ids::{ArticleId, OrderKey, UserId};
pub use order::{Order, PersistState};
