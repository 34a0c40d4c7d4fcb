pub mod click;
pub mod plan;
pub mod post;
pub mod product;
pub mod role;
pub mod user;

pub use click::ClickSummary;
pub use plan::SubscriptionPlan;
pub use post::{Post, PostDetails};
pub use product::{Product, ProductClickCount};
pub use role::UserRole;
pub use user::{User, UserDetails};
