pub mod analytics;
pub mod auth;
pub mod posts;
pub mod products;
pub mod quota;
pub mod uploads;
