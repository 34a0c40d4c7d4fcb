pub mod plans;
pub mod posts;
pub mod stats;
pub mod users;
