pub mod auth;
pub mod clicks;
pub mod feed;
pub mod profile;
