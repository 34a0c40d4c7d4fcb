pub mod admin;
pub mod protected;
pub mod public;
