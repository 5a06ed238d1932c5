pub mod generator;
pub mod sessions;
pub mod store;
