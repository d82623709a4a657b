pub mod payload;
pub mod policy;
pub mod resolver;
