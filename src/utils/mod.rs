pub mod env;
pub mod pyramid;
