pub mod registry;
pub mod token;
pub mod token_cache;
