mod token_cache;

pub use token_cache::TokenCache;
pub use token_cache::read as read_token;
pub use token_cache::write as write_token;
