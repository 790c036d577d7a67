pub mod jwt;
pub mod signed_url;

pub use jwt::*;
pub use signed_url::*;
