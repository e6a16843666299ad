pub mod claims;
pub mod cookies;
pub mod guards;
pub mod middleware;

pub use claims::AuthUser;
