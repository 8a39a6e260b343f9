// Authentication and authorization for the back office

pub mod errors;
pub mod extractors;
pub mod jwt;
pub mod models;
pub mod password;
pub mod service;

pub use errors::*;
pub use extractors::*;
pub use jwt::*;
pub use models::*;
pub use service::*;
