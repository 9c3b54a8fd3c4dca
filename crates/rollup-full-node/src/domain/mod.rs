//! Domain layer: wire types, transactions, method table and errors.

pub mod config;
pub mod error;
pub mod methods;
pub mod request;
pub mod transaction;
pub mod types;

pub use config::*;
pub use error::*;
pub use methods::*;
pub use request::*;
pub use transaction::*;
pub use types::*;
