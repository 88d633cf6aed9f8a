//! Account lifecycle: registration, credential hashing and token issuance.

pub mod error;
pub mod hasher;
pub mod model;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod service;
pub mod store;
pub mod token;

pub use error::{AccountError, FieldErrors};
pub use hasher::Argon2Hasher;
pub use model::{Credentials, NewAccount};
pub use service::AccountService;
pub use store::{JsonAccountStore, SharedAccountStore, StoreError};
pub use token::{TokenIssuer, TokenSettings};
