//! Authentication module for `FitTrack`.
//!
//! Provides password hashing, opaque bearer-token issuance and validation,
//! the bearer gate in front of the repositories, and the register/login flow.

pub mod error;
pub mod gate;
pub mod password;
pub mod registration;
pub mod service;
pub mod token;

pub use error::AuthError;
pub use gate::AuthGate;
pub use registration::RegisterRequest;
pub use service::AuthService;
pub use token::{IssuedToken, TokenIssuer};
