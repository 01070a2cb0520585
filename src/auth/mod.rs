pub mod service;

pub use service::{Auth0Verifier, AuthError, Authorizer};
