pub mod api;
pub mod auth;
pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export core logic types
pub use logic::{
    external_repr, fingerprint, normalize_patch, NormalizedPatch, PatchError, PatchTarget,
    PatchValue,
};

// Export all model types
pub use model::*;

// Export auth types
pub use auth::{Auth0Verifier, AuthError, Authorizer};

// Export store types
pub use store::{MemoryStore, PostgresStore, Store};
