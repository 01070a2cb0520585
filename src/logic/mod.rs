pub mod fields;
pub mod fingerprint;
pub mod mutate;
pub mod patch;

pub use fingerprint::{external_repr, fingerprint};
pub use mutate::PatchTarget;
pub use patch::{normalize_patch, NormalizedPatch, PatchError, PatchValue};
