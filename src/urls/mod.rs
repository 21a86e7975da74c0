// src/urls/mod.rs
// =============================================================================
// URL identity and URL policy.
//
// Submodules:
// - canonical: Maps raw URLs to the canonical string used as a page's identity
// - policy: Decides which discovered links are worth crawling
// =============================================================================

mod canonical;
mod policy;

pub use canonical::{canonicalize, host_of};
pub use policy::UrlPolicy;
