//! Core domain types for the TPABridge integration gateway.
//!
//! This crate defines the provider-agnostic contract shared by every other
//! TPABridge crate: provider identity and authentication schemes, the
//! request/result pairs for claim intimation and e-card retrieval, the
//! canonical hospital record, and the gateway error taxonomy.
//!
//! Nothing in this crate performs I/O. Requests and results are created per
//! call and never persisted by the gateway itself; persistence is the
//! embedding application's job.

pub mod claim;
pub mod ecard;
pub mod error;
pub mod hospital;
pub mod provider;

pub use claim::{ClaimContact, ClaimHospital, ClaimIntimationRequest, ClaimIntimationResult};
pub use ecard::{DocumentKind, ECardRequest, ECardResult, EcardDocument};
pub use error::{ErrorCategory, GatewayError};
pub use hospital::{HospitalQuery, HospitalRecord, SearchFacets, StateFacet};
pub use provider::{AuthScheme, ProviderId, RetryPolicy};

/// Convenience result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
