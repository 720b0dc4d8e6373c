//! # tpabridge-gateway
//!
//! The TPA integration gateway: one uniform internal contract
//! ("intimate this claim", "fetch this e-card", "search these hospitals")
//! over a dozen incompatible TPA/insurer wire protocols.
//!
//! ## Overview
//!
//! - [`TpaGateway`] is the dispatch engine and the only entry point for
//!   callers.
//! - [`credentials::CredentialManager`] obtains and caches per-provider
//!   credentials (static headers, OAuth2 password-grant bearers, HMAC
//!   request signatures, encrypted session tokens).
//! - [`adapters`] holds one request-builder/response-normalizer pair per
//!   integrated provider, collected into a closed [`adapters::AdapterSet`]
//!   lookup.
//! - [`hospitals`] remaps heterogeneous provider hospital tables into the
//!   canonical record shape.
//!
//! The gateway is a library boundary: it exposes no HTTP surface of its
//! own and persists nothing. Callers hand it a normalized request and
//! store whatever comes back.
//!
//! ## Example
//!
//! ```ignore
//! use tpabridge_config::{GatewaySettings, ProviderRegistry};
//! use tpabridge_gateway::TpaGateway;
//!
//! let gateway = TpaGateway::new(ProviderRegistry::builtin(), GatewaySettings::default());
//! let result = gateway.intimate_claim(&request).await;
//! if result.success {
//!     println!("reference: {}", result.reference_number.unwrap());
//! }
//! ```

pub mod adapters;
pub mod credentials;
pub mod dispatch;
pub mod document;
pub mod hospitals;
pub mod wire;

pub use adapters::{AdapterSet, Outcome, ProviderAdapter};
pub use credentials::{Credential, CredentialManager};
pub use dispatch::TpaGateway;
pub use hospitals::{HospitalDirectory, HospitalRow, HospitalSource, MemoryHospitalSource};
pub use wire::{WireBody, WireMethod, WireRequest, WireResponse};
