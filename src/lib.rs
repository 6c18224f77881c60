//! Tollgate - an inline HTTP packet filter.
//!
//! Tollgate sits at a chokepoint ahead of any routing decision, inspects
//! IPv4/TCP traffic, and silently discards port-80 packets whose source
//! address appears on a configured blacklist. Everything else continues
//! normal handling.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`config`]: Configuration loading and validation
//! - [`blacklist`]: The address set and its one-time file load
//! - [`network`]: Packet capture seams and packet classification
//! - [`engine`]: The Accept/Drop verdict policy
//! - [`intercept`]: The interception-point contract and inline tap
//! - [`error`]: Error types
//!
//! # Testing
//!
//! The capture layer and the interception point are trait-based, so the
//! whole decision path can be exercised without a network interface:
//!
//! ```rust
//! use tollgate::blacklist::AddressSet;
//! use tollgate::engine::{Verdict, VerdictEngine};
//!
//! let set = AddressSet::new(["10.0.0.1".parse().unwrap()]);
//! let engine = VerdictEngine::new(set);
//! // Unparseable buffers always fail open.
//! assert_eq!(engine.decide(&[]), Verdict::Accept);
//! ```

pub mod blacklist;
pub mod config;
pub mod engine;
pub mod error;
pub mod intercept;
pub mod metrics;
pub mod network;

pub use blacklist::AddressSet;
pub use config::Config;
pub use engine::{Verdict, VerdictEngine};
pub use error::{Error, Result};
