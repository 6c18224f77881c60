//! Verdict engine.
//!
//! Combines the packet classifier with the blacklist to produce an
//! Accept/Drop verdict for every packet crossing the chokepoint. The policy
//! fails open: anything the classifier cannot make sense of is accepted, so
//! corrupt or partial captures never cause false drops.

use std::sync::Arc;

use metrics::counter;
use tracing::warn;

use crate::blacklist::AddressSet;
use crate::intercept::PacketHook;
use crate::network::{TransportProtocol, classify};

/// Destination port the filter applies to.
pub const HTTP_PORT: u16 = 80;

/// The outcome for a single packet. Every invocation terminates in exactly
/// one of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Continue normal processing.
    Accept,
    /// Discard the packet with no further processing.
    Drop,
}

/// Decides the fate of each packet against an immutable blacklist.
///
/// The engine owns its [`AddressSet`]; nothing is reachable through ambient
/// globals. Because the set is never mutated after construction, `decide`
/// is reentrant and lock-free, safe to invoke concurrently from any number
/// of capture contexts.
#[derive(Debug, Clone)]
pub struct VerdictEngine {
    blacklist: Arc<AddressSet>,
}

impl VerdictEngine {
    /// Create an engine over a fully-built blacklist.
    pub fn new(blacklist: AddressSet) -> Self {
        Self {
            blacklist: Arc::new(blacklist),
        }
    }

    /// The blacklist this engine decides against.
    #[must_use]
    pub fn blacklist(&self) -> &AddressSet {
        &self.blacklist
    }

    /// Decide the verdict for a raw IPv4 datagram.
    ///
    /// Policy, in order: unparseable → Accept; non-TCP → Accept; destination
    /// port ≠ 80 → Accept; blacklisted source → Drop; otherwise Accept.
    pub fn decide(&self, packet: &[u8]) -> Verdict {
        counter!("tollgate_packets_inspected_total").increment(1);

        let Some(headers) = classify(packet) else {
            return Verdict::Accept;
        };

        if headers.protocol != TransportProtocol::Tcp {
            return Verdict::Accept;
        }

        if headers.dest_port != Some(HTTP_PORT) {
            return Verdict::Accept;
        }

        if self.blacklist.contains(headers.source) {
            warn!(source = %headers.source, "dropping HTTP packet from blacklisted source");
            counter!("tollgate_packets_dropped_total").increment(1);
            return Verdict::Drop;
        }

        Verdict::Accept
    }

    /// Turn the engine into the callback registered at the interception
    /// point. The closure owns the engine, so the blacklist cannot outlive
    /// its last in-flight invocation.
    #[must_use]
    pub fn into_hook(self) -> PacketHook {
        Arc::new(move |packet: &[u8]| self.decide(packet))
    }
}
