//! Packet classification.
//!
//! A zero-copy projection over a raw IPv4 datagram that extracts exactly the
//! fields the verdict policy needs: transport protocol, source address, and
//! TCP destination port. Header-declared lengths are trusted; no checksum or
//! total-length validation is performed.

use std::net::Ipv4Addr;

use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::tcp::TcpPacket;

/// Transport protocol carried by an IPv4 packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportProtocol {
    Tcp,
    /// Any other protocol, with the raw protocol number.
    Other(u8),
}

/// Fields extracted from a raw packet for the verdict decision.
///
/// Never persisted; recomputed per packet from the raw buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeaders {
    pub protocol: TransportProtocol,
    pub source: Ipv4Addr,
    /// Present only for TCP packets whose transport header is complete.
    pub dest_port: Option<u16>,
}

/// Classify a raw IPv4 datagram.
///
/// Returns `None` when the buffer is too short for a minimal IPv4 header or
/// the version field is not 4. For TCP packets the transport header is
/// located at the offset the IHL field declares (in 4-byte units); if the
/// buffer ends before a complete TCP header, `dest_port` is `None` and the
/// caller degrades to Accept.
#[must_use]
pub fn classify(packet: &[u8]) -> Option<PacketHeaders> {
    let ipv4 = Ipv4Packet::new(packet)?;

    if ipv4.get_version() != 4 {
        return None;
    }

    let source = ipv4.get_source();
    let protocol = ipv4.get_next_level_protocol();

    if protocol != IpNextHeaderProtocols::Tcp {
        return Some(PacketHeaders {
            protocol: TransportProtocol::Other(protocol.0),
            source,
            dest_port: None,
        });
    }

    let transport_offset = usize::from(ipv4.get_header_length()) * 4;
    let dest_port = packet
        .get(transport_offset..)
        .and_then(TcpPacket::new)
        .map(|tcp| tcp.get_destination());

    Some(PacketHeaders {
        protocol: TransportProtocol::Tcp,
        source,
        dest_port,
    })
}
