//! Packet capture abstraction.
//!
//! Trait seams over the raw datalink channel so the interception loop can be
//! exercised in tests without a real network interface, and so the capture
//! and re-emission halves of the chokepoint can live on distinct interfaces.

use pnet::datalink::{self, Channel, DataLinkReceiver, DataLinkSender, NetworkInterface};

use crate::error::{NetworkError, Result};

/// Trait for packet capture implementations.
pub trait PacketCapture: Send {
    /// Receive the next frame.
    /// Returns None if the capture has ended.
    fn next_packet(&mut self) -> Option<Vec<u8>>;
}

/// Trait for packet sending implementations.
pub trait PacketSender: Send {
    /// Send a frame.
    fn send(&mut self, packet: &[u8]) -> Result<()>;
}

/// Find a suitable network interface.
///
/// With a name, that exact interface is required. Without one, the first
/// interface that is up, not loopback, and has an address is used.
pub fn find_interface(name: Option<&str>) -> Result<NetworkInterface> {
    let interfaces = datalink::interfaces();

    if let Some(name) = name {
        interfaces
            .into_iter()
            .find(|iface| iface.name == name)
            .ok_or_else(|| NetworkError::NoInterface.into())
    } else {
        interfaces
            .into_iter()
            .find(|iface| iface.is_up() && !iface.is_loopback() && !iface.ips.is_empty())
            .ok_or_else(|| NetworkError::NoInterface.into())
    }
}

/// Open a datalink channel on the given interface.
///
/// Returns the capture and sender halves; a chokepoint deployment typically
/// keeps the capture half of the ingress interface and the sender half of
/// the egress interface.
pub fn open_channel(interface: &NetworkInterface) -> Result<(PnetCapture, PnetSender)> {
    let (tx, rx) = match datalink::channel(interface, datalink::Config::default()) {
        Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
        Ok(_) => return Err(NetworkError::UnsupportedChannel.into()),
        Err(e) => return Err(NetworkError::ChannelOpen(e.to_string()).into()),
    };

    Ok((PnetCapture { rx }, PnetSender { tx }))
}

/// Production packet capture using pnet.
pub struct PnetCapture {
    rx: Box<dyn DataLinkReceiver>,
}

impl PacketCapture for PnetCapture {
    fn next_packet(&mut self) -> Option<Vec<u8>> {
        self.rx.next().ok().map(<[u8]>::to_vec)
    }
}

/// Production packet sender using pnet.
pub struct PnetSender {
    tx: Box<dyn DataLinkSender>,
}

impl PacketSender for PnetSender {
    fn send(&mut self, packet: &[u8]) -> Result<()> {
        self.tx
            .send_to(packet, None)
            .ok_or_else(|| NetworkError::SendFailed("send returned None".into()))?
            .map_err(|e| NetworkError::SendFailed(e.to_string()))?;
        Ok(())
    }
}
