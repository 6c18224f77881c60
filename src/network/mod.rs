//! Network-related modules for packet capture and classification.

mod capture;
mod packet;

pub use capture::{
    PacketCapture, PacketSender, PnetCapture, PnetSender, find_interface, open_channel,
};
pub use packet::{PacketHeaders, TransportProtocol, classify};

#[cfg(test)]
pub use capture::tests::{MockCapture, MockSender};
