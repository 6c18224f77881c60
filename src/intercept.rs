//! Interception point contract.
//!
//! The core never talks to a capture mechanism directly; it hands a verdict
//! hook to an [`Interceptor`] and relies on two guarantees: the hook sees
//! every inbound packet before any routing decision, and a Drop verdict means
//! the packet goes no further. Keeping this a trait lets the attachment
//! mechanism (datalink tap, nfqueue, XDP, OS firewall hook) vary by target
//! environment without touching the verdict policy.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use pnet::packet::Packet;
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use tracing::{debug, warn};

use crate::engine::Verdict;
use crate::error::{InterceptError, Result};
use crate::network::{PacketCapture, PacketSender};

/// The callback invoked for every packet traversing the chokepoint.
///
/// Receives the raw IPv4 datagram bytes. Must be reentrant: the interception
/// point may invoke it concurrently from several capture contexts.
pub type PacketHook = Arc<dyn Fn(&[u8]) -> Verdict + Send + Sync>;

/// Where in the packet path the hook attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Before any routing or forwarding decision is made.
    PreRouting,
}

/// Scheduling priority relative to other installed filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Ahead of every other filter at the same stage.
    First,
}

/// An attachment point for the verdict hook.
pub trait Interceptor {
    /// Register the hook. After this returns, every inbound packet at the
    /// given stage is passed to the hook and its verdict is honored.
    fn register(&mut self, hook: PacketHook, stage: Stage, priority: Priority) -> Result<()>;

    /// Detach the hook. After this returns, no further invocations occur,
    /// so the resources the hook closes over can be released safely.
    fn deregister(&mut self) -> Result<()>;
}

/// Inline tap realization of the interception contract.
///
/// Pairs a capture source with an egress sender: each captured IPv4 frame
/// has its datagram handed to the hook, and only accepted frames are
/// re-emitted. Non-IPv4 frames pass through untouched. In a bump-in-the-wire
/// deployment the two halves sit on distinct interfaces.
pub struct TapInterceptor<C, S>
where
    C: PacketCapture + 'static,
    S: PacketSender + 'static,
{
    capture: Option<C>,
    sender: Option<S>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl<C, S> TapInterceptor<C, S>
where
    C: PacketCapture + 'static,
    S: PacketSender + 'static,
{
    /// Create a tap over a capture source and an egress sender.
    pub fn new(capture: C, sender: S) -> Self {
        Self {
            capture: Some(capture),
            sender: Some(sender),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }
}

impl<C, S> Interceptor for TapInterceptor<C, S>
where
    C: PacketCapture + 'static,
    S: PacketSender + 'static,
{
    fn register(&mut self, hook: PacketHook, stage: Stage, priority: Priority) -> Result<()> {
        if self.handle.is_some() {
            return Err(InterceptError::AlreadyRegistered.into());
        }

        let (Some(capture), Some(sender)) = (self.capture.take(), self.sender.take()) else {
            return Err(InterceptError::AlreadyRegistered.into());
        };

        debug!(?stage, ?priority, "registering interception hook");
        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        self.handle = Some(std::thread::spawn(move || {
            run_loop(capture, sender, hook, running);
        }));

        Ok(())
    }

    fn deregister(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Err(InterceptError::NotRegistered.into());
        };

        self.running.store(false, Ordering::SeqCst);
        let _ = handle.join();
        debug!("interception hook deregistered");

        Ok(())
    }
}

impl<C, S> Drop for TapInterceptor<C, S>
where
    C: PacketCapture + 'static,
    S: PacketSender + 'static,
{
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.deregister();
        }
    }
}

fn run_loop<C, S>(mut capture: C, mut sender: S, hook: PacketHook, running: Arc<AtomicBool>)
where
    C: PacketCapture,
    S: PacketSender,
{
    while running.load(Ordering::SeqCst) {
        let Some(frame) = capture.next_packet() else {
            continue;
        };

        match frame_verdict(&hook, &frame) {
            Verdict::Accept => {
                if let Err(err) = sender.send(&frame) {
                    warn!("failed to re-emit accepted frame: {err}");
                }
            }
            // Discard: no further processing of any kind.
            Verdict::Drop => {}
        }
    }
}

/// Apply the hook to one captured frame.
///
/// Only IPv4 frames are subject to a verdict; everything else continues
/// normal handling, since the hook is an IPv4 pre-routing filter.
fn frame_verdict(hook: &PacketHook, frame: &[u8]) -> Verdict {
    let Some(ethernet) = EthernetPacket::new(frame) else {
        return Verdict::Accept;
    };

    if ethernet.get_ethertype() != EtherTypes::Ipv4 {
        return Verdict::Accept;
    }

    hook(ethernet.payload())
}
