//! Integration tests for the blacklist filter.
//!
//! These tests verify the complete load-then-decide flow: a blacklist file
//! on disk, the compiled address set, and the verdict policy over synthetic
//! packets.

use std::io::Write;
use std::net::Ipv4Addr;

use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::MutableIpv4Packet;
use pnet::packet::tcp::MutableTcpPacket;
use pnet::packet::udp::MutableUdpPacket;
use tempfile::NamedTempFile;

use tollgate::blacklist::{AddressSet, FileLoader};
use tollgate::config::DEFAULT_MAX_ENTRIES;
use tollgate::engine::{Verdict, VerdictEngine};

const IPV4_HEADER_SIZE: usize = 20;

fn addr(s: &str) -> Ipv4Addr {
    s.parse().unwrap()
}

/// Build a raw IPv4 datagram with the given transport header.
fn build_ipv4_packet(protocol: IpNextHeaderProtocol, src_ip: Ipv4Addr, dest_port: u16) -> Vec<u8> {
    let is_udp = protocol == IpNextHeaderProtocols::Udp;
    let transport_size = if is_udp { 8 } else { 20 };
    let mut buffer = vec![0u8; IPV4_HEADER_SIZE + transport_size];

    {
        let mut ipv4 = MutableIpv4Packet::new(&mut buffer).unwrap();
        ipv4.set_version(4);
        ipv4.set_header_length(5);
        ipv4.set_total_length((IPV4_HEADER_SIZE + transport_size) as u16);
        ipv4.set_next_level_protocol(protocol);
        ipv4.set_source(src_ip);
        ipv4.set_destination(Ipv4Addr::new(192, 168, 1, 1));
    }

    if is_udp {
        let mut udp = MutableUdpPacket::new(&mut buffer[IPV4_HEADER_SIZE..]).unwrap();
        udp.set_source(43210);
        udp.set_destination(dest_port);
        udp.set_length(8);
    } else {
        let mut tcp = MutableTcpPacket::new(&mut buffer[IPV4_HEADER_SIZE..]).unwrap();
        tcp.set_source(43210);
        tcp.set_destination(dest_port);
        tcp.set_data_offset(5);
    }

    buffer
}

async fn load_engine(content: &[u8]) -> VerdictEngine {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content).unwrap();
    file.flush().unwrap();

    let set = FileLoader::load(file.path(), DEFAULT_MAX_ENTRIES)
        .await
        .unwrap();
    VerdictEngine::new(set)
}

#[tokio::test]
async fn should_load_source_with_blank_lines_in_order() {
    let engine = load_engine(b"10.0.0.1\n10.0.0.2\n\n192.168.1.1").await;

    assert_eq!(
        engine.blacklist().addresses(),
        &[addr("10.0.0.1"), addr("10.0.0.2"), addr("192.168.1.1")]
    );
}

#[tokio::test]
async fn should_drop_http_packet_from_loaded_blacklist() {
    let engine = load_engine(b"10.0.0.1\n10.0.0.2\n\n192.168.1.1").await;
    let packet = build_ipv4_packet(IpNextHeaderProtocols::Tcp, addr("10.0.0.1"), 80);

    assert_eq!(engine.decide(&packet), Verdict::Drop);
}

#[tokio::test]
async fn should_accept_identical_packet_on_other_port() {
    let engine = load_engine(b"10.0.0.1\n10.0.0.2\n\n192.168.1.1").await;
    let packet = build_ipv4_packet(IpNextHeaderProtocols::Tcp, addr("10.0.0.1"), 8080);

    assert_eq!(engine.decide(&packet), Verdict::Accept);
}

#[tokio::test]
async fn should_accept_udp_from_blacklisted_source_on_any_port() {
    let engine = load_engine(b"10.0.0.1\n10.0.0.2\n\n192.168.1.1").await;

    for port in [53, 80, 8080] {
        let packet = build_ipv4_packet(IpNextHeaderProtocols::Udp, addr("10.0.0.1"), port);
        assert_eq!(engine.decide(&packet), Verdict::Accept);
    }
}

#[tokio::test]
async fn should_keep_only_first_128_of_129_entries() {
    let mut content = String::new();
    for i in 0..129u32 {
        content.push_str(&format!("10.0.{}.{}\n", i / 256, i % 256));
    }

    let engine = load_engine(content.as_bytes()).await;
    let set = engine.blacklist();

    assert_eq!(set.len(), 128);
    assert_eq!(set.addresses()[0], addr("10.0.0.0"));
    assert_eq!(set.addresses()[127], addr("10.0.0.127"));
    assert!(!set.contains(addr("10.0.0.128")));
}

#[tokio::test]
async fn should_drop_only_members_among_first_128() {
    let mut content = String::new();
    for i in 0..129u32 {
        content.push_str(&format!("10.0.{}.{}\n", i / 256, i % 256));
    }

    let engine = load_engine(content.as_bytes()).await;

    let in_cap = build_ipv4_packet(IpNextHeaderProtocols::Tcp, addr("10.0.0.127"), 80);
    assert_eq!(engine.decide(&in_cap), Verdict::Drop);

    let truncated_away = build_ipv4_packet(IpNextHeaderProtocols::Tcp, addr("10.0.0.128"), 80);
    assert_eq!(engine.decide(&truncated_away), Verdict::Accept);
}

#[tokio::test]
async fn should_ignore_malformed_lines_when_loading() {
    let engine = load_engine(b"10.0.0.1\nnot-an-address\n10.0.0.2\n").await;

    assert_eq!(
        engine.blacklist().addresses(),
        &[addr("10.0.0.1"), addr("10.0.0.2")]
    );

    // A malformed line never becomes a droppable entry.
    let packet = build_ipv4_packet(IpNextHeaderProtocols::Tcp, addr("0.0.0.0"), 80);
    assert_eq!(engine.decide(&packet), Verdict::Accept);
}

#[tokio::test]
async fn should_fail_open_on_truncated_and_non_ipv4_buffers() {
    let engine = load_engine(b"10.0.0.1\n").await;

    assert_eq!(engine.decide(&[]), Verdict::Accept);
    assert_eq!(engine.decide(&[0u8; 12]), Verdict::Accept);

    let mut packet = build_ipv4_packet(IpNextHeaderProtocols::Tcp, addr("10.0.0.1"), 80);
    packet[0] = (packet[0] & 0x0f) | 0x60;
    assert_eq!(engine.decide(&packet), Verdict::Accept);
}

#[tokio::test]
async fn should_treat_missing_blacklist_as_fatal() {
    let result = FileLoader::load(
        std::path::Path::new("/nonexistent/tollgate/blacklist.conf"),
        DEFAULT_MAX_ENTRIES,
    )
    .await;

    assert!(result.is_err());
}

#[test]
fn should_match_membership_against_file_order() {
    let entries = [addr("203.0.113.1"), addr("198.51.100.2"), addr("192.0.2.3")];
    let set = AddressSet::new(entries);

    for entry in entries {
        assert!(set.contains(entry));
    }
    assert_eq!(set.addresses(), &entries);
    assert!(!set.contains(addr("203.0.113.2")));
}
