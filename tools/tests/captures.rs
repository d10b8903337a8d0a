use std::fs;

use bancho_tools::{build_packet, decode_packets, inspect_packets, parse_field};
use binary::{WireType, WireValue};
use tempfile::TempDir;
use wire::{LoginReply, PacketId};

#[test]
fn capture_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("login.bin");

    let fields: Vec<WireValue> = ["i32=-2"]
        .iter()
        .map(|text| parse_field(text).unwrap())
        .collect();
    let mut capture = build_packet(PacketId::ChoUserId.raw(), &fields);
    capture.extend(build_packet(
        PacketId::ChoNotification.raw(),
        &[WireValue::from("Welcome to Bancho!")],
    ));
    fs::write(&path, &capture).unwrap();

    let bytes = fs::read(&path).unwrap();
    let report = inspect_packets(&bytes);
    let names: Vec<_> = report.packets.iter().map(|p| p.name).collect();
    assert_eq!(names, vec![Some("ChoUserId"), Some("ChoNotification")]);

    let decoded = decode_packets(&bytes, Some(PacketId::ChoUserId.raw()), &[WireType::I32]).unwrap();
    let WireValue::I32(raw) = decoded[0].fields[0].value else {
        panic!("expected i32");
    };
    assert_eq!(LoginReply::from_raw(raw), Some(LoginReply::OutdatedClient));

    let notice = decode_packets(&bytes, Some(PacketId::ChoNotification.raw()), &[WireType::Str]).unwrap();
    assert_eq!(notice[0].fields[0].value, WireValue::from("Welcome to Bancho!"));
    assert_eq!(notice[0].unread_bytes, 0);
}

#[test]
fn truncated_capture_is_reported() {
    let mut capture = build_packet(PacketId::OsuPing.raw(), &[]);
    capture.extend(build_packet(PacketId::OsuLogout.raw(), &[WireValue::I32(0)]));
    capture.truncate(capture.len() - 2);

    let report = inspect_packets(&capture);
    assert_eq!(report.packets.len(), 1);
    assert_eq!(report.trailing_bytes, 9);
    assert!(report.error.unwrap().contains("only 2 bytes"));

    assert!(decode_packets(&capture, None, &[]).is_err());
}
