#![no_main]

use binary::{PacketReader, WireType};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = PacketReader::new(data);
    let mut idx = 0usize;

    // Use input bytes to drive a bounded sequence of operations.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 8;
        idx += 1;

        let before = reader.position();
        let failed = match op {
            0 => reader.read_uleb128().is_err(),
            1 => reader.read_marked_uleb128().is_err(),
            2 => reader.read_str().is_err(),
            3 => reader.read_i32_list().is_err(),
            4 => reader.read_osu_header().is_err(),
            5 => matches!(reader.next_header(), Some(Err(_))),
            6 => {
                let sel = data.get(idx).copied().unwrap_or(0);
                idx += 1;
                let ty = WireType::ALL[usize::from(sel) % WireType::ALL.len()];
                reader.read_type(ty).is_err()
            }
            _ => {
                for packet in reader.packets().flatten() {
                    let mut payload = packet.payload;
                    while payload.read_str().is_ok() && !payload.is_empty() {}
                }
                false
            }
        };
        // A failed read never moves the cursor.
        if failed {
            assert_eq!(reader.position(), before);
        }
    }
});
