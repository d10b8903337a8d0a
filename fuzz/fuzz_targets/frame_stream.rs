#![no_main]

use bytes::{BufMut, BytesMut};
use libfuzzer_sys::fuzz_target;
use wire::{FrameDecoder, Limits};

fuzz_target!(|data: &[u8]| {
    let mut decoder = FrameDecoder::new(Limits::for_testing());
    let mut buf = BytesMut::new();
    let mut idx = 0usize;

    // Feed the input in chunks whose sizes come from the input itself.
    while idx < data.len() && idx < 4096 {
        let len = (data[idx] as usize % 120).saturating_add(1);
        idx += 1;
        let end = (idx + len).min(data.len());
        buf.put_slice(&data[idx..end]);
        idx = end;

        loop {
            match decoder.decode(&mut buf) {
                Ok(Some(frame)) => {
                    let _ = frame.kind();
                    let mut reader = frame.reader();
                    let _ = reader.read_str();
                }
                Ok(None) => break,
                Err(_) => return,
            }
        }
    }
});
