// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz the port handler and reply codec with raw frame bytes.
//!
//! Verifies:
//! 1. `Port::handle` never panics, opened or not.
//! 2. Every error reply names a catalog kind.
//! 3. Encoded replies decode back to themselves.
//! 4. `Reply::decode` on arbitrary bytes never panics.
#![no_main]
use libfuzzer_sys::fuzz_target;
use xdrv_codec::Reply;
use xdrv_port::{OpenMode, Port, Request};

fn check(reply: &Reply) {
    if let Reply::Error(report) = reply {
        assert!(report.kind().is_some(), "unknown tag {}", report.tag);
        assert!(!report.message.is_empty());
    }
    let decoded = Reply::decode(&reply.encode().unwrap()).expect("own encoding must decode");
    assert_eq!(&decoded, reply);
}

fuzz_target!(|data: &[u8]| {
    let mut closed: Port = Port::with_reply_limit(256);
    check(&closed.handle(data));

    let mut open: Port = Port::with_reply_limit(256);
    open.handle(
        &Request::Open {
            mode: OpenMode::ReadWrite,
            path: "fuzz",
        }
        .encode()
        .unwrap(),
    );
    check(&open.handle(data));

    let _ = Reply::decode(data);
});
