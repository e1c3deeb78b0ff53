// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property-based tests for the error catalog and the port handler.

use proptest::prelude::*;
use xdrv_codec::Reply;
use xdrv_error::{DriverError, ErrorKind, TaggedError};
use xdrv_port::request::raw_frame;
use xdrv_port::{Command, OpenMode, Port, Request};

// ── Strategies ──────────────────────────────────────────────────────────

fn fast_config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

fn arb_unknown_command() -> impl Strategy<Value = i32> {
    any::<i32>().prop_filter("known command id", |id| Command::from_id(*id).is_err())
}

// ── Catalog ─────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(fast_config())]

    #[test]
    fn memory_allocation_is_deterministic(size in any::<usize>()) {
        let a = DriverError::memory_allocation(size);
        let b = DriverError::memory_allocation(size);
        prop_assert_eq!(a.message(), b.message());
        prop_assert_eq!(a.kind_tag(), "MemoryAllocationError");
        prop_assert_eq!(a.message(), format!("Cannot allocate {size} bytes."));
    }

    #[test]
    fn bad_command_is_deterministic(id in any::<i32>()) {
        let err = DriverError::bad_command(id);
        prop_assert_eq!(err.kind_tag(), "BadCommandError");
        prop_assert_eq!(err.message(), format!("Unknown command with id = {id}."));
        prop_assert_eq!(err.clone(), DriverError::bad_command(id));
    }

    #[test]
    fn element_not_found_is_deterministic(num in any::<u32>()) {
        let err = DriverError::element_not_found(num);
        prop_assert_eq!(err.kind(), ErrorKind::ElementNotFound);
        prop_assert_eq!(err.message(), format!("Element with number = {num} is not found."));
    }

    #[test]
    fn distinct_inputs_give_distinct_messages(a in any::<u32>(), b in any::<u32>()) {
        prop_assume!(a != b);
        let err_a = DriverError::element_not_found(a);
        let err_b = DriverError::element_not_found(b);
        prop_assert_ne!(err_a.message(), err_b.message());
    }
}

// ── Port handler ────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(fast_config())]

    #[test]
    fn arbitrary_frames_get_a_reply(frame in proptest::collection::vec(any::<u8>(), 0..64)) {
        let mut port: Port = Port::new();
        let reply = port.handle(&frame);
        // Any error reply names a catalog kind.
        if let Reply::Error(report) = &reply {
            prop_assert!(report.kind().is_some(), "unknown tag {}", report.tag);
        }
        let decoded = Reply::decode(&reply.encode().unwrap()).unwrap();
        prop_assert_eq!(decoded, reply);
    }

    #[test]
    fn unknown_commands_are_bad_commands(id in arb_unknown_command(), params in proptest::collection::vec(any::<u8>(), 0..16)) {
        let mut port: Port = Port::new();
        let reply = port.handle(&raw_frame(id, &params));
        prop_assert_eq!(reply.error_kind(), Some(ErrorKind::BadCommand));
    }

    #[test]
    fn stored_documents_read_back(docs in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..32), 1..8)) {
        let mut port: Port = Port::new();
        port.handle(&Request::Open { mode: OpenMode::ReadWrite, path: "p" }.encode().unwrap());
        for (i, doc) in docs.iter().enumerate() {
            let reply = port.handle(&Request::AddDocument { data: doc }.encode().unwrap());
            prop_assert_eq!(reply, Reply::Ok((i as u32 + 1).to_le_bytes().to_vec()));
        }
        for (i, doc) in docs.iter().enumerate() {
            let mut expected = (doc.len() as u32).to_le_bytes().to_vec();
            expected.extend_from_slice(doc);
            let frame = Request::GetDocument { docid: i as u32 + 1 }.encode().unwrap();
            let reply = port.handle(&frame);
            prop_assert_eq!(reply, Reply::Ok(expected));
        }
    }
}
