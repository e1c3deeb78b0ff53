// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz whole sessions built from structured requests.
//!
//! Verifies that the port's binding survives any sequence of commands and
//! that the document count tracks successful adds and deletes.
#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use xdrv_codec::Reply;
use xdrv_port::request::raw_frame;
use xdrv_port::{Command, OpenMode, Port, Request};

#[derive(Debug, Arbitrary)]
enum Step {
    Open { writable: bool },
    Add(Vec<u8>),
    Get(u32),
    Delete(u32),
    Count,
    Raw { id: i32, params: Vec<u8> },
}

fuzz_target!(|steps: Vec<Step>| {
    let mut port: Port = Port::new();
    let mut count: u32 = 0;
    let mut first_mode = None;

    for step in &steps {
        let frame = match step {
            Step::Open { writable } => {
                let mode = if *writable {
                    OpenMode::ReadWrite
                } else {
                    OpenMode::ReadOnly
                };
                Request::Open { mode, path: "s" }.encode().unwrap()
            }
            Step::Add(data) => Request::AddDocument { data }.encode().unwrap(),
            Step::Get(docid) => Request::GetDocument { docid: *docid }.encode().unwrap(),
            Step::Delete(docid) => Request::DeleteDocument { docid: *docid }.encode().unwrap(),
            Step::Count => Request::DocumentCount.encode().unwrap(),
            Step::Raw { id, params } => raw_frame(*id, params),
        };
        let reply = port.handle(&frame);
        if reply.is_ok() {
            // Raw frames may carry a valid command too.
            let id = i32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]);
            match Command::from_id(id) {
                Ok(Command::AddDocument) => count += 1,
                Ok(Command::DeleteDocument) => count -= 1,
                Ok(Command::Open) if first_mode.is_none() => first_mode = port.mode(),
                _ => {}
            }
        }
        if first_mode.is_some() {
            assert_eq!(port.mode(), first_mode, "binding changed");
        }
    }

    if port.is_open() {
        let reply = port.handle(&Request::DocumentCount.encode().unwrap());
        assert_eq!(reply, Reply::Ok(count.to_le_bytes().to_vec()));
    }
});
