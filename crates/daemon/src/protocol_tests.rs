// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    allow = { ControlMsg::MayWork { allowed: true } },
    forbid = { ControlMsg::MayWork { allowed: false } },
    shutdown = { ControlMsg::Shutdown },
)]
fn control_messages_round_trip(msg: ControlMsg) {
    let line = encode(&msg).unwrap();
    assert!(line.ends_with('\n'));
    assert_eq!(decode::<ControlMsg>(&line).unwrap(), msg);
}

#[parameterized(
    ready = { StatusMsg::Ready },
    busy = { StatusMsg::Busy { path: "/in/example_0.wav".into() } },
    analyzed = { StatusMsg::Analyzed { path: "/in/example_0.wav".into(), detections: 3 } },
    fatal = { StatusMsg::Fatal { message: "boom".into() } },
)]
fn status_messages_round_trip(msg: StatusMsg) {
    let line = encode(&msg).unwrap();
    assert_eq!(decode::<StatusMsg>(&line).unwrap(), msg);
}

#[test]
fn wire_format_is_tagged_json() {
    let line = encode(&ControlMsg::MayWork { allowed: false }).unwrap();
    assert_eq!(line, "{\"cmd\":\"may_work\",\"allowed\":false}\n");
    let line = encode(&StatusMsg::Ready).unwrap();
    assert_eq!(line, "{\"status\":\"ready\"}\n");
}

#[test]
fn malformed_line_reports_the_line() {
    let err = decode::<StatusMsg>("not json\n").unwrap_err();
    match err {
        ProtocolError::Malformed { line, .. } => assert_eq!(line, "not json"),
        other => panic!("expected Malformed, got {other:?}"),
    }
}

#[test]
fn unknown_tag_is_malformed() {
    assert!(decode::<StatusMsg>("{\"status\":\"levitating\"}").is_err());
}

#[test]
fn status_writer_emits_one_line_per_message() {
    let mut buffer = Vec::new();
    {
        let mut writer = StatusWriter::new(&mut buffer);
        writer.send(&StatusMsg::Ready).unwrap();
        writer
            .send(&StatusMsg::Analyzed {
                path: "/in/a.wav".into(),
                detections: 0,
            })
            .unwrap();
    }
    let text = String::from_utf8(buffer).unwrap();
    assert_eq!(text.lines().count(), 2);
    for line in text.lines() {
        assert!(decode::<StatusMsg>(line).is_ok());
    }
}
