#![allow(missing_docs)]

mod common;

use common::{chunks_of, Recording, BOUNDARY, FIELD1, FIXTURE, PICS};
use formwire::{ParseError, ParserState, Reader};

fn read_all(chunks: &[&[u8]]) -> Reader<Recording> {
    let mut reader = Reader::new(BOUNDARY, Recording::default());
    for chunk in chunks {
        reader.write(chunk).expect("chunk should parse");
    }
    reader
}

#[test]
fn assembles_fixture_parts() {
    let reader = read_all(&[FIXTURE]);
    assert!(reader.ended());
    assert!(reader.current_part().is_none());

    let recording = reader.handler();
    assert_eq!(recording.parts.len(), 2);

    let (field1, body) = &recording.parts[0];
    assert_eq!(field1.name, "field1");
    assert!(field1.filename.is_none());
    assert!(field1.mime.is_none());
    assert_eq!(body, FIELD1);

    let (pics, body) = &recording.parts[1];
    assert_eq!(pics.name, "pics");
    assert_eq!(pics.filename.as_deref(), Some("file1.txt"));
    assert_eq!(pics.mime.as_deref(), Some("text/plain"));
    assert_eq!(pics.header("content-type"), Some("text/plain"));
    assert_eq!(body, PICS);
}

#[test]
fn callbacks_arrive_in_stream_order() {
    let reader = read_all(&[FIXTURE]);
    assert_eq!(
        reader.handler().log,
        ["part:field1", "end:field1", "part:pics", "end:pics"]
    );
}

#[test]
fn every_chunk_size_reproduces_fixture() {
    for size in 1..=FIXTURE.len() {
        let reader = read_all(&chunks_of(FIXTURE, size));
        assert!(reader.ended(), "chunk size {size}");

        let parts = &reader.handler().parts;
        assert_eq!(parts.len(), 2, "chunk size {size}");
        assert_eq!(parts[0].0.name, "field1");
        assert_eq!(parts[0].1, FIELD1, "chunk size {size}");
        assert_eq!(parts[1].0.filename.as_deref(), Some("file1.txt"));
        assert_eq!(parts[1].0.mime.as_deref(), Some("text/plain"));
        assert_eq!(parts[1].1, PICS, "chunk size {size}");
    }
}

#[test]
fn finished_parts_are_kept_by_name() {
    let reader = read_all(&[FIXTURE]);
    let parts = reader.parts();

    assert_eq!(parts.len(), 2);
    assert!(parts["field1"].ended);
    assert_eq!(parts["pics"].filename.as_deref(), Some("file1.txt"));
    assert_eq!(
        parts["field1"].header("Content-Disposition"),
        Some("form-data; name=\"field1\"")
    );
}

#[test]
fn header_names_are_lower_cased() {
    let body = b"--b\r\nCONTENT-DISPOSITION: form-data; name=\"x\"\r\nX-Trace: 7\r\n\r\n1\r\n--b--";
    let mut reader = Reader::new("b", Recording::default());
    reader.write(body).expect("body should parse");

    let part = &reader.parts()["x"];
    assert_eq!(part.headers.get("x-trace").map(String::as_str), Some("7"));
    assert!(part.headers.contains_key("content-disposition"));
}

#[test]
fn windows_file_paths_are_stripped() {
    let body = b"--b\r\ncontent-disposition: form-data; name=\"f\"; filename=\"C:\\Documents\\report.pdf\"\r\n\r\n%PDF\r\n--b--";
    let mut reader = Reader::new("b", Recording::default());
    reader.write(body).expect("body should parse");

    assert_eq!(reader.parts()["f"].filename.as_deref(), Some("report.pdf"));
}

#[test]
fn later_part_with_same_name_replaces_earlier() {
    let body = b"--b\r\ncontent-disposition: form-data; name=\"dup\"\r\n\r\n1\r\n\
--b\r\ncontent-disposition: form-data; name=\"dup\"; filename=\"two.txt\"\r\n\r\n2\r\n--b--";
    let mut reader = Reader::new("b", Recording::default());
    reader.write(body).expect("body should parse");

    assert_eq!(reader.parts().len(), 1);
    assert_eq!(reader.parts()["dup"].filename.as_deref(), Some("two.txt"));
    assert_eq!(reader.handler().parts.len(), 2);
}

#[test]
fn open_part_is_visible_mid_stream() {
    let mut reader = Reader::new(BOUNDARY, Recording::default());
    reader.write(&FIXTURE[..70]).expect("chunk should parse");

    let part = reader.current_part().expect("a part should be open");
    assert_eq!(part.name, "field1");
    assert!(!part.ended);
    assert!(!reader.ended());
    assert_eq!(reader.state(), ParserState::PartData);
}

#[test]
fn nested_multipart_is_an_opaque_body() {
    let inner = b"--inner\r\ncontent-disposition: file; filename=\"a.txt\"\r\n\r\nA\r\n--inner--";
    let mut body = b"--outer\r\ncontent-disposition: form-data; name=\"files\"\r\n\
content-type: multipart/mixed; boundary=inner\r\n\r\n"
        .to_vec();
    body.extend_from_slice(inner);
    body.extend_from_slice(b"\r\n--outer--");

    let mut reader = Reader::new("outer", Recording::default());
    reader.write(&body).expect("body should parse");

    let (part, data) = &reader.handler().parts[0];
    assert_eq!(part.mime.as_deref(), Some("multipart/mixed; boundary=inner"));
    assert_eq!(data, inner);
}

#[test]
fn missing_leading_boundary_is_a_parse_error() {
    let body = b"garbage\r\n--AaB03x--";
    let mut reader = Reader::new(BOUNDARY, Recording::default());

    let err = reader.write(body).expect_err("must fail");
    assert_eq!(
        err,
        ParseError::Rejected {
            offset: 0,
            length: body.len()
        }
    );
    assert_eq!(err.offset(), Some(0));
    assert!(err.to_string().contains("0 of 19 bytes parsed"));
    assert!(!reader.ended());
}

#[test]
fn failed_session_rejects_further_writes() {
    let mut reader = Reader::new(BOUNDARY, Recording::default());
    reader.write(b"--AaB03x\r\nBad Header: 1\r\n").expect_err("must fail");
    assert_eq!(reader.state(), ParserState::Error);

    let err = reader.write(b"").expect_err("must stay failed");
    assert_eq!(err, ParseError::Rejected { offset: 0, length: 0 });
}

#[test]
fn no_part_events_after_end() {
    let mut body = FIXTURE.to_vec();
    body.extend_from_slice(b"--AaB03x\r\ncontent-disposition: form-data; name=\"late\"\r\n\r\nx");

    let mut reader = Reader::new(BOUNDARY, Recording::default());
    reader.write(&body).expect("trailing bytes are ignored");

    assert!(reader.ended());
    assert_eq!(reader.handler().parts.len(), 2);
    assert!(!reader.parts().contains_key("late"));
}
