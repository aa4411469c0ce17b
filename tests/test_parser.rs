use http_redirect::http::parser::{Mode, ParseError, Phase, RequestParser, Verdict};
use http_redirect::http::request::Method;

const CAPACITY: usize = 1024;

/// Feeds `input` split into `chunk`-sized pieces and returns the verdict plus
/// how many bytes had been delivered when it became final.
fn feed_chunked(mode: Mode, input: &[u8], chunk: usize) -> (Verdict, usize) {
    let mut parser = RequestParser::new(mode, CAPACITY);
    let mut delivered = 0;
    for piece in input.chunks(chunk) {
        delivered += piece.len();
        let verdict = parser.feed(piece);
        if verdict.is_final() {
            return (verdict, delivered);
        }
    }
    (Verdict::NeedMoreData, delivered)
}

#[test]
fn test_boundary_completes_at_terminator_for_any_chunking() {
    let input = b"GET /x HTTP/1.1\r\nHost: a\r\nAccept: */*\r\n\r\nbody bytes";
    let end = input.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;

    let (verdict, delivered) = feed_chunked(Mode::Boundary, input, 1);
    assert_eq!(verdict, Verdict::Complete(None));
    assert_eq!(delivered, end);

    for chunk in 2..input.len() {
        let (verdict, delivered) = feed_chunked(Mode::Boundary, input, chunk);
        assert_eq!(verdict, Verdict::Complete(None), "chunk size {}", chunk);
        // The terminator sits in the chunk that was delivered last.
        assert!(delivered >= end && delivered - chunk < end, "chunk size {}", chunk);
    }
}

#[test]
fn test_boundary_without_terminator_needs_more() {
    let (verdict, _) = feed_chunked(Mode::Boundary, b"GET / HTTP/1.1\r\nHost: a\r\n\r", 3);
    assert_eq!(verdict, Verdict::NeedMoreData);
}

#[test]
fn test_boundary_accepts_bare_lf() {
    let (verdict, delivered) = feed_chunked(Mode::Boundary, b"GET / HTTP/1.0\nHost: a\n\nrest", 1);
    assert_eq!(verdict, Verdict::Complete(None));
    assert_eq!(delivered, b"GET / HTTP/1.0\nHost: a\n\n".len());
}

#[test]
fn test_boundary_mixed_line_endings() {
    let (verdict, _) = feed_chunked(Mode::Boundary, b"GET / HTTP/1.0\r\nX: y\n\r\n", 1);
    assert_eq!(verdict, Verdict::Complete(None));
}

#[test]
fn test_boundary_never_malformed() {
    let mut parser = RequestParser::new(Mode::Boundary, 16);
    let garbage = vec![b'x'; 10_000];
    assert_eq!(parser.feed(&garbage), Verdict::NeedMoreData);
    assert_eq!(parser.feed(b"\r\n\r\n"), Verdict::Complete(None));
}

#[test]
fn test_routing_extracts_host_and_uri_from_tiny_chunks() {
    let input = b"GET /search HTTP/1.1\r\nHost: example.com\r\n\r\n";

    for chunk in 1..=input.len() {
        let (verdict, delivered) = feed_chunked(Mode::Routing, input, chunk);
        let Verdict::Complete(Some(head)) = verdict else {
            panic!("chunk size {}: got {:?}", chunk, verdict);
        };
        assert_eq!(delivered, input.len());
        assert_eq!(head.method, Method::GET);
        assert_eq!(&head.uri[..], b"/search");
        assert_eq!(head.host.as_deref(), Some(&b"example.com"[..]));
        assert_eq!(&head.routing_key()[..], b"example.com/search");
    }
}

#[test]
fn test_routing_host_may_follow_other_headers() {
    let input = b"POST /api HTTP/1.1\r\nUser-Agent: t\r\nAccept: */*\r\nHost: b.org\r\nX-Y: z\r\n\r\n";
    let (verdict, _) = feed_chunked(Mode::Routing, input, 5);

    let Verdict::Complete(Some(head)) = verdict else {
        panic!("got {:?}", verdict);
    };
    assert_eq!(head.method, Method::POST);
    assert_eq!(&head.uri[..], b"/api");
    assert_eq!(head.host.as_deref(), Some(&b"b.org"[..]));
}

#[test]
fn test_routing_without_host() {
    let (verdict, _) = feed_chunked(Mode::Routing, b"HEAD /only HTTP/1.0\n\n", 4);

    let Verdict::Complete(Some(head)) = verdict else {
        panic!("got {:?}", verdict);
    };
    assert_eq!(head.host, None);
    assert_eq!(&head.routing_key()[..], b"/only");
}

#[test]
fn test_routing_duplicate_host_is_malformed() {
    let input = b"GET / HTTP/1.1\r\nHost: first\r\nHost: second\r\n\r\n";
    let second_host_end = input.windows(8).position(|w| w == b"second\r\n").unwrap() + 8;

    for chunk in [1, 7, input.len()] {
        let (verdict, delivered) = feed_chunked(Mode::Routing, input, chunk);
        assert_eq!(verdict, Verdict::Malformed(ParseError::DuplicateHost));
        assert!(delivered >= second_host_end);
    }
}

#[test]
fn test_routing_header_names_are_case_sensitive() {
    let input = b"GET /p HTTP/1.1\r\nhost: lower\r\n\r\n";
    let (verdict, _) = feed_chunked(Mode::Routing, input, 64);

    let Verdict::Complete(Some(head)) = verdict else {
        panic!("got {:?}", verdict);
    };
    assert_eq!(head.host, None);
}

#[test]
fn test_routing_phases() {
    let mut parser = RequestParser::new(Mode::Routing, CAPACITY);
    assert_eq!(parser.phase(), Phase::RequestLine);
    parser.feed(b"GET / HTTP/1.1\r\n");
    assert_eq!(parser.phase(), Phase::Headers);
    parser.feed(b"Host: a\r\n");
    assert_eq!(parser.phase(), Phase::HostSeen);
    parser.feed(b"Accept: */*\r\n");
    assert_eq!(parser.phase(), Phase::HostSeen);
    parser.feed(b"\r\n");
    assert_eq!(parser.phase(), Phase::Complete);
}

#[test]
fn test_malformed_first_line() {
    let (verdict, _) = feed_chunked(Mode::Routing, b"FOO /x HTTP/1.1\r\n", 1);
    assert_eq!(verdict, Verdict::Malformed(ParseError::UnknownRequestLine));
}

#[test]
fn test_methods_are_case_sensitive() {
    let (verdict, _) = feed_chunked(Mode::Routing, b"get / HTTP/1.1\r\n\r\n", 64);
    assert_eq!(verdict, Verdict::Malformed(ParseError::UnknownRequestLine));
}

#[test]
fn test_header_before_request_line_is_malformed() {
    let (verdict, _) = feed_chunked(Mode::Routing, b"Host: a\r\nGET / HTTP/1.1\r\n\r\n", 64);
    assert_eq!(verdict, Verdict::Malformed(ParseError::UnknownRequestLine));
}

#[test]
fn test_blank_line_first_is_malformed() {
    let (verdict, _) = feed_chunked(Mode::Routing, b"\r\nGET / HTTP/1.1\r\n\r\n", 64);
    assert_eq!(verdict, Verdict::Malformed(ParseError::BlankBeforeRequestLine));
}

#[test]
fn test_request_line_without_uri_terminator() {
    let (verdict, _) = feed_chunked(Mode::Routing, b"GET /nospace\r\n\r\n", 64);
    assert_eq!(verdict, Verdict::Malformed(ParseError::MissingUri));
}

#[test]
fn test_second_request_line_is_malformed() {
    let input = b"GET / HTTP/1.1\r\nPOST /x HTTP/1.1\r\n\r\n";
    let (verdict, _) = feed_chunked(Mode::Routing, input, 64);
    assert_eq!(verdict, Verdict::Malformed(ParseError::UnexpectedRequestLine));
}

#[test]
fn test_overflow_without_terminator() {
    let mut parser = RequestParser::new(Mode::Routing, 32);
    let mut verdict = Verdict::NeedMoreData;
    for _ in 0..10 {
        verdict = parser.feed(b"GET /aaaaaaaa");
        if verdict.is_final() {
            break;
        }
    }
    assert_eq!(verdict, Verdict::Malformed(ParseError::LineTooLong));
}

#[test]
fn test_overflow_on_header_line() {
    let mut parser = RequestParser::new(Mode::Routing, 32);
    assert_eq!(parser.feed(b"GET / HTTP/1.1\r\n"), Verdict::NeedMoreData);
    let long_header = [b'X'; 100];
    assert_eq!(
        parser.feed(&long_header),
        Verdict::Malformed(ParseError::LineTooLong)
    );
}

#[test]
fn test_read_limit_shrinks_with_partial_line() {
    let mut parser = RequestParser::new(Mode::Routing, 64);
    assert_eq!(parser.read_limit(), 64);
    parser.feed(b"GET /abc");
    assert_eq!(parser.read_limit(), 56);
    parser.feed(b" HTTP/1.1\r\n");
    assert_eq!(parser.read_limit(), 64);

    let boundary = RequestParser::new(Mode::Boundary, 64);
    assert_eq!(boundary.read_limit(), 64);
}
