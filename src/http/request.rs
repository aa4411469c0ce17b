use bytes::{BufMut, Bytes, BytesMut};

/// Request methods recognized on the request line.
///
/// Anything else in front of the URI makes the request malformed. Matching
/// is case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Submit data
    POST,
    /// HEAD - Like GET but without the response body
    HEAD,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::HEAD => "HEAD",
        }
    }

    /// Splits a request line into its method and the rest after the
    /// separating space. The method token must be followed by exactly one
    /// space to count.
    pub(crate) fn strip_from(line: &[u8]) -> Option<(Method, &[u8])> {
        [Method::GET, Method::POST, Method::HEAD]
            .into_iter()
            .find_map(|method| {
                let token = method.as_str().as_bytes();
                line.strip_prefix(token)
                    .and_then(|rest| rest.strip_prefix(b" "))
                    .map(|rest| (method, rest))
            })
    }
}

/// What the routing parser extracts from a request head.
///
/// Values are raw bytes copied verbatim from the wire: no decoding, no
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: Method,
    pub uri: Bytes,
    /// Value of the `Host: ` line, if any.
    pub host: Option<Bytes>,
}

impl RequestHead {
    /// Host immediately followed by URI, without separator. A request without
    /// a Host line contributes only its URI.
    pub fn routing_key(&self) -> Bytes {
        let host = self.host.as_deref().unwrap_or_default();
        let mut key = BytesMut::with_capacity(host.len() + self.uri.len());
        key.put_slice(host);
        key.put_slice(&self.uri);
        key.freeze()
    }
}
