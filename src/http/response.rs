/// Token sent in the `Server` header of every response.
pub const SERVER_TOKEN: &str = "http-redirect";

/// HTTP status codes this server can answer with.
///
/// - `MovedPermanently` (301): every well-formed request
/// - `BadRequest` (400): every malformed request, whatever the cause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 301 Moved Permanently
    MovedPermanently,
    /// 400 Bad Request
    BadRequest,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use http_redirect::http::response::StatusCode;
    /// assert_eq!(StatusCode::MovedPermanently.as_u16(), 301);
    /// assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::MovedPermanently => 301,
            StatusCode::BadRequest => 400,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::BadRequest => "Bad Request",
        }
    }
}

/// A complete HTTP response head. Responses never carry a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    /// Headers in the order they go on the wire.
    pub headers: Vec<(String, String)>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use http_redirect::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::MovedPermanently)
///     .header("Location", "http://example.com/")
///     .build();
/// assert_eq!(response.header("Server"), Some("http-redirect"));
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    /// Appends a header. Values are copied verbatim, no escaping.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Builds the final Response.
    ///
    /// Appends the `Server` header unless one was set explicitly.
    pub fn build(mut self) -> Response {
        if !self.headers.iter().any(|(k, _)| k == "Server") {
            self.headers.push(("Server".to_string(), SERVER_TOKEN.to_string()));
        }

        Response {
            status: self.status,
            headers: self.headers,
        }
    }
}

impl Response {
    /// 301 pointing at `destination`.
    pub fn redirect(destination: impl Into<String>) -> Self {
        ResponseBuilder::new(StatusCode::MovedPermanently)
            .header("Location", destination)
            .build()
    }

    /// The one response for every malformed request.
    pub fn bad_request() -> Self {
        ResponseBuilder::new(StatusCode::BadRequest).build()
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
