//! http-redirect - answer every HTTP request with a 301
//!
//! Core library: request parsing, redirect rules and the single-threaded
//! connection multiplexer.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod redirect;
pub mod server;
