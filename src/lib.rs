//! Web tooling around HTTP conditional responses.
//!
//! The core is [`http::emit`], which writes cached text content with an
//! `ETag` and answers matching `If-None-Match` requests with `304 Not
//! Modified`. Around it sit request helpers (parameters, client IP,
//! URLs, raw POST bodies), a named filter registry, a small job scheduler
//! and a demo server that ties them together.

pub mod config;
pub mod filter;
pub mod handler;
pub mod http;
pub mod jobs;
pub mod logger;
pub mod request;
pub mod server;
