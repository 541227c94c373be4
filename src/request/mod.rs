//! Request helper module
//!
//! Stateless readers over a single incoming request: parameters, client
//! address, externally visible URL and raw body.

pub mod body;
pub mod client_ip;
pub mod params;
pub mod url;

pub use body::{raw_post_data, raw_post_data_limited, BodyTooLarge};
pub use client_ip::client_ip;
pub use params::{
    get_date_time, get_float, get_int, get_long, get_string, parameter_map,
    request_parameter_map,
};
pub use url::{request_url_with_query, server_url};
