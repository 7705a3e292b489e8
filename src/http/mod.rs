//! Session transport, the checking page client and token extraction.
mod client;
mod tokens;
mod transport;


pub use client::{Check, Condition, PageClient, PageResponse};
pub use tokens::{
    Crumb, CsrfToken, crumb_or_fail, crumb_rotated_or_fail, extract_crumb, extract_csrf_meta,
};
pub use transport::{
    ClientSettings, DEFAULT_USER_AGENT, OutboundRequest, RawResponse, ReqwestSessionFactory,
    ReqwestTransport, RequestBody, SessionFactory, Transport,
};
