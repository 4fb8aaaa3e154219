//! filedrop: a flat directory of files behind a small HTTP API.
//!
//! Clients `PUT`, `GET`, and `DELETE` files under `/file/{name}` and list
//! them with `GET /file/`. Access may be gated by capabilities that a trusted
//! front proxy writes into a request header.
//!
//! The work is split in two layers:
//!
//! - [`store`]: name validation and the on-disk [`store::FileStore`]
//! - [`http`]: the capability gate, handlers and server wiring

pub use filedrop_http as http;
pub use filedrop_store as store;

pub use filedrop_http::{serve, AccessControl, ServerConfig, ServerError};
