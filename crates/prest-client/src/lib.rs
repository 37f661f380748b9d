//! Client for the [pREST](https://prestd.com) REST gateway.
//!
//! pREST exposes PostgreSQL tables over HTTP and encodes filtering, joins,
//! aggregation and pagination as query parameters. This crate builds those
//! URLs with a chainable [`QueryBuilder`], sends them through a
//! [`Transport`] and decodes the response.
//!
//! # Example
//!
//! ```no_run
//! use prest_client::{Client, ClientOptions};
//!
//! let client = Client::new(ClientOptions::new(
//!     "http://localhost:3000",
//!     "prest",
//!     "prest",
//!     "northwind",
//! ))?;
//!
//! // GET /northwind/shop/products?_page=1&_select=id%2Cname
//! let products = client
//!     .table("shop.products")?
//!     .list()
//!     .page(1)
//!     .select(["id", "name"])
//!     .execute()?;
//! println!("{products}");
//! # Ok::<(), prest_client::PrestError>(())
//! ```

pub mod client;
pub mod config;
pub mod encoding;
pub mod error;
pub mod method;
pub mod query;
pub mod table;
pub mod transport;

#[cfg(test)]
pub mod test_utils;

pub use client::{Client, Table};
pub use config::ClientOptions;
pub use error::{ConfigError, PrestError, Result};
pub use method::Method;
pub use query::{AggregateFn, FilterOp, JoinKind, QueryBuilder, QueryOutput, Renderer};
pub use table::TableRef;
pub use transport::{HttpRequest, HttpResponse, Transport, TransportConfig, UreqTransport};
