//! HTTP API for reference extraction.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! scripture-ref serve
//!
//! # Custom port, bind to all interfaces, custom catalog
//! scripture-ref serve --port 3000 --address 0.0.0.0 --catalog books.json
//! ```
//!
//! ## API Endpoints
//!
//! - `POST /api/extract` - `{text}` to `{references, stats}`
//! - `POST /api/spans` - `{text}` to `{spans}` (BOOK/CHAPTER labels)
//! - `POST /api/normalize` - `{candidates, response?}` to `{references}`
//! - `GET /api/catalog` - List all books in the catalog
//! - `GET /api/stats` - Resolution counters since startup

pub mod server;
