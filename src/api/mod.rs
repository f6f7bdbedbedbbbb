//! API Module
//!
//! HTTP handlers and routing exposing the document cache as a REST API.
//! Values are arbitrary JSON stored as `JsonDocument`.
//!
//! # Endpoints
//! - `PUT /docs/:key` - Store a plain entry
//! - `GET /docs/:key` - Read a plain entry
//! - `DELETE /docs/:key` - Remove a plain entry
//! - `PUT /docs/:key/specific` - Store a specific entry
//! - `GET /docs/:key/specific[/:sub_key]` - Read a specific entry
//! - `DELETE /docs/:key/specific[/:sub_key]` - Remove specific entries
//! - `DELETE /docs` - Clear the collection
//! - `GET /count` - Count live entries
//! - `GET /stats` - Get read statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
