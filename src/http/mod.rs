//! HTTP transport layer
//!
//! Request handlers for the todo resource and the static home page.

pub mod handlers;
