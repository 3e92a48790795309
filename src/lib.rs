//! Bookshelf - GraphQL API backend for a book-cataloguing application
//!
//! Users sign up, sign in, create/update/delete books they authored, and
//! mark books as favorites. Everything is served from a single /graphql
//! endpoint.

pub mod app;
pub mod config;
pub mod db;
pub mod graphql;
pub mod services;
