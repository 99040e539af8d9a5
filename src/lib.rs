//! Tickerd - Stock Quote HTTP Server
//!
//! Core library for the HTTP layer, routing, authorization, and data loading.

pub mod auth;
pub mod config;
pub mod data;
pub mod handlers;
pub mod http;
pub mod router;
pub mod server;
