//! A small async client for the REST API Gradio apps expose.
//!
//! Covers what a scripted caller needs: config discovery, file upload, calling a
//! named endpoint through the `/call` queue and downloading file outputs.

mod client;
pub mod types;

pub use client::{Client, Prediction, connect};
pub use types::{FileData, SseEvent, parse_sse};
