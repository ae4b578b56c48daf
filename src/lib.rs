//! Bundle a project's source files into a single (optionally chunked) text
//! file for pasting into an LLM prompt.

pub mod app;
