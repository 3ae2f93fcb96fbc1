//! conversion-service: DOCX to PDF over HTTP.
//!
//! An upload is staged to a temp file, turned into HTML by pandoc, rendered
//! to PDF by wkhtmltopdf with network access and scripting disabled, and
//! returned as an attachment. Temp files never outlive the request.
pub mod config;
pub mod converters;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod startup;
