//! simulado-report: Results page generation.
//!
//! Renders a finished exam as a self-contained HTML page.

pub mod html;

pub use html::{generate_html, write_html_report};
