//! webex-report: HTML rendering of section summaries and grade reports.

pub mod html;

pub use html::{generate_html, render_domain_table, render_section_html, write_html_report};
