pub mod format;
pub mod xml;

pub use format::{output, render, write_rendered};
pub use xml::{render_xml, write_document};
