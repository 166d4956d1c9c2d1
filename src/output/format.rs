use crate::cli::OutputFormat;
use crate::model::{AssemblyOutput, ClassMembers};
use crate::tree::build_document;
use eyre::{Result, WrapErr};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use super::xml::render_xml;

/// Render a module's descriptors in the requested format
pub fn render(module_name: &str, classes: &[ClassMembers], format: OutputFormat, pretty: bool) -> Result<String> {
    match format {
        OutputFormat::Xml => render_xml(&build_document(module_name, classes), pretty),
        OutputFormat::Json => {
            let data = AssemblyOutput {
                assembly: module_name,
                classes,
            };
            let mut text = if pretty {
                serde_json::to_string_pretty(&data)?
            } else {
                serde_json::to_string(&data)?
            };
            text.push('\n');
            Ok(text)
        }
        OutputFormat::Yaml => {
            let data = AssemblyOutput {
                assembly: module_name,
                classes,
            };
            Ok(serde_yaml::to_string(&data)?)
        }
    }
}

/// Outputs rendered text to a file, or to stdout when no path is given
pub fn output(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => fs::write(path, rendered).wrap_err_with(|| format!("Failed to write {}", path.display())),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_rendered(rendered, &mut handle)
        }
    }
}

/// Write rendered text to a custom writer
pub fn write_rendered<W: Write>(rendered: &str, writer: &mut W) -> Result<()> {
    writer.write_all(rendered.as_bytes())?;
    if !rendered.ends_with('\n') {
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}
