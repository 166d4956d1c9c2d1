//! Module metadata: the type tables a loaded module exposes.
//!
//! Every backend turns its input into a [`LoadedModule`], which is the only
//! thing the extractor ever sees.

pub mod manifest;
pub mod python;

use crate::error::MetadataError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A module whose type metadata has been read into memory
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadedModule {
    /// Identifying name, used for the root element
    pub name: String,
    pub types: Vec<TypeDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Struct,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeDef {
    pub namespace: String,
    pub name: String,
    pub kind: TypeKind,
    /// Declared base types and implemented interfaces, in declaration order
    pub bases: Vec<String>,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub type_name: String,
    pub access: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDef {
    pub name: String,
    pub access: String,
    pub return_type: String,
    pub params: Vec<ParamDef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDef {
    pub name: String,
    pub type_name: String,
}

impl TypeDef {
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

/// Input formats a module can be read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleFormat {
    /// A Python module file or package directory
    Python,
    /// A JSON type-table manifest
    Json,
    /// A YAML type-table manifest
    Yaml,
}

impl ModuleFormat {
    /// Guess the format from the path: directories and `.py` files are Python
    pub fn detect(path: &Path) -> Option<Self> {
        if path.is_dir() {
            return Some(ModuleFormat::Python);
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("py") => Some(ModuleFormat::Python),
            Some("json") => Some(ModuleFormat::Json),
            Some("yaml") | Some("yml") => Some(ModuleFormat::Yaml),
            _ => None,
        }
    }
}

/// Load a module, detecting its format from the path unless one is given
pub fn load(path: &Path, format: Option<ModuleFormat>) -> Result<LoadedModule, MetadataError> {
    if !path.exists() {
        return Err(MetadataError::load(path, "path does not exist"));
    }

    let format = match format.or_else(|| ModuleFormat::detect(path)) {
        Some(format) => format,
        None => return Err(MetadataError::load(path, "unsupported module format")),
    };
    debug!(path = %path.display(), ?format, "loading module");

    let module = match format {
        ModuleFormat::Python => python::load(path)?,
        ModuleFormat::Json => manifest::load_json(path)?,
        ModuleFormat::Yaml => manifest::load_yaml(path)?,
    };

    debug!(module = %module.name, types = module.types.len(), "module loaded");
    Ok(module)
}
