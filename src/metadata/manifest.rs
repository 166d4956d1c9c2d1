//! Type-table manifests exported by a compiler toolchain.
//!
//! Format (JSON or YAML):
//!   name: <module name>
//!   version: <optional>
//!   types:
//!     - namespace: <ns>
//!       name: <simple name>
//!       kind: class | interface | struct | enum
//!       bases: [<name>]
//!       fields: [{ name, type, access }]
//!       methods: [{ name, access, return_type, params: [{ name, type }] }]

use super::{FieldDef, LoadedModule, MethodDef, ParamDef, TypeDef, TypeKind};
use crate::error::MetadataError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    types: Vec<ManifestType>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestType {
    #[serde(default)]
    namespace: String,
    name: String,
    #[serde(default)]
    kind: TypeKind,
    #[serde(default)]
    bases: Vec<String>,
    #[serde(default)]
    fields: Vec<ManifestField>,
    #[serde(default)]
    methods: Vec<ManifestMethod>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestField {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default = "default_access")]
    access: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestMethod {
    name: String,
    #[serde(default = "default_access")]
    access: String,
    #[serde(default = "default_return_type")]
    return_type: String,
    #[serde(default)]
    params: Vec<ManifestParam>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestParam {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
}

fn default_access() -> String {
    "public".to_string()
}

fn default_return_type() -> String {
    "Void".to_string()
}

pub fn load_json(path: &Path) -> Result<LoadedModule, MetadataError> {
    let source = read(path)?;
    let manifest: Manifest = serde_json::from_str(&source)
        .map_err(|e| MetadataError::load_with(path, "malformed JSON type table", e))?;
    Ok(manifest.into())
}

pub fn load_yaml(path: &Path) -> Result<LoadedModule, MetadataError> {
    let source = read(path)?;
    let manifest: Manifest = serde_yaml::from_str(&source)
        .map_err(|e| MetadataError::load_with(path, "malformed YAML type table", e))?;
    Ok(manifest.into())
}

fn read(path: &Path) -> Result<String, MetadataError> {
    fs::read_to_string(path).map_err(|e| MetadataError::load_with(path, "cannot read file", e))
}

impl From<Manifest> for LoadedModule {
    fn from(manifest: Manifest) -> Self {
        let name = match manifest.version {
            Some(version) => format!("{}, Version={}", manifest.name, version),
            None => manifest.name,
        };
        LoadedModule {
            name,
            types: manifest.types.into_iter().map(TypeDef::from).collect(),
        }
    }
}

impl From<ManifestType> for TypeDef {
    fn from(ty: ManifestType) -> Self {
        TypeDef {
            namespace: ty.namespace,
            name: ty.name,
            kind: ty.kind,
            bases: ty.bases,
            fields: ty
                .fields
                .into_iter()
                .map(|f| FieldDef {
                    name: f.name,
                    type_name: f.type_name,
                    access: f.access,
                })
                .collect(),
            methods: ty
                .methods
                .into_iter()
                .map(|m| MethodDef {
                    name: m.name,
                    access: m.access,
                    return_type: m.return_type,
                    params: m
                        .params
                        .into_iter()
                        .map(|p| ParamDef {
                            name: p.name,
                            type_name: p.type_name,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
