//! Describe the classes of a code module as a document tree.
//!
//! A module is loaded once into its type tables ([`metadata::LoadedModule`]),
//! the extractor turns those into [`ClassMembers`] descriptors, and the tree
//! builder lays the descriptors out as an `<assembly>` document.
//!
//! ```no_run
//! use modxml::Serializer;
//!
//! let serializer = Serializer::open("tests/fixtures/point.json")?;
//! let doc = serializer.serialize()?;
//! println!("{}", modxml::output::render_xml(&doc, true)?);
//! # Ok::<(), eyre::Report>(())
//! ```

pub mod cli;
pub mod error;
pub mod extract;
pub mod metadata;
pub mod model;
pub mod output;
pub mod parser;
pub mod pattern;
pub mod tree;
pub mod walk;

pub use error::MetadataError;
pub use extract::ExtractOptions;
pub use metadata::{LoadedModule, ModuleFormat};
pub use model::{ChildField, ClassMembers, Field, Method, Param};
pub use tree::{Document, Element};

use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializerOptions {
    /// Read the module as this format instead of detecting it from the path
    pub format: Option<ModuleFormat>,
    pub extract: ExtractOptions,
}

/// A loaded module, ready to be described any number of times
#[derive(Debug, Clone)]
pub struct Serializer {
    module: LoadedModule,
    options: SerializerOptions,
}

impl Serializer {
    /// Load the module at `path` with default options
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MetadataError> {
        Self::with_options(path, SerializerOptions::default())
    }

    pub fn with_options(path: impl AsRef<Path>, options: SerializerOptions) -> Result<Self, MetadataError> {
        let module = metadata::load(path.as_ref(), options.format)?;
        Ok(Self::from_module(module, options))
    }

    /// Wrap type tables produced by some other metadata source
    pub fn from_module(module: LoadedModule, options: SerializerOptions) -> Self {
        Serializer { module, options }
    }

    pub fn module_name(&self) -> &str {
        &self.module.name
    }

    pub fn module(&self) -> &LoadedModule {
        &self.module
    }

    /// Class descriptors of the module, one per class, in module order
    pub fn describe(&self) -> Result<Vec<ClassMembers>, MetadataError> {
        extract::extract(&self.module, self.options.extract)
    }

    /// Build a fresh document for the module
    pub fn serialize(&self) -> Result<Document, MetadataError> {
        let classes = self.describe()?;
        Ok(tree::build_document(&self.module.name, &classes))
    }
}
