use crate::metadata::ModuleFormat;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "modxml",
    about = "Describe the classes of a code module as an XML document",
    version
)]
pub struct Cli {
    /// Module to describe: a Python file or package, or a JSON/YAML type table
    #[arg(value_name = "MODULE")]
    pub module: PathBuf,

    /// Patterns to filter classes by name (prefix match, then contains)
    #[arg(value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Xml)]
    pub format: OutputFormat,

    /// How to read the module (default: detect from the path)
    #[arg(short, long, value_enum, default_value_t = InputFormat::Auto)]
    pub input: InputFormat,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Emit without indentation
    #[arg(long)]
    pub compact: bool,

    /// Nested levels a child-class field may expand to
    #[arg(long, value_name = "N", default_value_t = crate::extract::DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Show only public fields/methods
    #[arg(long, conflicts_with = "non_public")]
    pub public: bool,

    /// Show only non-public fields/methods
    #[arg(long, conflicts_with = "public")]
    pub non_public: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Xml,
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    #[default]
    Auto,
    Python,
    Json,
    Yaml,
}

impl InputFormat {
    pub fn module_format(self) -> Option<ModuleFormat> {
        match self {
            InputFormat::Auto => None,
            InputFormat::Python => Some(ModuleFormat::Python),
            InputFormat::Json => Some(ModuleFormat::Json),
            InputFormat::Yaml => Some(ModuleFormat::Yaml),
        }
    }
}

/// Visibility filter for fields/methods
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    All,
    Public,
    NonPublic,
}

impl Visibility {
    pub fn from_flags(public: bool, non_public: bool) -> Self {
        match (public, non_public) {
            (true, false) => Visibility::Public,
            (false, true) => Visibility::NonPublic,
            _ => Visibility::All,
        }
    }
}

impl Cli {
    pub fn visibility(&self) -> Visibility {
        Visibility::from_flags(self.public, self.non_public)
    }

    /// Log filter directive derived from `-v`
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
