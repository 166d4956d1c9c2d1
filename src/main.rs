use clap::Parser;
use eyre::{Result, WrapErr};
use modxml::cli::Cli;
use modxml::extract::ExtractOptions;
use modxml::output::{output, render};
use modxml::pattern::{filter_by_visibility, filter_classes};
use modxml::{Serializer, SerializerOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the `-v` log level
const LOG_ENV: &str = "MODXML_LOG";

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let rendered = compute(&cli)?;
    output(&rendered, cli.output.as_deref())
}

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Compute the rendered document (testable without I/O)
fn compute(cli: &Cli) -> Result<String> {
    let options = SerializerOptions {
        format: cli.input.module_format(),
        extract: ExtractOptions {
            max_depth: cli.max_depth,
        },
    };

    let serializer = Serializer::with_options(&cli.module, options)?;
    let classes = serializer
        .describe()
        .wrap_err_with(|| format!("Failed to describe {}", cli.module.display()))?;
    let total = classes.len();

    let classes = filter_classes(classes, &cli.patterns);
    let classes = filter_by_visibility(classes, cli.visibility());
    info!(module = %serializer.module_name(), classes = classes.len(), total, "described");

    render(serializer.module_name(), &classes, cli.format, !cli.compact)
}
