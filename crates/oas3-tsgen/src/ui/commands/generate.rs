use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use chrono::{Local, Timelike};
use crossterm::style::Stylize;

use crate::{
  generator::{
    files::{FlatLayout, PathStrategy, TreeLayout},
    metrics::GenerationStats,
    orchestrator::{Compilation, CompileConfig, Orchestrator, SchemaScope},
  },
  ui::{Colors, GenerateCommand, LayoutMode},
  utils::{
    output::{DirectorySink, FileSink, write_all},
    spec::{FsDocumentSource, SpecLoader, load_document_set},
  },
};

const MANIFEST_PATH: &str = "operations.json";

fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}

#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct GenerateConfig {
  pub input: PathBuf,
  pub output: PathBuf,
  pub layout: LayoutMode,
  pub header: Option<String>,
  pub manifest: bool,
  pub all_schemas: bool,
  pub verbose: bool,
  pub quiet: bool,
}

impl GenerateConfig {
  pub fn from_command(command: GenerateCommand) -> anyhow::Result<Self> {
    let GenerateCommand {
      input,
      output,
      layout,
      header,
      manifest,
      all_schemas,
      verbose,
      quiet,
    } = command;

    if verbose && quiet {
      anyhow::bail!("--verbose and --quiet cannot be combined");
    }

    let header = header.or_else(|| Some(default_header(&input)));

    Ok(Self {
      input,
      output,
      layout,
      header,
      manifest,
      all_schemas,
      verbose,
      quiet,
    })
  }

  fn compile_config(&self) -> CompileConfig {
    let layout: Arc<dyn PathStrategy> = match self.layout {
      LayoutMode::Tree => Arc::new(TreeLayout),
      LayoutMode::Flat => Arc::new(FlatLayout),
    };
    let schema_scope = if self.all_schemas {
      SchemaScope::All
    } else {
      SchemaScope::Reachable
    };

    CompileConfig::builder()
      .schema_scope(schema_scope)
      .layout(layout)
      .maybe_file_header(self.header.clone())
      .build()
  }

  async fn compile(&self) -> anyhow::Result<Compilation> {
    let loader = SpecLoader::open(&self.input).await?;
    let root = loader
      .document()
      .with_context(|| format!("failed to parse {}", self.input.display()))?;
    let documents = load_document_set(root, &FsDocumentSource::new(&self.input)).await?;

    Orchestrator::new(documents, self.compile_config())
      .compile()
      .with_context(|| format!("failed to compile {}", self.input.display()))
  }

  async fn write_output(&self, sink: &impl FileSink, compilation: &Compilation) -> anyhow::Result<()> {
    write_all(sink, &compilation.files).await?;
    if self.manifest {
      sink.write(MANIFEST_PATH, &compilation.manifest()?).await?;
    }
    Ok(())
  }
}

/// `// Generated from <file name>. Do not edit by hand.`
fn default_header(input: &std::path::Path) -> String {
  let source = input
    .file_name()
    .map_or_else(|| input.display().to_string(), |name| name.to_string_lossy().into_owned());
  format!("// Generated by oas3-tsgen from {source}. Do not edit by hand.")
}

struct GenerateLogger<'a> {
  config: &'a GenerateConfig,
  colors: &'a Colors,
}

impl<'a> GenerateLogger<'a> {
  fn new(config: &'a GenerateConfig, colors: &'a Colors) -> Self {
    Self { config, colors }
  }

  fn info(&self, message: &str) {
    if !self.config.quiet {
      println!("{} {message}", format_timestamp().with(self.colors.timestamp()));
    }
  }

  fn detail(&self, message: &str) {
    if self.config.verbose {
      self.info(message);
    }
  }

  fn stat(&self, label: &str, value: String) {
    if !self.config.quiet {
      println!(
        "            {:<25} {}",
        label.with(self.colors.label()),
        value.with(self.colors.value())
      );
    }
  }

  fn log_loading(&self) {
    self.info(
      &format!("Loading OpenAPI spec from: {}", self.config.input.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_document(&self, loader: &SpecLoader) {
    if let Ok(spec) = loader.parse() {
      self.detail(&format!(
        "{} {} (OpenAPI {})",
        spec.info.title, spec.info.version, spec.openapi
      ));
    }
  }

  fn log_compiling(&self) {
    self.info(&"Compiling TypeScript declarations...".with(self.colors.primary()).to_string());
  }

  fn print_statistics(&self, stats: &GenerationStats) {
    if self.config.quiet {
      return;
    }

    self.stat("Declarations generated:", stats.declarations_generated.to_string());
    if stats.selectors_generated > 0 {
      self.stat("", format!("{} selectors", stats.selectors_generated));
    }
    self.stat("Operations converted:", stats.operations_converted.to_string());
    self.stat(
      "Shared declarations:",
      format!(
        "{} common, {} private",
        stats.common_declarations, stats.private_declarations
      ),
    );
    self.stat("Files generated:", stats.files_generated.to_string());
    if !stats.warnings.is_empty() {
      self.stat("Warnings:", stats.warnings.len().to_string());
    }

    self.print_cycles(stats);
    self.print_orphaned_schemas(stats);
    self.print_warnings(stats);
  }

  fn print_cycles(&self, stats: &GenerationStats) {
    if stats.cycles_detected == 0 {
      return;
    }

    self.stat("Cycles:", stats.cycles_detected.to_string());

    if self.config.verbose {
      for (i, cycle) in stats.cycle_details.iter().enumerate() {
        println!(
          "              {}: {}",
          format!("Cycle {}", i + 1).with(self.colors.accent()),
          cycle.join(" -> ").with(self.colors.primary())
        );
      }
    }
  }

  fn print_orphaned_schemas(&self, stats: &GenerationStats) {
    if stats.orphaned_schemas_count > 0 && self.config.verbose {
      self.stat("Orphaned schemas:", stats.orphaned_schemas_count.to_string());
    }
  }

  fn print_warnings(&self, stats: &GenerationStats) {
    if stats.warnings.is_empty() || !self.config.verbose {
      return;
    }

    println!();
    for warning in &stats.warnings {
      eprintln!(
        "{} {}",
        "Warning:".with(self.colors.accent()),
        warning.to_string().with(self.colors.primary())
      );
    }
  }

  fn log_writing(&self, compilation: &Compilation) {
    self.info(
      &format!("Writing to: {}", self.config.output.display())
        .with(self.colors.primary())
        .to_string(),
    );
    for file in &compilation.files {
      self.detail(&format!("  {}", file.path));
    }
    if self.config.manifest {
      self.detail(&format!("  {MANIFEST_PATH}"));
    }
  }

  fn log_success(&self) {
    if !self.config.quiet {
      println!();
      println!(
        "{} {}",
        format_timestamp().with(self.colors.timestamp()),
        "Successfully generated TypeScript declarations".with(self.colors.success())
      );
    }
  }
}

pub async fn generate_code(config: GenerateConfig, colors: &Colors) -> anyhow::Result<()> {
  let logger = GenerateLogger::new(&config, colors);

  logger.log_loading();
  if config.verbose {
    logger.log_document(&SpecLoader::open(&config.input).await?);
  }

  logger.log_compiling();
  let compilation = config.compile().await?;
  logger.print_statistics(&compilation.stats);

  logger.log_writing(&compilation);
  config
    .write_output(&DirectorySink::new(&config.output), &compilation)
    .await?;

  logger.log_success();
  Ok(())
}
