use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use super::colors::{ColorMode, ThemeMode};

#[derive(Parser, Debug)]
#[command(name = "oas3-tsgen")]
#[command(author, version, about = "OpenAPI to TypeScript declaration compiler")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// List information from OpenAPI specification
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
  /// Compile an OpenAPI specification into TypeScript declaration files
  Generate(GenerateCommand),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateCommand {
  /// Path to the OpenAPI specification file (JSON or YAML)
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Directory the declaration files are written to
  #[arg(short, long, value_name = "DIR")]
  pub output: PathBuf,

  /// How declaration files are laid out in the output directory
  #[arg(short, long, value_enum, default_value = "tree")]
  pub layout: LayoutMode,

  /// Comment written at the top of every generated file
  #[arg(long, value_name = "TEXT")]
  pub header: Option<String>,

  /// Also write operations.json describing every compiled operation
  #[arg(long, default_value_t = false)]
  pub manifest: bool,

  /// Generate all component schemas, including ones no operation references
  #[arg(long, default_value_t = false)]
  pub all_schemas: bool,

  /// Enable verbose output with detailed progress information
  #[arg(short, long, default_value_t = false)]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LayoutMode {
  /// `common/` for shared declarations, `operations/<id>/` for the rest
  #[default]
  Tree,
  /// Every file next to `index.ts`
  Flat,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List all operations defined in the OpenAPI specification
  Operations {
    /// Path to the OpenAPI specification file (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
  },
}
