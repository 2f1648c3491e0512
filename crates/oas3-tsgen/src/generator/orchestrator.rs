//! Orchestration of one compilation run.
//!
//! ## Usage
//!
//! ```no_run
//! use oas3_tsgen::generator::{orchestrator::{CompileConfig, Orchestrator}, resolver::DocumentSet};
//!
//! # fn example(root: serde_json::Value) -> anyhow::Result<()> {
//! let orchestrator = Orchestrator::new(DocumentSet::new(root), CompileConfig::default());
//! let compilation = orchestrator.compile()?;
//!
//! for file in &compilation.files {
//!   println!("{}: {} bytes", file.path, file.contents.len());
//! }
//! # Ok(())
//! # }
//! ```

use std::{
  collections::{HashMap, HashSet},
  sync::Arc,
};

use serde::Serialize;
use serde_json::Value;

use crate::generator::{
  common::{CommonDependencies, extract_common_dependencies},
  descriptor::{DescriptorContext, DescriptorId},
  errors::CompileResult,
  files::{DeclarationUnit, FileAssembler, GeneratedFile, PathStrategy, Placement, TreeLayout},
  metrics::GenerationStats,
  naming::fingerprint::SchemaFingerprint,
  operations::{Operation, extract_operations},
  render::Renderer,
  resolver::DocumentSet,
  schema::Pointer,
};

/// Which declarations a run emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaScope {
  /// Only declarations reachable from operations.
  #[default]
  Reachable,
  /// Every component schema as well; unreferenced ones land in the shared tier.
  All,
}

#[derive(Clone, bon::Builder)]
pub struct CompileConfig {
  #[builder(default)]
  pub schema_scope: SchemaScope,
  #[builder(default = Arc::new(TreeLayout))]
  pub layout: Arc<dyn PathStrategy>,
  /// Text placed verbatim at the top of every emitted file.
  pub file_header: Option<String>,
}

impl Default for CompileConfig {
  fn default() -> Self {
    Self::builder().build()
  }
}

/// The compiled operation list, the contract for client or server generation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSummary {
  pub id: String,
  pub method: String,
  pub path: String,
  pub query_parameters: Vec<String>,
  pub servers: Vec<String>,
  pub parameters: Option<String>,
  pub request: Option<String>,
  pub response: Option<String>,
  pub common_dependencies: Vec<String>,
  pub private_dependencies: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Compilation {
  pub files: Vec<GeneratedFile>,
  pub operations: Vec<OperationSummary>,
  pub stats: GenerationStats,
}

impl Compilation {
  /// `operations.json` contents.
  pub fn manifest(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&self.operations)
  }
}

/// Runs the pipeline: schema nodes, descriptors, operations, common tier, files.
///
/// Each call to [`Orchestrator::compile`] uses a fresh context, so compiling twice yields
/// identical output.
pub struct Orchestrator {
  documents: DocumentSet,
  config: CompileConfig,
}

impl Orchestrator {
  pub fn new(documents: DocumentSet, config: CompileConfig) -> Self {
    Self { documents, config }
  }

  pub fn compile(&self) -> CompileResult<Compilation> {
    let mut ctx = DescriptorContext::new(&self.documents);
    let mut stats = GenerationStats::default();

    let components = self.component_pointers();
    self.claim_component_names(&mut ctx, &components)?;
    if self.config.schema_scope == SchemaScope::All {
      for pointer in &components {
        ctx.convert_named(pointer)?;
      }
    }

    let mut operation_warnings = vec![];
    let operations = extract_operations(&mut ctx, &mut operation_warnings)?;
    stats.record_warnings(ctx.resolver.take_warnings());
    stats.record_warnings(operation_warnings);
    stats.record_operations(operations.len());
    stats.record_cycles(ctx.cycles().iter().cloned());

    let renderer = Renderer::new(&ctx);
    let mut texts: HashMap<DescriptorId, String> = HashMap::new();
    for id in ctx.ids() {
      if ctx.get(id).is_declaration() {
        texts.insert(id, renderer.declaration(id)?);
      }
    }

    let shared = extract_common_dependencies(
      operations.iter().map(|operation| operation.all_dependencies.clone()).collect(),
      |id| texts.get(&id).map(String::as_str),
      |id| ctx.get(id).display_name().to_string(),
    )?;

    let units = Self::declaration_units(&ctx, &operations, &shared, &texts);
    for unit in &units {
      let is_selector = ctx.lookup_name(&unit.name).is_some_and(|id| ctx.get(id).is_selector());
      stats.record_declaration(is_selector);
    }
    let private_count = (0..operations.len()).map(|index| shared.private(index).len()).sum();
    stats.record_tiers(shared.common.len(), private_count);

    let reachable = Self::reachable_names(&ctx, &operations);
    let orphaned = components
      .iter()
      .filter(|pointer| {
        ctx
          .lookup(pointer)
          .is_none_or(|id| !reachable.contains(ctx.get(id).display_name()))
      })
      .count();
    stats.record_orphaned_schemas(orphaned);

    let assembler = FileAssembler::new(self.config.layout.as_ref(), self.config.file_header.as_deref());
    let files = assembler.assemble(&units)?;
    stats.record_files(files.len());

    let summaries = operations
      .iter()
      .enumerate()
      .map(|(index, operation)| Self::summarize(&ctx, operation, &shared, index))
      .collect();

    Ok(Compilation {
      files,
      operations: summaries,
      stats,
    })
  }

  fn component_pointers(&self) -> Vec<Pointer> {
    let base = Pointer::root("").child("components").child("schemas");
    self
      .documents
      .root()
      .pointer("/components/schemas")
      .and_then(Value::as_object)
      .map(|schemas| schemas.keys().map(|name| base.child(name)).collect())
      .unwrap_or_default()
  }

  /// Root components claim their names before anything else, so they keep them even when an
  /// operation role or an external schema would derive the same name.
  fn claim_component_names(&self, ctx: &mut DescriptorContext<'_>, components: &[Pointer]) -> CompileResult<()> {
    for pointer in components {
      let raw = ctx.resolver.raw(pointer, pointer)?;
      let base = pointer.last_segment().unwrap_or_default();
      ctx
        .naming
        .name_for(pointer, &base, SchemaFingerprint::of_schema(raw, pointer.document()))?;
    }
    Ok(())
  }

  /// Roles and private declarations per operation, then the common tier, then anything else
  /// converted (unreferenced components under [`SchemaScope::All`]). Names are unique per
  /// text, so the first unit with a name stands for every descriptor rendering to it.
  fn declaration_units(
    ctx: &DescriptorContext<'_>,
    operations: &[Operation],
    shared: &CommonDependencies<DescriptorId>,
    texts: &HashMap<DescriptorId, String>,
  ) -> Vec<DeclarationUnit> {
    let mut units = vec![];
    let mut emitted: HashSet<String> = HashSet::new();
    let mut emit = |id: DescriptorId, placement: Placement| {
      let descriptor = ctx.get(id);
      let Some(text) = texts.get(&id) else {
        return;
      };
      if !emitted.insert(descriptor.display_name().to_string()) {
        return;
      }
      units.push(DeclarationUnit {
        name: descriptor.display_name().to_string(),
        text: text.clone(),
        placement,
        dependencies: ctx
          .declared_dependencies(id)
          .into_iter()
          .map(|dependency| ctx.get(dependency).display_name().to_string())
          .collect(),
      });
    };

    for (index, operation) in operations.iter().enumerate() {
      for id in operation.roles().into_iter().chain(shared.private(index)) {
        emit(id, Placement::Operation(operation.id.clone()));
      }
    }
    for id in &shared.common {
      emit(*id, Placement::Common);
    }
    for id in ctx.ids() {
      emit(id, Placement::Common);
    }

    units
  }

  fn reachable_names(ctx: &DescriptorContext<'_>, operations: &[Operation]) -> HashSet<String> {
    operations
      .iter()
      .flat_map(|operation| operation.roles().into_iter().chain(operation.all_dependencies.iter().copied()))
      .map(|id| ctx.get(id).display_name().to_string())
      .collect()
  }

  fn summarize(
    ctx: &DescriptorContext<'_>,
    operation: &Operation,
    shared: &CommonDependencies<DescriptorId>,
    index: usize,
  ) -> OperationSummary {
    let name = |id: DescriptorId| ctx.get(id).display_name().to_string();
    let list = shared.per_operation.get(index).cloned().unwrap_or_default();

    OperationSummary {
      id: operation.id.clone(),
      method: operation.method.to_string(),
      path: operation.path.clone(),
      query_parameters: operation.query_parameters.clone(),
      servers: operation.servers.clone(),
      parameters: operation.parameters.map(name),
      request: operation.request.map(name),
      response: operation.response.map(name),
      common_dependencies: list.into_iter().filter(|id| shared.is_common(*id)).map(name).collect(),
      private_dependencies: shared.private(index).into_iter().map(name).collect(),
    }
  }
}
