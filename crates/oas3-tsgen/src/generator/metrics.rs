use strum::Display;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationStats {
  pub declarations_generated: usize,
  pub selectors_generated: usize,
  pub operations_converted: usize,
  pub common_declarations: usize,
  pub private_declarations: usize,
  pub files_generated: usize,
  pub orphaned_schemas_count: usize,
  pub cycles_detected: usize,
  pub cycle_details: Vec<Vec<String>>,
  pub warnings: Vec<GenerationWarning>,
}

impl GenerationStats {
  pub fn record_declaration(&mut self, is_selector: bool) {
    self.declarations_generated += 1;
    if is_selector {
      self.selectors_generated += 1;
    }
  }

  pub fn record_operations(&mut self, count: usize) {
    self.operations_converted += count;
  }

  pub fn record_tiers(&mut self, common: usize, private: usize) {
    self.common_declarations += common;
    self.private_declarations += private;
  }

  pub fn record_files(&mut self, count: usize) {
    self.files_generated += count;
  }

  pub fn record_orphaned_schemas(&mut self, count: usize) {
    self.orphaned_schemas_count += count;
  }

  pub fn record_cycle(&mut self, cycle: Vec<String>) {
    self.cycles_detected += 1;
    self.cycle_details.push(cycle);
  }

  pub fn record_cycles(&mut self, cycles: impl IntoIterator<Item = Vec<String>>) {
    for cycle in cycles {
      self.record_cycle(cycle);
    }
  }

  pub fn record_warning(&mut self, warning: GenerationWarning) {
    self.warnings.push(warning);
  }

  pub fn record_warnings(&mut self, warnings: impl IntoIterator<Item = GenerationWarning>) {
    for warning in warnings {
      self.record_warning(warning);
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GenerationWarning {
  #[strum(to_string = "Schema '{path}': unknown type '{value}', treated as unknown")]
  UnknownSchemaType { path: String, value: String },
  #[strum(to_string = "[{operation_id}] parameter '{name}' has no schema, treated as unknown")]
  ParameterWithoutSchema { operation_id: String, name: String },
  #[strum(to_string = "Operation id '{original}' is used more than once, renamed to '{renamed}'")]
  DuplicateOperationId { original: String, renamed: String },
}
