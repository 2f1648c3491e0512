use std::path::Path;

use anyhow::Context;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};

use crate::{
  generator::orchestrator::{CompileConfig, OperationSummary, Orchestrator},
  ui::{Colors, colors::table_color, term_width},
  utils::spec::{FsDocumentSource, SpecLoader, load_document_set},
};

/// Operations as the generator names them, ordered by id.
async fn load_operations(input: &Path) -> anyhow::Result<Vec<OperationSummary>> {
  let root = SpecLoader::open(input).await?.document()?;
  let documents = load_document_set(root, &FsDocumentSource::new(input)).await?;
  let mut operations = Orchestrator::new(documents, CompileConfig::default())
    .compile()
    .with_context(|| format!("failed to compile {}", input.display()))?
    .operations;
  operations.sort_by(|a, b| a.id.cmp(&b.id));
  Ok(operations)
}

pub async fn list_operations(input: &Path, colors: &Colors) -> anyhow::Result<()> {
  let operations = load_operations(input).await?;

  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut row = Row::new();
  row.add_cell(Cell::new("OPERATION ID").fg(table_color(colors.label())));
  row.add_cell(Cell::new("METHOD").fg(table_color(colors.label())));
  row.add_cell(Cell::new("PATH").fg(table_color(colors.label())));
  table.set_header(row);

  for operation in operations {
    let mut row = Row::new();
    row.add_cell(
      Cell::new(operation.id)
        .fg(table_color(colors.value()))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(
      Cell::new(operation.method)
        .fg(table_color(colors.accent()))
        .set_alignment(CellAlignment::Right),
    );
    row.add_cell(Cell::new(operation.path).fg(table_color(colors.primary())));
    table.add_row(row);
  }

  println!("{table}");

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn operations_are_sorted_by_id() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("api.yaml");
    let document = "\
openapi: 3.0.3
info:
  title: Pets
  version: '1'
paths:
  /pets:
    post:
      operationId: createPet
      responses:
        '201':
          description: created
    get:
      responses:
        '200':
          description: ok
";
    tokio::fs::write(&input, document).await.unwrap();

    let operations = load_operations(&input).await.unwrap();
    let ids: Vec<_> = operations.iter().map(|operation| operation.id.as_str()).collect();
    assert_eq!(ids, vec!["createPet", "get_pets"]);
    assert_eq!(operations[1].method, "GET");
  }
}
