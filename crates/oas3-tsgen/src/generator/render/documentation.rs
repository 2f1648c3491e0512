use itertools::Itertools;

/// Renders a JSDoc block at `indent`, one ` * ` line per source line. Returns an empty string
/// for blank documentation.
pub(crate) fn doc_block(text: &str, indent: usize) -> String {
  let lines = doc_lines(text);
  let pad = " ".repeat(indent);
  match lines.as_slice() {
    [] => String::new(),
    [single] => format!("{pad}/** {single} */\n"),
    many => {
      let mut block = format!("{pad}/**\n");
      for line in many {
        if line.is_empty() {
          block.push_str(&format!("{pad} *\n"));
        } else {
          block.push_str(&format!("{pad} * {line}\n"));
        }
      }
      block.push_str(&format!("{pad} */\n"));
      block
    }
  }
}

/// Single-line comment placed in front of an expression, e.g. a selector leaf.
pub(crate) fn inline_doc(text: &str) -> Option<String> {
  let lines = doc_lines(text);
  if lines.is_empty() {
    return None;
  }
  let joined = lines.iter().map(|line| line.trim()).filter(|line| !line.is_empty()).join(" ");
  Some(format!("/** {joined} */"))
}

/// Trimmed lines with a comment terminator neutralized; leading and trailing blank lines dropped.
fn doc_lines(text: &str) -> Vec<String> {
  let lines: Vec<String> = text
    .lines()
    .map(|line| line.trim_end().replace("*/", "*\\/"))
    .collect();

  let Some(first) = lines.iter().position(|line| !line.trim().is_empty()) else {
    return vec![];
  };
  let last = lines.iter().rposition(|line| !line.trim().is_empty()).unwrap_or(first);
  lines[first..=last].to_vec()
}
