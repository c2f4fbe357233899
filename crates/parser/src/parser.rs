use crate::error::{ParserError, Result};
use crate::records::{ClassRecord, FunctionRecord, ModuleRecord, Param, Visibility};
use codescope_scanner::FileSystem;
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Marker appended to a snippet that was cut at the line cap.
pub const SNIPPET_TRUNCATION_MARKER: &str = "# ... (truncated)";

/// Files above this size are never read into memory; they degrade with a
/// size note instead.
pub const MAX_FILE_SIZE_BYTES: u64 = 1_048_576; // 1 MB

/// Tree-sitter based structural parser for Python sources.
///
/// `parse_file` and `parse_source` never fail: read errors and malformed
/// input produce a degraded [`ModuleRecord`] so one broken file cannot
/// block summarizing the rest of a tree.
pub struct SourceParser {
    parser: Parser,
    snippet_max_lines: usize,
    docstring_max_chars: usize,
}

impl SourceParser {
    pub fn new(snippet_max_lines: usize, docstring_max_chars: usize) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParserError::tree_sitter(format!("failed to set language: {e}")))?;
        Ok(Self {
            parser,
            snippet_max_lines,
            docstring_max_chars,
        })
    }

    /// Read and parse one file through the filesystem capability. The size
    /// is checked first so an oversized file is never buffered in full.
    pub fn parse_file<F: FileSystem>(&mut self, fs: &F, path: &Path) -> ModuleRecord {
        let display = path.display().to_string();
        if let Ok(size) = fs.size_of(path) {
            if size > MAX_FILE_SIZE_BYTES {
                log::warn!(
                    "skipping oversized source file {display} ({size} bytes > {MAX_FILE_SIZE_BYTES})"
                );
                return ModuleRecord::degraded(display, format!("file too large ({size} bytes)"));
            }
        }
        match fs.read_to_string(path) {
            Ok(content) => self.parse_source(&content, &display),
            Err(e) => {
                log::warn!("unreadable source file {display}: {e}");
                ModuleRecord::degraded(display, format!("unreadable: {e}"))
            }
        }
    }

    /// Parse source text into a module record. Pure with respect to the
    /// filesystem.
    pub fn parse_source(&mut self, content: &str, path: &str) -> ModuleRecord {
        let Some(tree) = self.parser.parse(content, None) else {
            log::warn!("parser produced no tree for {path}");
            return ModuleRecord::degraded(path, "parser produced no tree");
        };
        let root = tree.root_node();
        if root.has_error() {
            let note = match first_error_line(root) {
                Some(line) => format!("syntax error near line {line}"),
                None => "syntax error".to_string(),
            };
            log::warn!("degrading {path}: {note}");
            return ModuleRecord::degraded(path, note);
        }

        let lines: Vec<&str> = content.lines().collect();
        let mut record = ModuleRecord::new(path);
        let mut first_statement = true;

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            let kind = child.kind();
            if kind == "comment" {
                continue;
            }
            match kind {
                "expression_statement" if first_statement => {
                    if let Some(doc) = self.docstring_from_statement(child, content) {
                        record.docstring = Some(doc);
                    }
                }
                "import_statement" | "import_from_statement" | "future_import_statement" => {
                    record.imports.push(text(child, content).trim().to_string());
                }
                "function_definition" => {
                    record
                        .functions
                        .push(self.function(child, Vec::new(), content, &lines, path));
                }
                "class_definition" => {
                    record.classes.push(self.class(child, content, &lines, path));
                }
                "decorated_definition" => {
                    let decorators = decorator_texts(child, content);
                    if let Some(inner) = child.child_by_field_name("definition") {
                        match inner.kind() {
                            "function_definition" => record
                                .functions
                                .push(self.function(inner, decorators, content, &lines, path)),
                            // Class decorators are not part of the entity
                            // model; the class body is what matters here.
                            "class_definition" => {
                                record.classes.push(self.class(inner, content, &lines, path));
                            }
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
            first_statement = false;
        }

        record
    }

    fn function(
        &self,
        node: Node,
        decorators: Vec<String>,
        content: &str,
        lines: &[&str],
        path: &str,
    ) -> FunctionRecord {
        let name = node
            .child_by_field_name("name")
            .map(|n| text(n, content).to_string())
            .unwrap_or_default();
        let params = node
            .child_by_field_name("parameters")
            .map(|p| self.params(p, content))
            .unwrap_or_default();
        let returns = node
            .child_by_field_name("return_type")
            .map(|n| text(n, content).to_string());
        let docstring = node
            .child_by_field_name("body")
            .and_then(|body| self.block_docstring(body, content));
        let start_line = node.start_position().row + 1;
        let end_line = node.end_position().row + 1;
        let (snippet, snippet_truncated) = self.snippet(lines, start_line, end_line);

        FunctionRecord {
            visibility: Visibility::of(&name),
            name,
            params,
            returns,
            decorators,
            docstring,
            snippet,
            snippet_truncated,
            start_line,
            end_line,
            module_path: path.to_string(),
        }
    }

    fn class(&self, node: Node, content: &str, lines: &[&str], path: &str) -> ClassRecord {
        let name = node
            .child_by_field_name("name")
            .map(|n| text(n, content).to_string())
            .unwrap_or_default();
        let bases = node
            .child_by_field_name("superclasses")
            .map(|args| {
                let mut cursor = args.walk();
                args.named_children(&mut cursor)
                    .map(|b| text(b, content).to_string())
                    .collect()
            })
            .unwrap_or_default();

        let mut docstring = None;
        let mut methods = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            docstring = self.block_docstring(body, content);
            let mut cursor = body.walk();
            for member in body.named_children(&mut cursor) {
                match member.kind() {
                    "function_definition" => {
                        methods.push(self.function(member, Vec::new(), content, lines, path));
                    }
                    "decorated_definition" => {
                        let method_decorators = decorator_texts(member, content);
                        if let Some(inner) = member.child_by_field_name("definition") {
                            if inner.kind() == "function_definition" {
                                methods.push(self.function(
                                    inner,
                                    method_decorators,
                                    content,
                                    lines,
                                    path,
                                ));
                            }
                        }
                    }
                    // Nested classes are folded into snippets, not
                    // surfaced, to keep the entity model flat.
                    _ => {}
                }
            }
        }

        ClassRecord {
            visibility: Visibility::of(&name),
            name,
            bases,
            docstring,
            methods,
            start_line: node.start_position().row + 1,
            end_line: node.end_position().row + 1,
        }
    }

    fn params(&self, node: Node, content: &str) -> Vec<Param> {
        let mut params = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "identifier" => params.push(Param {
                    name: text(child, content).to_string(),
                    annotation: None,
                    has_default: false,
                }),
                "typed_parameter" => {
                    let annotation = child
                        .child_by_field_name("type")
                        .map(|t| text(t, content).to_string());
                    let name = child
                        .named_child(0)
                        .map(|n| text(n, content).to_string())
                        .unwrap_or_default();
                    params.push(Param {
                        name,
                        annotation,
                        has_default: false,
                    });
                }
                "default_parameter" => {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| text(n, content).to_string())
                        .unwrap_or_default();
                    params.push(Param {
                        name,
                        annotation: None,
                        has_default: true,
                    });
                }
                "typed_default_parameter" => {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| text(n, content).to_string())
                        .unwrap_or_default();
                    let annotation = child
                        .child_by_field_name("type")
                        .map(|t| text(t, content).to_string());
                    params.push(Param {
                        name,
                        annotation,
                        has_default: true,
                    });
                }
                // `*args` / `**kwargs`; the stars are part of the node text
                "list_splat_pattern" | "dictionary_splat_pattern" => params.push(Param {
                    name: text(child, content).to_string(),
                    annotation: None,
                    has_default: false,
                }),
                // bare `*` and `/` separators are not parameters
                _ => {}
            }
        }
        params
    }

    /// Docstring of a function/class/module body: the first statement, if
    /// it is a bare string expression.
    fn block_docstring(&self, body: Node, content: &str) -> Option<String> {
        let mut cursor = body.walk();
        let first = body
            .named_children(&mut cursor)
            .find(|n| n.kind() != "comment")?;
        self.docstring_from_statement(first, content)
    }

    fn docstring_from_statement(&self, statement: Node, content: &str) -> Option<String> {
        if statement.kind() != "expression_statement" {
            return None;
        }
        let expr = statement.named_child(0)?;
        if expr.kind() != "string" && expr.kind() != "concatenated_string" {
            return None;
        }
        let cleaned = clean_string_literal(text(expr, content));
        if cleaned.is_empty() {
            return None;
        }
        Some(truncate_chars(&cleaned, self.docstring_max_chars))
    }

    fn snippet(&self, lines: &[&str], start_line: usize, end_line: usize) -> (String, bool) {
        let start = start_line.saturating_sub(1).min(lines.len());
        let end = end_line.min(lines.len());
        let mut snippet: Vec<&str> = lines[start..end].to_vec();
        let truncated = snippet.len() > self.snippet_max_lines;
        if truncated {
            snippet.truncate(self.snippet_max_lines);
            snippet.push(SNIPPET_TRUNCATION_MARKER);
        }
        (snippet.join("\n"), truncated)
    }
}

fn text<'a>(node: Node, content: &'a str) -> &'a str {
    content.get(node.byte_range()).unwrap_or_default()
}

fn decorator_texts(decorated: Node, content: &str) -> Vec<String> {
    let mut decorators = Vec::new();
    let mut cursor = decorated.walk();
    for child in decorated.named_children(&mut cursor) {
        if child.kind() == "decorator" {
            decorators.push(
                text(child, content)
                    .trim()
                    .trim_start_matches('@')
                    .to_string(),
            );
        }
    }
    decorators
}

fn first_error_line(root: Node) -> Option<usize> {
    let mut node = root;
    'descend: loop {
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        for child in children {
            if child.has_error() || child.is_missing() {
                node = child;
                continue 'descend;
            }
        }
        return None;
    }
}

/// Strip string prefixes and quote delimiters from a literal, then trim.
fn clean_string_literal(raw: &str) -> String {
    let without_prefix = raw.trim_start_matches(|c: char| "rRbBuUfF".contains(c));
    let body = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find_map(|quote| {
            without_prefix
                .strip_prefix(quote)
                .map(|rest| rest.strip_suffix(quote).unwrap_or(rest))
        })
        .unwrap_or(without_prefix);
    body.trim().to_string()
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}
