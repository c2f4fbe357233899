use serde::{Deserialize, Serialize};

/// Visibility derived from the leading-underscore naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// A name beginning with a single underscore is private, unless it is a
    /// dunder-style name (`__init__`).
    pub fn of(name: &str) -> Self {
        let dunder = name.len() >= 4 && name.starts_with("__") && name.ends_with("__");
        if name.starts_with('_') && !dunder {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }

    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// One function or method parameter.
///
/// Only the presence of a default value is captured, never the value
/// itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub annotation: Option<String>,
    pub has_default: bool,
}

/// A discovered function or method. Immutable after creation, except that
/// the assembler may shorten `snippet` in place during truncation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub params: Vec<Param>,
    pub returns: Option<String>,
    pub decorators: Vec<String>,
    pub visibility: Visibility,
    pub docstring: Option<String>,
    /// First lines of the definition, bounded by the snippet line cap.
    pub snippet: String,
    pub snippet_truncated: bool,
    pub start_line: usize,
    pub end_line: usize,
    pub module_path: String,
}

impl FunctionRecord {
    /// Rendered signature, e.g. `def f(a, b: int = ...) -> str`.
    pub fn signature(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| {
                let mut out = p.name.clone();
                if let Some(annotation) = &p.annotation {
                    out.push_str(": ");
                    out.push_str(annotation);
                }
                if p.has_default {
                    out.push_str(" = ...");
                }
                out
            })
            .collect::<Vec<_>>()
            .join(", ");
        match &self.returns {
            Some(returns) => format!("def {}({params}) -> {returns}", self.name),
            None => format!("def {}({params})", self.name),
        }
    }
}

/// A discovered class with its methods in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,
    /// Base-class expressions as literal text, unresolved.
    pub bases: Vec<String>,
    pub visibility: Visibility,
    pub docstring: Option<String>,
    pub methods: Vec<FunctionRecord>,
    pub start_line: usize,
    pub end_line: usize,
}

/// One parsed source file. A file that failed to parse is represented by a
/// degraded record: path plus failure note, no children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub path: String,
    pub docstring: Option<String>,
    /// Import statements as literal text.
    pub imports: Vec<String>,
    pub functions: Vec<FunctionRecord>,
    pub classes: Vec<ClassRecord>,
    /// Failure note for degraded records.
    pub error: Option<String>,
}

impl ModuleRecord {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            docstring: None,
            imports: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            error: None,
        }
    }

    pub fn degraded(path: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            error: Some(note.into()),
            ..Self::new(path)
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}
