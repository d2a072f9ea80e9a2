//! Static import sandbox for third-party strategy source, run ahead of
//! compilation/execution. The original system enumerates a Python AST's
//! top-level imports against allow/deny lists; a compiled Rust target has no
//! runtime import machinery to inspect, so this is the ahead-of-time
//! equivalent the design notes call for: scan the plugin's declared `use`
//! paths as text before the plugin is ever built into the process.
//!
//! Relative paths (`self::`, `super::`) are always rejected, mirroring the
//! original's rejection of relative imports regardless of allow-list
//! membership — there is no module root to check a relative path against.

const DENIED_PREFIXES: &[&str] = &[
    "qtr_runtime",
    "qtr_backtest",
    "qtr_cli",
    "qtr_config",
    "std::fs",
    "std::net",
    "std::process",
    "std::env",
    "std::thread",
    "tokio",
    "reqwest",
    "hyper",
    "sqlx",
    "rusqlite",
    "diesel",
    "async_nats",
    "tungstenite",
];

const ALLOWED_PREFIXES: &[&str] = &[
    "qtr_domain",
    "qtr_strategy::types",
    "qtr_strategy::bundle_loader",
    "std::collections",
    "std::cmp",
    "std::fmt",
    "std::convert",
    "core",
    "alloc",
    "chrono",
    "rust_decimal",
    "serde",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportRef {
    pub line: usize,
    pub path: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SandboxError {
    /// The source could not be scanned as a sequence of `use`/`extern crate`
    /// declarations (e.g. an unterminated statement).
    Unparseable { line: usize, reason: String },
}

impl std::fmt::Display for SandboxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SandboxError::Unparseable { line, reason } => {
                write!(f, "line {line}: {reason}")
            }
        }
    }
}

impl std::error::Error for SandboxError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportViolation {
    pub forbidden: Vec<ImportRef>,
    pub unsupported: Vec<ImportRef>,
}

impl std::fmt::Display for ImportViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "strategy import policy violated: ")?;
        if !self.forbidden.is_empty() {
            write!(f, "forbidden imports: ")?;
            for i in &self.forbidden {
                write!(f, "{}(line {}) ", i.path, i.line)?;
            }
        }
        if !self.unsupported.is_empty() {
            write!(f, "unsupported imports: ")?;
            for i in &self.unsupported {
                write!(f, "{}(line {}) ", i.path, i.line)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ImportViolation {}

fn matches_prefix(path: &str, prefixes: &[&str]) -> bool {
    prefixes
        .iter()
        .any(|p| path == *p || path.starts_with(&format!("{p}::")))
}

/// Enumerate every top-level `use ...;` or `extern crate ...;` declaration in
/// `source`, in line order. Relative paths are reported with their literal
/// `self::`/`super::` prefix so callers can reject them like any other import.
fn scan_imports(source: &str) -> Result<Vec<ImportRef>, SandboxError> {
    let mut imports = Vec::new();

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.starts_with("//") || line.is_empty() {
            continue;
        }

        let rest = if let Some(r) = line.strip_prefix("use ") {
            r
        } else if let Some(r) = line.strip_prefix("pub use ") {
            r
        } else if let Some(r) = line.strip_prefix("extern crate ") {
            r
        } else {
            continue;
        };

        let Some(terminated) = rest.strip_suffix(';') else {
            return Err(SandboxError::Unparseable {
                line: line_no,
                reason: "import statement missing terminating ';'".to_string(),
            });
        };

        // Drop a brace-group suffix (`use foo::{bar, baz}`) and an `as` alias;
        // we only care about the root path for allow/deny classification.
        let path_part = terminated.split('{').next().unwrap_or(terminated).trim();
        let path_part = path_part.split(" as ").next().unwrap_or(path_part).trim();
        let path_part = path_part.trim_end_matches("::");

        if path_part.is_empty() {
            continue;
        }

        imports.push(ImportRef {
            line: line_no,
            path: path_part.to_string(),
        });
    }

    Ok(imports)
}

/// Validate a strategy source file's declared imports against the allow/deny
/// lists. Deny wins over allow; anything not explicitly allowed is
/// unsupported (closed-world, not open-world).
pub fn validate_strategy_imports(source: &str) -> Result<Vec<ImportRef>, ValidationOutcome> {
    let imports = scan_imports(source).map_err(ValidationOutcome::Sandbox)?;

    let mut forbidden = Vec::new();
    let mut unsupported = Vec::new();

    for import in &imports {
        if import.path.starts_with("self::") || import.path.starts_with("super::") {
            forbidden.push(import.clone());
            continue;
        }
        if matches_prefix(&import.path, DENIED_PREFIXES) {
            forbidden.push(import.clone());
            continue;
        }
        if !matches_prefix(&import.path, ALLOWED_PREFIXES) {
            unsupported.push(import.clone());
        }
    }

    if !forbidden.is_empty() || !unsupported.is_empty() {
        return Err(ValidationOutcome::Violation(ImportViolation {
            forbidden,
            unsupported,
        }));
    }

    Ok(imports)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationOutcome {
    Sandbox(SandboxError),
    Violation(ImportViolation),
}

impl std::fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationOutcome::Sandbox(e) => write!(f, "{e}"),
            ValidationOutcome::Violation(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ValidationOutcome {}
