/// Material script compilation surface used by sub-render state factories:
/// parsed property nodes, the compiler's error list, and the translator
/// that owns the sub-render states generated for one pass.

use std::fmt;
use super::sub_render_state::SubRenderState;

/// Value node of a script property
#[derive(Debug, Clone, PartialEq)]
pub enum AbstractNode {
    /// Bare or quoted token
    Atom(String),
    /// Nested block; not convertible to a literal
    Object(String),
}

impl AbstractNode {
    pub fn atom(value: &str) -> Self {
        AbstractNode::Atom(value.to_string())
    }
}

/// `name value value ...` line of a material script
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNode {
    pub name: String,
    pub values: Vec<AbstractNode>,
    pub file: String,
    pub line: u32,
}

impl PropertyNode {
    /// Property from whitespace-separated atoms
    pub fn new(name: &str, values: &[&str], file: &str, line: u32) -> Self {
        Self {
            name: name.to_string(),
            values: values.iter().map(|v| AbstractNode::atom(v)).collect(),
            file: file.to_string(),
            line,
        }
    }
}

pub fn get_float(node: &AbstractNode) -> Option<f32> {
    match node {
        AbstractNode::Atom(value) => value.trim().parse::<f32>().ok(),
        AbstractNode::Object(_) => None,
    }
}

pub fn get_string(node: &AbstractNode) -> Option<String> {
    match node {
        AbstractNode::Atom(value) => Some(value.trim_matches('"').to_string()),
        AbstractNode::Object(_) => None,
    }
}

// ===== COMPILER ERRORS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorCode {
    InvalidParameters,
}

impl fmt::Display for CompileErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompileErrorCode::InvalidParameters => write!(f, "invalid parameters"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub code: CompileErrorCode,
    pub file: String,
    pub line: u32,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file, self.line, self.code)
    }
}

/// Accumulates errors; compilation of other directives carries on
#[derive(Debug, Default)]
pub struct ScriptCompiler {
    errors: Vec<CompileError>,
}

impl ScriptCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, code: CompileErrorCode, file: &str, line: u32) {
        self.errors.push(CompileError {
            code,
            file: file.to_string(),
            line,
        });
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

// ===== TRANSLATOR =====

/// Sub-render states generated while translating one material pass
#[derive(Default)]
pub struct ScriptTranslator {
    generated: Vec<Box<dyn SubRenderState>>,
}

impl ScriptTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing state of type `type_name`
    pub fn generated_sub_render_state(&mut self, type_name: &str) -> Option<&mut dyn SubRenderState> {
        for state in self.generated.iter_mut() {
            if state.type_name() == type_name {
                return Some(state.as_mut());
            }
        }
        None
    }

    /// Existing state of type `type_name`, or the one `create` builds
    pub fn get_or_insert_with(
        &mut self,
        type_name: &str,
        create: impl FnOnce() -> Box<dyn SubRenderState>,
    ) -> &mut dyn SubRenderState {
        let position = match self.generated.iter().position(|s| s.type_name() == type_name) {
            Some(position) => position,
            None => {
                self.generated.push(create());
                self.generated.len() - 1
            }
        };
        self.generated[position].as_mut()
    }

    pub fn sub_render_states(&self) -> &[Box<dyn SubRenderState>] {
        &self.generated
    }
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
