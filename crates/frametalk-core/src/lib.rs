// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Frametalk compiler core.
//!
//! This crate contains the core compiler functionality:
//! - Lexical analysis (tokenization)
//! - Parsing (AST construction)
//! - Semantic analysis (alias resolution, schema tracking)
//! - Code generation (Python/pandas output)
//!
//! The pipeline fails before it runs: lexing and parsing stop at the first
//! error, semantic analysis batches every finding, and generation only
//! happens for a program that passed every earlier stage. [`compile`] wires
//! the stages together; each stage is also usable on its own.

pub mod ast;
pub mod codegen;
pub mod compile;
pub mod diagnostics;
pub mod semantic_analysis;
pub mod source_analysis;

pub use compile::{compile, CompileOptions, CompileOutput};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ast::Statement;
    pub use crate::codegen::generate;
    pub use crate::diagnostics::{Diagnostic, ErrorCategory};
    pub use crate::semantic_analysis::{analyze, AnalyzeOptions, SymbolTable};
    pub use crate::source_analysis::{parse, tokenize, Span};
}
