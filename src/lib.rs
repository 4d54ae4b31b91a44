//! A semantic compiler for RCL, a language for conversational agents.
//!
//! The crate takes an already parsed [`ast::Document`] and turns it into a
//! runtime-ready [`compiler::CompiledAgent`]: agent configuration, a
//! normalized message catalog and flow transition tables. Problems are
//! reported as [`diagnostics::Diagnostic`] values; only error severity fails
//! a compilation.
//!
//! ```rust
//! use rcl_compiler::ast::builder::{document, ident, section, string};
//! use rcl_compiler::{Compiler, SourceDocument};
//!
//! let doc = document(vec![
//!     section("agent").named("Coffee").attr("displayName", string("Coffee Shop")).build(),
//!     section("flow")
//!         .named("Main")
//!         .attr("start", ident("Welcome"))
//!         .child(section("on").named("Welcome").build())
//!         .build(),
//!     section("messages")
//!         .child(section("text").named("welcome").param(string("Hi!")).build())
//!         .build(),
//! ]);
//! let result = Compiler::default().compile(&SourceDocument::new(doc));
//! assert!(result.success);
//! assert_eq!(result.data.unwrap().flows["Main"].initial, "Welcome");
//! ```

pub mod agent;
pub mod ast;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod errors;
pub mod extraction;
pub mod flow;
pub mod validation;

pub use crate::compiler::{CompilationResult, CompiledAgent, Compiler, ExitCode, SourceDocument};
pub use crate::diagnostics::{Category, Diagnostic, ErrorCode, Severity};
pub use crate::errors::RclError;
