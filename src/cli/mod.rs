//! The `rclc` command-line interface.
//!
//! Subcommand handlers return an [`ExitCode`]; boundary failures
//! ([`RclError`]) are printed once here and mapped to their exit code.

use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::Parser;
use indexmap::IndexMap;
use serde_json::json;
use termcolor::ColorChoice;

use crate::cli::args::{Command, RclArgs};
use crate::cli::output::{print_error, print_status, Status};
use crate::compiler::{CompilationResult, Compiler, ExitCode, SourceDocument};
use crate::config::{CompilerOptions, OutputFormat, ProjectConfig};
use crate::diagnostics::Severity;
use crate::discovery::{discover_sources, load_source, output_stem};
use crate::errors::RclError;
use crate::extraction::{extract_messages, ExtractOptions};

pub mod args;
pub mod diagnostics;
pub mod output;

/// Settings shared by every subcommand.
struct Context {
    color: ColorChoice,
    config: Option<PathBuf>,
}

impl Context {
    fn colored(&self) -> bool {
        self.color != ColorChoice::Never
    }
}

/// The main entry point for the CLI.
pub fn run() -> ExitCode {
    let args = match RclArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Success,
                _ => ExitCode::Usage,
            };
        }
    };

    let ctx = Context {
        color: output::color_choice(args.no_color),
        config: args.config,
    };

    let result = match args.command {
        Command::Compile {
            path,
            output,
            format,
            pretty,
            naming,
        } => handle_compile(&ctx, &path, output, format, pretty, naming),
        Command::Validate { path, naming, json } => handle_validate(&ctx, &path, naming, json),
        Command::Messages { path, pretty } => handle_messages(&ctx, &path, pretty),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            if let Some(diagnostic) = e.to_diagnostic() {
                diagnostics::print_diagnostics(&[diagnostic], None, ctx.colored());
            } else {
                print_error(ctx.color, &e);
            }
            e.exit_code()
        }
    }
}

// ============================================================================
// SUBCOMMAND HANDLERS
// ============================================================================

/// Handles the `compile` subcommand.
fn handle_compile(
    ctx: &Context,
    path: &Path,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    pretty: bool,
    naming: bool,
) -> Result<ExitCode, RclError> {
    let config = load_config(ctx, path)?;
    let format = format.unwrap_or(config.output.format);
    let pretty = pretty || config.output.pretty;
    let out_dir = output.or(config.output.out_dir.clone());
    let compiler = Compiler::new(compiler_options(&config, naming));

    let (files, inputs, mut exit) = load_inputs(ctx, path)?;
    let results = compiler.compile_workspace(&inputs);

    for ((file, input), result) in files.iter().zip(&inputs).zip(&results) {
        report(ctx, input, result);
        exit = exit.worst(result.exit_code());

        let Some(compiled) = &result.data else {
            print_status(ctx.color, Status::Fail, "Failed", &summary(file, result));
            continue;
        };
        let dir = match &out_dir {
            Some(dir) => dir.clone(),
            None => file.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let mut stem = output_stem(file);
        if dir.join(format!("{stem}.json")) == *file {
            stem.push_str(".compiled");
        }
        match output::write_artifacts(compiled, &dir, &stem, format, pretty) {
            Ok(written) => {
                let names: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
                print_status(
                    ctx.color,
                    Status::Ok,
                    "Compiled",
                    &format!("{} -> {}", file.display(), names.join(", ")),
                );
            }
            Err(e) => {
                print_error(ctx.color, &e);
                exit = exit.worst(e.exit_code());
            }
        }
    }
    Ok(exit)
}

/// Handles the `validate` subcommand.
fn handle_validate(
    ctx: &Context,
    path: &Path,
    naming: bool,
    json: bool,
) -> Result<ExitCode, RclError> {
    let config = load_config(ctx, path)?;
    let compiler = Compiler::new(compiler_options(&config, naming));

    let (files, inputs, mut exit) = load_inputs(ctx, path)?;
    let results = compiler.compile_workspace(&inputs);

    let mut reports = Vec::new();
    for ((file, input), result) in files.iter().zip(&inputs).zip(&results) {
        exit = exit.worst(result.exit_code());
        if json {
            reports.push(json!({
                "file": file.display().to_string(),
                "success": result.success,
                "diagnostics": result.diagnostics,
            }));
            continue;
        }
        report(ctx, input, result);
        let status = if result.success { Status::Ok } else { Status::Fail };
        let label = if result.success { "Valid" } else { "Invalid" };
        print_status(ctx.color, status, label, &summary(file, result));
    }

    if json {
        println!("{}", output::to_json(&reports, true)?);
    }
    Ok(exit)
}

/// Handles the `messages` subcommand.
///
/// Extraction does not depend on validation, so the catalog is printed
/// even for documents that would fail to compile.
fn handle_messages(ctx: &Context, path: &Path, pretty: bool) -> Result<ExitCode, RclError> {
    let config = load_config(ctx, path)?;
    let options = ExtractOptions {
        scan_depth: config.compiler.effective_scan_depth(),
    };

    let (files, inputs, exit) = load_inputs(ctx, path)?;
    let mut catalog = IndexMap::new();
    for (file, input) in files.iter().zip(&inputs) {
        let extraction = extract_messages(&input.ast, &options);
        for error in &extraction.errors {
            print_status(ctx.color, Status::Warn, "warning", error);
        }
        catalog.insert(file.display().to_string(), extraction);
    }
    println!("{}", output::to_json(&catalog, pretty)?);
    Ok(exit)
}

// ============================================================================
// HELPERS
// ============================================================================

fn load_config(ctx: &Context, path: &Path) -> Result<ProjectConfig, RclError> {
    match &ctx.config {
        Some(explicit) => ProjectConfig::load(explicit),
        None => {
            let dir = if path.is_dir() {
                path
            } else {
                path.parent().unwrap_or(Path::new(""))
            };
            ProjectConfig::discover(dir)
        }
    }
}

fn compiler_options(config: &ProjectConfig, naming: bool) -> CompilerOptions {
    let mut options = config.compiler.clone();
    options.naming_conventions |= naming;
    options
}

/// Loads every source under `path`. A file that cannot be loaded is
/// reported and skipped; the rest still compile.
fn load_inputs(
    ctx: &Context,
    path: &Path,
) -> Result<(Vec<PathBuf>, Vec<SourceDocument>, ExitCode), RclError> {
    let mut files = Vec::new();
    let mut inputs = Vec::new();
    let mut exit = ExitCode::Success;
    for file in discover_sources(path)? {
        match load_source(&file) {
            Ok(input) => {
                files.push(file);
                inputs.push(input);
            }
            Err(e) => {
                if let Some(diagnostic) = e.to_diagnostic() {
                    diagnostics::print_diagnostics(&[diagnostic], None, ctx.colored());
                }
                exit = exit.worst(e.exit_code());
            }
        }
    }
    Ok((files, inputs, exit))
}

fn report(ctx: &Context, input: &SourceDocument, result: &CompilationResult) {
    diagnostics::print_diagnostics(
        &result.diagnostics,
        input.source.as_deref(),
        ctx.colored(),
    );
}

fn summary(file: &Path, result: &CompilationResult) -> String {
    let count = |severity: Severity| {
        result
            .diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    };
    format!(
        "{}: {} error(s), {} warning(s)",
        file.display(),
        count(Severity::Error),
        count(Severity::Warning)
    )
}
