//! Batch driver for the Flamingo compiler.
//!
//! Each source file is compiled on its own: a failure in one file is logged
//! and the remaining files are still processed.

mod args;

pub use args::{Cli, Command};

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use flamingo_codegen::{unit_name_from_stem, CodegenOptions, CompileError};
use flamingo_lexer::Lexer;

/// Extension of compilable source files.
pub const SOURCE_EXTENSION: &str = "flamingo";

/// Appended to the source stem to name the generated file.
pub const OUTPUT_SUFFIX: &str = "_flamingo.rs";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("{}: {source}", .path.display())]
    Compile {
        path: PathBuf,
        #[source]
        source: CompileError,
    },

    #[error("{failed} of {total} files failed")]
    Failed { failed: usize, total: usize },
}

/// Run the command selected on the command line.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Build {
            paths,
            out_dir,
            runtime,
            no_header,
        } => {
            let options = CodegenOptions {
                runtime_path: runtime.clone(),
                header: !no_header,
            };
            build(paths, out_dir.as_deref(), &options)
        }
        Command::Check { paths } => check(paths),
        Command::Tokens { path } => {
            let stdout = io::stdout();
            write_tokens(path, &mut stdout.lock())
        }
    }
}

/// Compile every source under `paths` and write the generated files.
pub fn build(
    paths: &[PathBuf],
    out_dir: Option<&Path>,
    options: &CodegenOptions,
) -> Result<(), CliError> {
    if let Some(dir) = out_dir {
        fs::create_dir_all(dir).map_err(|source| CliError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    for_each_source(paths, |path| {
        let code = compile_path(path, options)?;
        let target = output_path(path, out_dir);
        fs::write(&target, code).map_err(|source| CliError::Write {
            path: target.clone(),
            source,
        })?;
        info!("built {} -> {}", path.display(), target.display());
        Ok(())
    })
}

/// Compile every source under `paths` without writing anything.
pub fn check(paths: &[PathBuf]) -> Result<(), CliError> {
    let options = CodegenOptions::default();
    for_each_source(paths, |path| {
        compile_path(path, &options)?;
        info!("ok {}", path.display());
        Ok(())
    })
}

/// Print the final failure for the user, whatever the log level.
pub fn report_error(err: &CliError, out: &mut impl Write) {
    // Nothing useful to do if stderr itself is gone
    let _ = writeln!(out, "Error: {err}");
}

/// Write one line per token of `path`: location, kind, literal.
pub fn write_tokens(path: &Path, out: &mut impl Write) -> Result<(), CliError> {
    let source = read_source(path)?;
    let mut lexer = Lexer::new(&source).with_file_name(path.display().to_string());

    let write_err = |source| CliError::Write {
        path: PathBuf::from("<stdout>"),
        source,
    };
    loop {
        let tok = lexer.next_token();
        let loc = lexer.source_file().location(tok.pos);
        writeln!(out, "{loc}\t{}\t{:?}", tok.kind, tok.literal).map_err(write_err)?;
        if tok.kind.is_terminal() {
            break;
        }
    }
    Ok(())
}

/// Expand directories into their `.flamingo` files, sorted by name.
///
/// Directories are not searched recursively. Explicit file arguments are
/// kept whatever their extension.
pub fn collect_sources(paths: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    let mut sources = Vec::new();
    for path in paths {
        if !path.is_dir() {
            sources.push(path.clone());
            continue;
        }

        let read_err = |source| CliError::Read {
            path: path.clone(),
            source,
        };
        let mut found = Vec::new();
        for entry in fs::read_dir(path).map_err(read_err)? {
            let entry_path = entry.map_err(read_err)?.path();
            if entry_path.is_file()
                && entry_path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
            {
                found.push(entry_path);
            }
        }
        if found.is_empty() {
            warn!("no .{SOURCE_EXTENSION} files in {}", path.display());
        }
        found.sort();
        sources.extend(found);
    }
    Ok(sources)
}

/// Where the generated code for `source` is written.
pub fn output_path(source: &Path, out_dir: Option<&Path>) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = match out_dir {
        Some(dir) => dir,
        None => source.parent().unwrap_or(Path::new(".")),
    };
    dir.join(format!("{stem}{OUTPUT_SUFFIX}"))
}

fn for_each_source<F>(paths: &[PathBuf], mut f: F) -> Result<(), CliError>
where
    F: FnMut(&Path) -> Result<(), CliError>,
{
    let sources = collect_sources(paths)?;
    debug!("processing {} source files", sources.len());

    let mut failed = 0;
    for path in &sources {
        if let Err(err) = f(path) {
            report(&err);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(CliError::Failed {
            failed,
            total: sources.len(),
        });
    }
    Ok(())
}

fn compile_path(path: &Path, options: &CodegenOptions) -> Result<String, CliError> {
    let source = read_source(path)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let unit_name = unit_name_from_stem(&stem);
    let name = path.display().to_string();

    flamingo_codegen::compile_file(&name, &source, &unit_name, options).map_err(|source| {
        CliError::Compile {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn read_source(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Log a per-file failure, one line per parse diagnostic.
fn report(err: &CliError) {
    match err {
        CliError::Compile {
            path,
            source: CompileError::Parse(errors),
        } => {
            for e in errors {
                error!("{}: {e}", path.display());
            }
        }
        other => error!("{other}"),
    }
}
