//! Command Line Glue - Shared by `interface-gen` and `messenger-gen`
//!
//! Both binaries take the same flags and differ only in the emitter they run.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, FromArgMatches, Parser};
use tracing::info;

use crate::pipeline::{Emitter, GenerateError, Generator, WriteOutcome};
use crate::render::RenderError;
use crate::spec::SpecError;

#[derive(Debug, Parser)]
#[command(version, about = "Generate chain code from a handler/route document")]
pub struct Cli {
    /// Path to the YAML handler/route document
    #[arg(long)]
    pub spec: PathBuf,

    /// Path of the generated Rust file
    #[arg(long)]
    pub output: PathBuf,

    /// Exit non-zero if the output is missing or out of date instead of writing it
    #[arg(long)]
    pub check: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Process exit codes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success = 0,
    IoError = 1,
    ParseError = 2,
    ValidationError = 3,
    RenderError = 4,
    Stale = 5,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

impl Exit {
    pub fn for_error(err: &GenerateError) -> Self {
        match err {
            GenerateError::Spec(SpecError::Read { .. }) => Exit::IoError,
            GenerateError::Spec(SpecError::Parse { .. }) => Exit::ParseError,
            GenerateError::Validation(_) | GenerateError::Model(_) => Exit::ValidationError,
            GenerateError::Render(_) | GenerateError::Fingerprint(_) => Exit::RenderError,
            GenerateError::OutputIo { .. } => Exit::IoError,
        }
    }
}

/// Entry point of both binaries.
pub fn main_for(emitter: Emitter) -> ExitCode {
    let matches = Cli::command().name(emitter.tool_name()).get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    init_tracing(&cli);
    run(&cli, emitter).into()
}

pub fn run(cli: &Cli, emitter: Emitter) -> Exit {
    match execute(cli, emitter) {
        Ok(exit) => exit,
        Err(e) => {
            report(&e);
            Exit::for_error(&e)
        }
    }
}

fn execute(cli: &Cli, emitter: Emitter) -> Result<Exit, GenerateError> {
    let generator = Generator::load(&cli.spec)?;

    if cli.check {
        if generator.check_file(emitter, &cli.output)? {
            return Ok(Exit::Success);
        }
        eprintln!(
            "{} is out of date with {}; rerun {}",
            cli.output.display(),
            cli.spec.display(),
            emitter.tool_name()
        );
        return Ok(Exit::Stale);
    }

    let outcome = generator.write_to_file(emitter, &cli.output)?;
    if outcome == WriteOutcome::Unchanged {
        info!(path = %cli.output.display(), "already up to date");
    }
    println!(
        "Successfully generated {} from {}",
        cli.output.display(),
        cli.spec.display()
    );
    Ok(Exit::Success)
}

fn report(err: &GenerateError) {
    eprintln!("error: {err}");
    if let GenerateError::Validation(validation) = err {
        for violation in &validation.violations {
            if let Some(expected) = &violation.expected {
                eprintln!("  expected: {expected}");
            }
            for hint in &violation.remediation {
                eprintln!("  hint: {hint}");
            }
        }
    }
    if let GenerateError::Render(render) = err {
        if let Some(raw) = render.raw_output() {
            if let RenderError::Syntax { line, .. } = render {
                eprintln!("--- unformatted output (error near line {line}) ---");
            }
            eprintln!("{raw}");
        }
    }
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 if cli.quiet => EnvFilter::new("error"),
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(cli.verbose >= 2),
        )
        .init();
}
