//! interface-gen - writes the role-tagged handler traits for a route document.

use std::process::ExitCode;

use chaingen_core::{cli, Emitter};

fn main() -> ExitCode {
    cli::main_for(Emitter::Interfaces)
}
