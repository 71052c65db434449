//! Shell completion generation for the bayesnet CLI

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::Cli;

pub fn generate_for_shell(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "bayesnet", &mut io::stdout());
}
