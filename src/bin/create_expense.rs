// Entrypoint: create an expense split between two people.
// Credentials and settings come from the environment (or a `.env` file);
// see `config::Settings::from_env`.

use expense_cli::commands::{self, Program};
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    commands::main(Program::CreateExpense)
}
