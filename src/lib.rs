// Library root
// -----------
// Shared code behind the three expense programs (`create-expense`,
// `delete-expense`, `list-friend-expenses`). Each binary is a thin wrapper
// around `commands::main`.
//
// Module responsibilities:
// - `args`: `--flag value` parsing and required-flag validation.
// - `config`: credentials and settings read once from the environment.
// - `expense`: request values for the three endpoints.
// - `api`: builds authenticated HTTP requests and sends them through a
//   swappable `Transport`.
// - `outcome`: per-endpoint interpretation of the JSON response.
// - `commands`: the shared run flow and exit-status mapping.
// - `telemetry`: tracing setup.
pub mod api;
pub mod args;
pub mod commands;
pub mod config;
pub mod expense;
pub mod outcome;
pub mod telemetry;
