pub mod cli;
pub mod histogram;
pub mod history;
pub mod model;
pub mod runtime;
pub mod scheduler;
pub mod service;
pub mod session;
pub mod workflow;

#[cfg(test)]
mod testing;

pub fn run_cli() -> Result<(), String> {
    cli::run_cli()
}
