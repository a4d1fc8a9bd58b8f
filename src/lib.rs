mod apple_platform;
mod cli;
pub mod generator;
pub mod pbx;
pub mod templates;
mod utils;
pub mod workspace;
pub mod xcodeproj;

pub fn cli_main() -> anyhow::Result<()> {
    cli::Cli::execute()
}
