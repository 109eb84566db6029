use clap::Parser;
use defect_map_cli::{execute, init_tracing, Cli};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    execute(&cli)?;
    Ok(())
}
