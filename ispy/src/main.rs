use clap::Parser;

fn main() -> anyhow::Result<()> {
    ispy::init_logger();
    log::debug!("start...");

    ispy::cli::run(ispy::Cli::parse())?;

    log::debug!("exit...");
    Ok(())
}
