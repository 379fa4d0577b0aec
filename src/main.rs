use anyhow::Result;

mod app;
mod logging;

fn main() -> Result<()> {
    let args = tune_transporter::cli::parse();
    app::run(args)
}
