use anyhow::Result;

mod app;
mod logging;

fn main() -> Result<()> {
    let args = tree_sync::cli::parse();
    app::run(args)
}
