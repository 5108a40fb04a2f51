//! Render a light-curve figure without opening a window.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use gamma_lc::config::Params;
use gamma_lc::render;

#[derive(Parser, Debug)]
#[command(name = "render_lc")]
#[command(about = "Render a light-curve figure from a parameter file")]
struct Args {
    /// Parameter file (YAML)
    #[arg(default_value = "params.yaml")]
    params: PathBuf,

    /// Output figure (.svg or .png); the configured save_dir/plot_name when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let params = Params::from_path(&args.params)?;
    let figure = render::build_figure(&params)
        .with_context(|| format!("building figure for {}", params.data.tag))?;

    let output = args.output.unwrap_or_else(|| params.figure_path());
    render::save_figure(&figure, &output)?;
    println!("{}", output.display());
    Ok(())
}
