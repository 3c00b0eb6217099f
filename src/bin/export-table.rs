use std::path::PathBuf;

use clap::Parser;
use eyre::Result;

use inclinometry::{
    export::{render_table, GridSpec},
    store,
};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Arg {
    /// Path to the campaign document in json format
    pub data_file: PathBuf,
    /// Output table path (tsv); defaults to the document path with .tsv
    #[clap(long)]
    pub out: Option<PathBuf>,
    #[clap(long, default_value_t = 0.5)]
    pub depth_start: f64,
    #[clap(long, default_value_t = 50.0)]
    pub depth_stop: f64,
    #[clap(long, default_value_t = 0.5)]
    pub depth_step: f64,
}

fn main() -> Result<()> {
    inclinometry::init_tracing();
    let args = Arg::parse();

    let doc = store::load(&args.data_file)?;
    let grid = GridSpec::new(args.depth_start, args.depth_stop, args.depth_step)?;

    let out = args
        .out
        .unwrap_or_else(|| args.data_file.with_extension("tsv"));
    std::fs::write(&out, render_table(&doc, &grid))?;

    tracing::info!("wrote {}", out.display());
    Ok(())
}
