use std::path::PathBuf;

use clap::Parser;
use eyre::Result;

use inclinometry::{increments, model::parse_stamp, store};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Arg {
    /// Path to the campaign document in json format
    pub data_file: PathBuf,
    /// Target campaign date (ISO-8601)
    pub target_date: String,
}

fn main() -> Result<()> {
    inclinometry::init_tracing();
    let args = Arg::parse();

    let target = parse_stamp(&args.target_date)?;
    let doc = store::load(&args.data_file)?;
    let doc = increments::compute_increments(doc, target)?;
    store::save(&args.data_file, &doc)?;

    tracing::info!("updated {} for {target}", args.data_file.display());
    Ok(())
}
