use std::path::PathBuf;

use clap::Parser;
use eyre::{Result, WrapErr};
use indicatif::ProgressStyle;
use serde::{Deserialize, Serialize};

use inclinometry::{model::Document, rst, store};

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Opts {
    /// Campaign document to create or extend
    data_file: PathBuf,
    /// Glob pattern selecting the rst files to import
    pattern: String,
    exclude: Option<Vec<String>>,
    /// Probe constant dividing the halved face difference
    #[serde(default = "default_constant")]
    constant: f64,
    #[serde(default)]
    policy: rst::ErrorPolicy,
}

fn default_constant() -> f64 {
    1.0
}

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Arg {
    /// Path to the config file in yaml format
    pub config_file: PathBuf,
    /// Override the row error policy from the config
    #[clap(long, value_enum)]
    pub policy: Option<rst::ErrorPolicy>,
}

fn main() -> Result<()> {
    inclinometry::init_tracing();
    let args = Arg::parse();
    let opts: Opts = serde_yaml::from_reader(
        std::fs::File::open(&args.config_file)
            .wrap_err_with(|| format!("opening {}", args.config_file.display()))?,
    )?;

    let policy = args.policy.unwrap_or(opts.policy);

    let mut files: Vec<PathBuf> = glob::glob(&opts.pattern)?
        .filter_map(|path| path.ok())
        .filter(|path| {
            let path_str = path.to_string_lossy();
            opts.exclude
                .as_ref()
                .map_or(true, |exclude| !exclude.iter().any(|ex| path_str.contains(ex)))
        })
        .collect();
    // vendor file names number their campaigns, keep them in natural order
    files.sort_by(|a, b| natord::compare(&a.to_string_lossy(), &b.to_string_lossy()));

    let mut doc = if opts.data_file.exists() {
        store::load(&opts.data_file)?
    } else {
        Document::default()
    };

    let pb = indicatif::ProgressBar::new(files.len() as u64);
    pb.set_style(ProgressStyle::with_template(
        "[{elapsed_precise}] {bar} {pos:>7}/{len:7} {msg}",
    )?);

    for filepath in &files {
        pb.set_message(filepath.display().to_string());
        let text = std::fs::read_to_string(filepath)?;
        let survey = rst::parse_survey(&text, policy)
            .wrap_err_with(|| format!("parsing {}", filepath.display()))?;
        let stamp = survey.stamp;
        if let Some(previous) = doc
            .campaigns
            .insert(stamp, survey.into_campaign(opts.constant))
        {
            tracing::warn!(
                "replaced campaign {stamp} ({:?})",
                previous.extra.get("borehole")
            );
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    store::save(&opts.data_file, &doc)?;
    tracing::info!(
        "imported {} files into {}",
        files.len(),
        opts.data_file.display()
    );
    Ok(())
}
