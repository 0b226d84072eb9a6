use clap::{Arg, ArgAction, Command, value_parser};
use color_eyre::eyre::{Context, eyre};
use image_forensics::features::ela::{DEFAULT_AMPLIFICATION, DEFAULT_QUALITY};
use image_forensics::utils::list_image_files;
use image_forensics::{AnalysisRecord, ForensicAnalyzer};
use std::path::{Path, PathBuf};
use tracing::{Level, info, warn};

fn build_cli() -> Command {
    Command::new("image-forensics")
        .about("Hashes, Exif metadata, GPS, embedded thumbnail and error level analysis for images")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("paths")
                .help("Image files or directories to analyze")
                .required(true)
                .num_args(1..)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("quality")
                .long("quality")
                .help("JPEG quality used for the ELA recompression")
                .default_value("90")
                .value_parser(value_parser!(u8).range(1..=100)),
        )
        .arg(
            Arg::new("amplification")
                .long("amplification")
                .help("Multiplier applied to ELA difference values")
                .default_value("15")
                .value_parser(value_parser!(u8)),
        )
        .arg(
            Arg::new("sequential")
                .long("sequential")
                .help("Run the analyses one after another instead of in parallel")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .help("Pretty-print the JSON records")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("hidden")
                .long("hidden")
                .help("Include hidden files and directories when walking directories")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ela-out")
                .long("ela-out")
                .value_name("DIR")
                .help("Also write the ELA map of every image as PNG into DIR")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("thumbnail-out")
                .long("thumbnail-out")
                .value_name("DIR")
                .help("Also write every extracted thumbnail as PNG into DIR")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Expands directories into the image files below them.
fn collect_inputs(paths: &[PathBuf], include_hidden: bool) -> color_eyre::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = list_image_files(path, include_hidden)
                .wrap_err_with(|| format!("Failed to walk {}", path.display()))?;
            info!(dir = %path.display(), count = found.len(), "Collected images");
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn artefact_path(dir: &Path, source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    dir.join(format!("{stem}_{suffix}.png"))
}

fn write_artefacts(
    record: &AnalysisRecord,
    source: &Path,
    ela_out: Option<&PathBuf>,
    thumbnail_out: Option<&PathBuf>,
) -> color_eyre::Result<()> {
    if let (Some(dir), Some(ela)) = (ela_out, record.ela.image()) {
        let target = artefact_path(dir, source, "ela");
        std::fs::write(&target, &ela.png)
            .wrap_err_with(|| format!("Failed to write {}", target.display()))?;
    }
    if let (Some(dir), Some(thumbnail)) = (thumbnail_out, record.thumbnail.thumbnail()) {
        let target = artefact_path(dir, source, "thumbnail");
        std::fs::write(&target, &thumbnail.png)
            .wrap_err_with(|| format!("Failed to write {}", target.display()))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let matches = build_cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    let paths: Vec<PathBuf> = matches
        .get_many::<PathBuf>("paths")
        .ok_or_else(|| eyre!("No input paths given"))?
        .cloned()
        .collect();
    let quality = matches
        .get_one::<u8>("quality")
        .copied()
        .unwrap_or(DEFAULT_QUALITY);
    let amplification = matches
        .get_one::<u8>("amplification")
        .copied()
        .unwrap_or(DEFAULT_AMPLIFICATION);
    let pretty = matches.get_flag("pretty");
    let ela_out = matches.get_one::<PathBuf>("ela-out");
    let thumbnail_out = matches.get_one::<PathBuf>("thumbnail-out");

    for dir in [ela_out, thumbnail_out].into_iter().flatten() {
        std::fs::create_dir_all(dir)
            .wrap_err_with(|| format!("Failed to create {}", dir.display()))?;
    }

    let analyzer = ForensicAnalyzer::builder()
        .ela_quality(quality)
        .ela_amplification(amplification)
        .parallel(!matches.get_flag("sequential"))
        .build();

    let files = collect_inputs(&paths, matches.get_flag("hidden"))?;
    let mut failures = 0usize;
    for file in &files {
        let json = match analyzer.analyze_file(file).await {
            Ok(record) => {
                if let Err(e) = write_artefacts(&record, file, ela_out, thumbnail_out) {
                    warn!("{e:#}");
                }
                serde_json::to_value(&record)?
            }
            Err(e) => {
                failures += 1;
                warn!(path = %file.display(), "Analysis failed: {e}");
                serde_json::json!({
                    "filename": file.display().to_string(),
                    "error": e.to_string(),
                })
            }
        };
        if pretty {
            println!("{}", serde_json::to_string_pretty(&json)?);
        } else {
            println!("{json}");
        }
    }

    info!(total = files.len(), failures, "Finished");
    Ok(())
}
