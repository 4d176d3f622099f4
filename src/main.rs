use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use datemark::{
    BatchReport, Config, Pipeline,
    source::{DirectoryListing, SingleFile, prompt_for_file},
    startup_checks::{self, Target},
    watermark::{FontSearch, load_face},
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Stamp photos with their EXIF capture date", long_about = None)]
struct Cli {
    /// Directory whose images should be stamped (directory mode)
    directory: Option<PathBuf>,

    /// Stamp a single image instead of a directory
    #[arg(long, conflicts_with = "directory")]
    file: Option<PathBuf>,

    /// Text size in pixels [default: 24]
    #[arg(long = "font_size", alias = "font-size", value_parser = clap::value_parser!(u32).range(1..))]
    font_size: Option<u32>,

    /// Color name, #RRGGBB, "r,g,b" or "r,g,b,a" [default: 255,255,255,128]
    #[arg(long)]
    color: Option<String>,

    /// top-left, center or bottom-right [default: bottom-right]
    #[arg(long)]
    position: Option<String>,

    /// Preferred font file; may be repeated
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,

    /// Reject color expressions that cannot be parsed instead of using black
    #[arg(long)]
    strict_color: bool,

    #[arg(short, long, default_value = "datemark.toml")]
    config: PathBuf,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over --log-level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    apply_overrides(&mut config, &cli);

    let spec = match config.watermark_spec() {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Watermark: size {}, color {:?}, position {}",
        spec.font_size,
        spec.color.0,
        spec.anchor.name()
    );

    println!("=== datemark ===");

    let face = load_face(&FontSearch::new(&config.watermark.fonts));
    let pipeline = Pipeline::new(spec, face);

    let target_file = match (&cli.directory, &cli.file) {
        (Some(dir), _) => {
            run_checks(&Target::Directory(dir), &config.watermark.fonts);
            let report = pipeline.run(&DirectoryListing::new(dir))?;
            print_directory_report(&report);
            return Ok(());
        }
        (None, Some(file)) => SingleFile::new(file),
        (None, None) => {
            println!("Enter the path of the image to stamp (empty to cancel):");
            match prompt_for_file(std::io::stdin().lock())? {
                Some(file) => file,
                None => {
                    println!("No file selected, exiting.");
                    return Ok(());
                }
            }
        }
    };

    println!("Selected image: {}", target_file.path().display());
    run_checks(&Target::File(target_file.path()), &config.watermark.fonts);
    let report = pipeline.run(&target_file)?;
    print_single_report(&report);

    Ok(())
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    let settings = &mut config.watermark;
    if let Some(font_size) = cli.font_size {
        settings.font_size = font_size;
    }
    if let Some(color) = &cli.color {
        settings.color = color.clone();
    }
    if let Some(position) = &cli.position {
        settings.position = position.clone();
    }
    if !cli.fonts.is_empty() {
        settings.fonts = cli.fonts.clone();
    }
    if cli.strict_color {
        settings.strict_color = true;
    }
}

/// Exits the process on critical failures, before any output directory exists.
fn run_checks(target: &Target<'_>, fonts: &[PathBuf]) {
    match startup_checks::perform_startup_checks(target, fonts) {
        Ok(()) => info!("All startup checks passed"),
        Err(errors) => {
            for e in &errors {
                if e.is_critical() {
                    error!("Startup check failed: {}", e);
                    eprintln!("Error: {}", e);
                } else {
                    warn!("Startup check failed: {}", e);
                }
            }
            if errors.iter().any(|e| e.is_critical()) {
                std::process::exit(1);
            }
        }
    }
}

fn print_directory_report(report: &BatchReport) {
    for entry in &report.entries {
        match entry {
            Ok(outcome) => println!("✓ {} ({})", outcome.input.display(), outcome.date_text),
            Err(failure) => println!("✗ {}: {}", failure.input.display(), failure.reason),
        }
    }
    println!(
        "Done: {}/{} image(s) stamped into {}",
        report.succeeded(),
        report.total(),
        report.output_dir.display()
    );
}

fn print_single_report(report: &BatchReport) {
    for entry in &report.entries {
        match entry {
            Ok(outcome) => {
                println!("Capture date: {}", outcome.date_text);
                println!("✓ Watermark added");
                println!("✓ Output file: {}", outcome.output.display());
                println!("✓ Saved in: {}", report.output_dir.display());
            }
            Err(failure) => {
                println!("✗ Failed to stamp {}: {}", failure.input.display(), failure.reason)
            }
        }
    }
}
