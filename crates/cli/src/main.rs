use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use genderscan_core::capture::domain::frame_source::FrameSource;
use genderscan_core::capture::infrastructure::image_file_source::{is_image, ImageFileSource};
use genderscan_core::capture::infrastructure::image_file_writer::ImageFileWriter;
use genderscan_core::capture::infrastructure::synthetic_frame_source::SyntheticFrameSource;
use genderscan_core::detection::infrastructure::model_resolver::{self, ModelLocation};
use genderscan_core::pipeline::analyze_frame_use_case::AnalyzeFrameUseCase;
use genderscan_core::pipeline::analyzer_factory::{create_analyzer, AnalyzerKind, ModelPaths};
use genderscan_core::pipeline::live_session::LiveSession;
use genderscan_core::pipeline::menu_session::MenuSession;
use genderscan_core::pipeline::pipeline_logger::StatsPipelineLogger;
use genderscan_core::pipeline::snapshot_saver::SnapshotSaver;
use genderscan_core::presentation::infrastructure::console_report_presenter::ConsoleReportPresenter;
use genderscan_core::presentation::infrastructure::overlay_presenter::OverlayPresenter;
use genderscan_core::shared::constants::{
    DEFAULT_PREVIEW_PATH, FACE_MODEL_NAME, FACE_MODEL_URL, GENDER_MODEL_NAME,
};
use genderscan_core::shared::settings::AnalyzerSettings;

/// Face location and gender guessing on image files or a test pattern.
#[derive(Parser)]
#[command(name = "genderscan")]
struct Cli {
    /// JSON settings file; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Analyzer: heuristic or onnx.
    #[arg(long, default_value = "heuristic")]
    analyzer: String,

    /// Face detection ONNX model (onnx analyzer).
    #[arg(long)]
    face_model: Option<PathBuf>,

    /// Gender classification ONNX model (onnx analyzer).
    #[arg(long)]
    gender_model: Option<PathBuf>,

    /// Face detection confidence threshold (0.0-1.0), overrides the config.
    #[arg(long)]
    confidence: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze frame after frame; 's' saves the annotated frame, 'q' quits.
    Live {
        /// Image files served one per frame, in order.
        #[arg(long)]
        input: Vec<PathBuf>,

        /// Use the synthetic test pattern instead of image files.
        #[arg(long)]
        synthetic: bool,

        /// Where the annotated frame is written after every iteration.
        #[arg(long, default_value = DEFAULT_PREVIEW_PATH)]
        preview: PathBuf,

        /// Directory for saved captured_<n>.jpg snapshots.
        #[arg(long, default_value = ".")]
        save_dir: PathBuf,
    },
    /// Numbered text menu with a per-face report.
    Menu {
        /// Image used as the camera stand-in; defaults to the test pattern.
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let kind: AnalyzerKind = cli.analyzer.parse()?;
    let mut settings = AnalyzerSettings::load_or_default(cli.config.as_deref())?;
    if let Some(confidence) = cli.confidence {
        settings.onnx.confidence = confidence;
    }

    let models = match kind {
        AnalyzerKind::Onnx => Some(resolve_models(&cli)?),
        AnalyzerKind::Heuristic => None,
    };
    let analyzer = create_analyzer(kind, &settings, models.as_ref())?;
    let use_case = AnalyzeFrameUseCase::new(analyzer, Box::new(StatsPipelineLogger::default()));

    match cli.command {
        Command::Live {
            input,
            synthetic,
            preview,
            save_dir,
        } => run_live(use_case, &input, synthetic, preview, save_dir),
        Command::Menu { input } => run_menu(use_case, input),
    }
}

fn run_live(
    use_case: AnalyzeFrameUseCase,
    input: &[PathBuf],
    synthetic: bool,
    preview: PathBuf,
    save_dir: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let source: Box<dyn FrameSource> = if synthetic || input.is_empty() {
        Box::new(SyntheticFrameSource::default())
    } else {
        Box::new(ImageFileSource::new(input.to_vec(), false)?)
    };
    let preview_display = preview.display().to_string();
    let presenter = OverlayPresenter::new(Box::new(ImageFileWriter::new()), preview);
    let saver = SnapshotSaver::new(Box::new(ImageFileWriter::new()), save_dir);

    println!("Annotated preview: {preview_display}");
    let mut session = LiveSession::new(
        use_case,
        source,
        presenter,
        saver,
        io::stdin().lock(),
        io::stdout(),
    );
    let summary = session.run()?;
    log::info!(
        "Live session ended after {} frame(s), {} snapshot(s) saved",
        summary.frames,
        summary.saved.len()
    );
    Ok(())
}

fn run_menu(
    use_case: AnalyzeFrameUseCase,
    input: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let source: Box<dyn FrameSource> = match input {
        Some(path) => Box::new(ImageFileSource::new(vec![path], true)?),
        None => Box::new(SyntheticFrameSource::default()),
    };
    let presenter = ConsoleReportPresenter::new(io::stdout());

    let mut session = MenuSession::new(
        use_case,
        source,
        Box::new(presenter),
        io::stdin().lock(),
        io::stdout(),
    );
    let frames = session.run()?;
    log::info!("Menu session ended after {frames} analyzed frame(s)");
    Ok(())
}

fn resolve_models(cli: &Cli) -> Result<ModelPaths, Box<dyn std::error::Error>> {
    let bundled = bundled_model_dir();

    log::info!("Resolving model: {FACE_MODEL_NAME}");
    let face = model_resolver::resolve(
        &ModelLocation {
            name: FACE_MODEL_NAME,
            explicit: cli.face_model.as_deref(),
            bundled_dir: bundled.as_deref(),
            url: Some(FACE_MODEL_URL),
        },
        Some(Box::new(download_progress)),
    )?;

    log::info!("Resolving model: {GENDER_MODEL_NAME}");
    let gender = model_resolver::resolve(
        &ModelLocation {
            name: GENDER_MODEL_NAME,
            explicit: cli.gender_model.as_deref(),
            bundled_dir: bundled.as_deref(),
            url: None,
        },
        None,
    )?;

    Ok(ModelPaths { face, gender })
}

/// `models/` next to the executable.
fn bundled_model_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("models")))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    cli.analyzer.parse::<AnalyzerKind>()?;

    if let Some(confidence) = cli.confidence {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(format!(
                "Confidence must be between 0.0 and 1.0, got {confidence}"
            )
            .into());
        }
    }
    if let Some(config) = &cli.config {
        require_file(config, "Config file")?;
    }

    match &cli.command {
        Command::Live {
            input, synthetic, ..
        } => {
            if *synthetic && !input.is_empty() {
                return Err("--synthetic and --input are mutually exclusive".into());
            }
            for path in input {
                require_image(path)?;
            }
        }
        Command::Menu { input } => {
            if let Some(path) = input {
                require_image(path)?;
            }
        }
    }
    Ok(())
}

fn require_file(path: &Path, what: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(format!("{what} not found: {}", path.display()).into());
    }
    Ok(())
}

fn require_image(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    require_file(path, "Input file")?;
    if !is_image(path) {
        return Err(format!("Not a supported image file: {}", path.display()).into());
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
