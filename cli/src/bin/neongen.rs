use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use brush_mask::{MaskSurface, StrokeScript, codec};
use clap::{Parser, Subcommand};
use cli::{LogReporter, StudioConfig};
use color_eyre::eyre::{Result, eyre};
use genai::GeminiClient;
use lifecycle::{
    EDIT_DOWNLOAD_NAME, EditorSession, GeneratorSession, MaskPolicy, OperationController,
    OperationState, save_asset,
};
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit an image from a text instruction
    Edit {
        /// Source image (PNG or JPEG)
        #[arg(short, long)]
        image: PathBuf,
        #[arg(short, long)]
        prompt: String,
        /// JSON stroke script marking the region to change
        #[arg(short, long)]
        strokes: Option<PathBuf>,
        /// Send the brushed region to the model as a mask
        #[arg(long)]
        attach_mask: bool,
        /// Defaults to `<output_dir>/neon-gen-edit.png`
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Generate a new image from a text description
    Generate {
        #[arg(short, long)]
        prompt: String,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Render the brush highlight over an image without calling the model
    Preview {
        #[arg(short, long)]
        image: PathBuf,
        #[arg(short, long)]
        strokes: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the JSON schema of the stroke script format
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Edit {
            image,
            prompt,
            strokes,
            attach_mask,
            output,
            config,
        } => {
            let config = StudioConfig::load(config.as_deref())?;
            edit_image(
                &config,
                image,
                prompt,
                strokes.as_deref(),
                *attach_mask,
                output.as_deref(),
            )
            .await?;
        }
        Commands::Generate {
            prompt,
            output_dir,
            config,
        } => {
            let config = StudioConfig::load(config.as_deref())?;
            generate_image(&config, prompt, output_dir.as_deref()).await?;
        }
        Commands::Preview {
            image,
            strokes,
            output,
            config,
        } => {
            let config = StudioConfig::load(config.as_deref())?;
            preview(&config, image, strokes, output)?;
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&StrokeScript::schema())?);
        }
    }

    Ok(())
}

fn controller(config: &StudioConfig) -> Result<OperationController> {
    let client = GeminiClient::new(config.genai_config())?;
    Ok(OperationController::new(Arc::new(client)).with_reporter(Arc::new(LogReporter)))
}

async fn edit_image(
    config: &StudioConfig,
    image: &Path,
    prompt: &str,
    strokes: Option<&Path>,
    attach_mask: bool,
    output: Option<&Path>,
) -> Result<()> {
    let policy = if attach_mask { MaskPolicy::Attach } else { config.mask_policy };
    let mut session = EditorSession::new(controller(config)?).with_mask_policy(policy);

    let size = session.load_image(codec::read_image_file(image)?)?;
    info!(width = size.width, height = size.height, "Loaded {:?}", image);

    if let Some(width) = config.brush_width {
        session.set_brush_width(width);
    }
    if let Some(path) = strokes {
        session.apply_script(&StrokeScript::from_json_file(path)?);
        info!(strokes = session.surface().strokes().len(), mask = %policy, "Applied brush strokes");
    }

    session.set_prompt(prompt);
    let finished = session.edit()?.wait().await;
    let target = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.output_dir.join(EDIT_DOWNLOAD_NAME));
    write_result(finished, &target)
}

async fn generate_image(
    config: &StudioConfig,
    prompt: &str,
    output_dir: Option<&Path>,
) -> Result<()> {
    let mut session = GeneratorSession::new(controller(config)?);
    session.set_prompt(prompt);

    let finished = session.generate()?.wait().await;
    let target = output_dir.unwrap_or(config.output_dir.as_path()).join(session.download_name());
    write_result(finished, &target)
}

fn write_result(finished: OperationState, target: &Path) -> Result<()> {
    match finished {
        OperationState::Success { image } => {
            let path = save_asset(&image, target)?;
            info!("✅ Result saved to {:?}", path);
            Ok(())
        }
        OperationState::Error { message } => Err(eyre!(message)),
        other => Err(eyre!("Operation ended in unexpected state {}", other.status())),
    }
}

fn preview(config: &StudioConfig, image: &Path, strokes: &Path, output: &Path) -> Result<()> {
    let mut surface = MaskSurface::new();
    surface.load_asset(&codec::read_image_file(image)?)?;
    if let Some(width) = config.brush_width {
        surface.set_brush_width(width);
    }
    StrokeScript::from_json_file(strokes)?.apply(&mut surface);

    let path = save_asset(&surface.snapshot()?, output)?;
    info!(strokes = surface.strokes().len(), "Preview saved to {:?}", path);
    Ok(())
}
