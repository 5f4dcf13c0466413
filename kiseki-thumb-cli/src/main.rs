use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use kiseki_thumb::registry::{self, RegScript};
use kiseki_thumb::{HandlerRegistration, ThumbnailConfig, ThumbnailResult};

#[derive(Parser)]
#[command(name = "kiseki-thumb")]
#[command(about = "Extract embedded previews from .rbxl files", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true, default_value_t)]
    verbose: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true, default_value_t)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the preview image from a container file
    Extract {
        /// Input container file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Write the preview as an image (format from the extension)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print a JSON summary of the result
        #[arg(long, default_value_t)]
        json: bool,

        /// Override the header closing tag
        #[arg(long, value_name = "TAG")]
        delimiter: Option<String>,

        /// Override the read chunk size
        #[arg(long, value_name = "BYTES")]
        chunk_size: Option<usize>,

        /// Store the effective delimiter and chunk size as the new defaults
        #[arg(long, default_value_t)]
        save_config: bool,
    },

    /// Wrap an image into a minimal container
    Build {
        /// Source image (any format the decoder understands)
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Output container file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// JPEG quality (0-100)
        #[arg(long, value_name = "QUALITY", default_value_t = 85)]
        quality: u8,
    },

    /// Emit a .reg script registering the thumbnail handler
    Register {
        /// Path of the handler module to register
        #[arg(long, value_name = "PATH")]
        module: String,

        /// Write the script here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Emit a .reg script removing the thumbnail handler
    Unregister {
        /// Write the script here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(args.verbose, args.quiet);

    match args.command {
        Command::Extract {
            input,
            output,
            json,
            delimiter,
            chunk_size,
            save_config,
        } => {
            let config = build_config(delimiter, chunk_size)?;
            if save_config {
                config.save().context("Failed to save configuration")?;
                log::info!("Saved configuration");
            }
            let thumb = extract(&input, &config)?;

            log::info!(
                "Preview: {}x{} (stride {})",
                thumb.width,
                thumb.height,
                thumb.stride
            );

            if let Some(output) = output {
                kiseki_thumb::image::save(&thumb, &output)
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                log::info!("Done: {}", output.display());
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&thumb)?);
            }
        }
        Command::Build {
            image,
            output,
            quality,
        } => {
            if quality > 100 {
                anyhow::bail!("Quality must be between 0 and 100");
            }
            let bytes = build_container(&image, quality)?;
            std::fs::write(&output, bytes).context("Failed to write container file")?;
            log::info!("Done: {}", output.display());
        }
        Command::Register { module, output } => {
            let mut script = RegScript::new();
            registry::register(&mut script, &HandlerRegistration::default(), &module)?;
            emit_script(&script, output.as_deref())?;
        }
        Command::Unregister { output } => {
            let mut script = RegScript::new();
            registry::unregister(&mut script, &HandlerRegistration::default())?;
            emit_script(&script, output.as_deref())?;
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn build_config(delimiter: Option<String>, chunk_size: Option<usize>) -> Result<ThumbnailConfig> {
    let mut config = ThumbnailConfig::load().unwrap_or_default();

    if let Some(delimiter) = delimiter {
        config.delimiter = delimiter;
    }
    if let Some(chunk_size) = chunk_size {
        config.chunk_size = chunk_size;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn extract(input: &Path, config: &ThumbnailConfig) -> Result<ThumbnailResult> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let file = File::open(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let mut reader = BufReader::new(file);

    kiseki_thumb::extract_thumbnail_with(&mut reader, config).map_err(|e| {
        let stage = e.stage().as_str();
        anyhow::Error::new(e).context(format!(
            "No preview could be extracted from {} ({stage} stage failed)",
            input.display()
        ))
    })
}

fn build_container(source: &Path, quality: u8) -> Result<Vec<u8>> {
    let img = image::open(source)
        .with_context(|| format!("Failed to open image {}", source.display()))?;

    let mut bytes = b"<roblox version=\"4\">\n".to_vec();
    bytes.extend_from_slice(kiseki_thumb::DELIMITER);
    bytes.push(0);
    kiseki_thumb::image::compress_to_jpeg(&img, &mut bytes, quality)
        .context("Failed to compress preview to JPEG")?;

    Ok(bytes)
}

fn emit_script(script: &RegScript, output: Option<&Path>) -> Result<()> {
    let text = script.render();
    match output {
        Some(path) => std::fs::write(path, text).context("Failed to write registry script")?,
        None => std::io::stdout()
            .write_all(text.as_bytes())
            .context("Failed to write registry script")?,
    }
    Ok(())
}
