use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use plotbooth::{Config, app};

#[derive(Parser, Debug)]
#[command(name = "plotbooth")]
#[command(version, about = "Photo booth that draws snapshots and text on a pen plotter")]
struct Cli {
    /// Config file to use instead of ~/.config/plotbooth/config.toml
    #[arg(long, short = 'c', global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the interactive booth session
    Run,

    /// Draw an SVG file on the plotter
    DrawSvg {
        file: PathBuf,

        /// Serial port (number from `plotbooth ports`, or a path)
        #[arg(long, short = 'p')]
        port: Option<String>,

        /// Treat the file as backend output and apply its sizing rect
        #[arg(long)]
        normalize: bool,
    },

    /// Upload a handwriting sample (JSON array of strokes of {x, y, t})
    UploadSample {
        file: PathBuf,

        #[arg(long, short = 'u')]
        username: Option<String>,

        /// Text the sample spells (defaults to the configured prompt)
        #[arg(long, short = 't')]
        transcription: Option<String>,
    },

    /// List serial ports
    Ports,

    /// Write a documented default config file
    InitConfig,
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Run) => {
            let config = load_config(cli.config.as_deref())?;
            log::info!("Starting booth session");
            app::run_session(config).await?;
        }
        Some(Command::DrawSvg {
            file,
            port,
            normalize,
        }) => {
            let config = load_config(cli.config.as_deref())?;
            app::draw_svg_file(&config, &file, port, normalize).await?;
        }
        Some(Command::UploadSample {
            file,
            username,
            transcription,
        }) => {
            let config = load_config(cli.config.as_deref())?;
            app::upload_sample_file(&config, &file, username, transcription).await?;
        }
        Some(Command::Ports) => app::print_ports()?,
        Some(Command::InitConfig) => {
            let path = match cli.config {
                Some(path) => path,
                None => Config::get_config_path()?,
            };
            Config::create_default_file(&path)?;
            println!("Created {}", path.display());
        }
        None => {
            println!("plotbooth: Photo booth that draws snapshots and text on a pen plotter");
            println!();
            println!("Usage:");
            println!("  plotbooth run                 Start the booth session");
            println!("  plotbooth draw-svg FILE       Draw an SVG file");
            println!("  plotbooth upload-sample FILE  Upload a handwriting sample");
            println!("  plotbooth ports               List serial ports");
            println!("  plotbooth init-config         Write ~/.config/plotbooth/config.toml");
            println!("  plotbooth --help              Show help");
        }
    }

    Ok(())
}
