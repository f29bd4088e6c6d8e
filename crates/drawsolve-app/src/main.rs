//! Main application entry point.

use clap::Parser;
use drawsolve_app::{Script, ScriptError, Session, ShortcutRegistry};
use drawsolve_core::config::Settings;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "drawsolve", version, about = "Replay a Draw & Solve session and export the canvas")]
struct Cli {
    /// JSON script of host actions.
    #[arg(required_unless_present = "shortcuts")]
    script: Option<PathBuf>,

    /// PNG output path.
    #[arg(short, long, default_value = "canvas.png")]
    output: PathBuf,

    /// Settings JSON; defaults apply when omitted.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Also write the 3D scene mirror as JSON.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Print the PNG as a data URL instead of writing a file.
    #[arg(long)]
    data_url: bool,

    /// List keyboard shortcuts and exit.
    #[arg(long)]
    shortcuts: bool,
}

fn run(cli: &Cli) -> Result<(), ScriptError> {
    let path = cli.script.as_ref().ok_or(ScriptError::MissingScript)?;
    let settings = match &cli.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let script = Script::load(path)?;
    log::info!("Replaying {} steps from {}", script.steps.len(), path.display());

    let mut session = Session::new(settings, script.width, script.height)?;
    session.run(&script)?;
    for message in session.notifications() {
        eprintln!("drawsolve: {message}");
    }

    if let Some(scene_path) = &cli.scene {
        let scene = serde_json::to_string_pretty(&session.scene())?;
        std::fs::write(scene_path, scene)?;
        log::info!("Wrote 3D scene to {}", scene_path.display());
    }

    if cli.data_url {
        println!("{}", session.export_data_url()?);
    } else {
        std::fs::write(&cli.output, session.export_png()?)?;
        log::info!("Wrote {}", cli.output.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if cli.shortcuts {
        ShortcutRegistry::print_all();
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("drawsolve: {err}");
            ExitCode::FAILURE
        }
    }
}
