use std::path::PathBuf;

use clap::Parser;

use crate::config::EditorConfig;

/// Headless SS editor session.
#[derive(Parser, Debug)]
#[command(
    name = "sseditor",
    about = "Runs a headless SS editor session",
    long_about = "Runs a headless SS editor session.\n\n\
        A render thread ticks a demo scene at a fixed rate while the UI thread\n\
        issues a scripted sequence of edits, undos and redos through the\n\
        document's change consumer.\n\
        \n\
        EXAMPLES:\n\
          # Use sseditor.toml from the working directory, if present\n\
          sseditor\n\
        \n\
          # Explicit config, run at least 300 frames at 30 Hz\n\
          sseditor --config my.toml --frames 300 --tick-rate 30",
    version
)]
pub struct EditorArgs {
    /// Configuration file. Defaults to ./sseditor.toml when it exists.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Keep ticking until at least N frames were rendered.
    #[arg(long)]
    pub frames: Option<u64>,

    /// Render ticks per second.
    #[arg(long)]
    pub tick_rate: Option<f64>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short)]
    pub verbose: bool,
}

impl EditorArgs {
    /// Applies command-line overrides on top of the file configuration.
    pub fn apply(&self, config: &mut EditorConfig) {
        if let Some(frames) = self.frames {
            config.session.frames = frames;
        }
        if let Some(tick_rate) = self.tick_rate {
            config.render.tick_rate = tick_rate;
        }
        if self.verbose {
            config.logging.filter = "debug".into();
        }
    }
}
