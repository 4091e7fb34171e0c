use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use photo_annotator::{EditorCommand, EditorConfig, EditorSession, FileSink};

#[derive(Parser, Debug)]
#[command(name = "photo-annotator", about = "Annotate a photo and flatten it to PNG")]
struct Cli {
    /// Image path, file:// URL or http(s):// URL
    image: String,

    /// JSON array of editor commands to replay
    #[arg(long)]
    script: PathBuf,

    /// Directory for saved PNGs (defaults to the Pictures folder)
    #[arg(long, env = "PHOTO_ANNOTATOR_OUTPUT")]
    output: Option<PathBuf>,

    /// Config file to use instead of the per-user one
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EditorConfig::load_from(path)?,
        None => EditorConfig::load(),
    };

    let script = std::fs::read_to_string(&cli.script)
        .with_context(|| format!("reading script {}", cli.script.display()))?;
    let commands: Vec<EditorCommand> =
        serde_json::from_str(&script).context("parsing editor commands")?;

    let mut sink = match cli.output {
        Some(dir) => FileSink::new(dir),
        None => FileSink::pictures().context("no Pictures directory; pass --output")?,
    };

    let mut session = EditorSession::open(&cli.image, config).await?;
    let saves_requested = commands.iter().any(|c| *c == EditorCommand::Save);
    for (i, command) in commands.into_iter().enumerate() {
        log::debug!("Command {}: {:?}", i, command);
        session
            .dispatch(command, &mut sink)
            .with_context(|| format!("command {} failed", i))?;
    }
    if !saves_requested {
        session.save(&mut sink)?;
    }

    for path in sink.saved() {
        println!("{}", path.display());
    }
    Ok(())
}
