use subframe::markup::{self, Marker, Selection};
use subframe::{batch, serialiser, Notifier, Session};

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser as ClapParser, Subcommand};
use log::{error, info, warn};

fn main() {
    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Build SRT subtitles from extracted subtitle frames")]
struct Cli {
    #[arg(short, long, global = true, help = "Log debug output.")]
    verbose: bool,
    #[arg(
        short,
        long,
        global = true,
        env = "SUBFRAME_FORCE",
        help = "Answer yes to every confirmation (replacing files, discarding changes)."
    )]
    force: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a batch description file.
    Check {
        #[arg(value_name = "BATCH")]
        batch: PathBuf,
    },
    /// Load a batch description, import SRT text onto it and write the result.
    Merge(MergeArgs),
    /// Toggle a markup tag in a piece of subtitle text.
    Toggle(ToggleArgs),
}

#[derive(Args)]
struct MergeArgs {
    #[arg(value_name = "BATCH")]
    batch: PathBuf,
    #[arg(
        short,
        long,
        value_name = "FILE",
        required = true,
        help = "SRT file whose text is merged onto the batch. May be given more than once."
    )]
    import: Vec<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to write to. If not supplied, the subtitles will be written to standard output.",
        default_value = "-"
    )]
    output: String,
}

#[derive(Args)]
struct ToggleArgs {
    #[arg(long, default_value = "<i>", help = "Opening tag; the closing tag is derived from it.")]
    tag: String,
    #[arg(long)]
    text: String,
    #[arg(long, conflicts_with = "select", help = "Caret position, in characters.")]
    caret: Option<usize>,
    #[arg(long, value_parser = parse_range, value_name = "START..END", help = "Selected character range.")]
    select: Option<(usize, usize)>,
}

/// Reports through the log and answers confirmations from `--force`.
struct ConsoleNotifier {
    force: bool,
    errors: usize,
}

impl Notifier for ConsoleNotifier {
    fn error(&mut self, title: &str, message: &str) {
        self.errors += 1;
        error!("{}: {}", title, message);
    }

    fn info(&mut self, title: &str, message: &str) {
        info!("{}: {}", title, message);
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        if !self.force {
            warn!("{}: {} Declined, pass --force to accept.", title, message);
        }
        self.force
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut notifier = ConsoleNotifier {
        force: cli.force,
        errors: 0,
    };

    match cli.command {
        Command::Check { batch } => check(&batch),
        Command::Merge(args) => merge(args, &mut notifier),
        Command::Toggle(args) => toggle(args),
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .context(format!("Failed to open input file: '{}'", path.display()))
}

fn check(path: &Path) -> Result<()> {
    let parsed = batch::parse(&read(path)?);
    if let Some(err) = parsed.error {
        return Err(anyhow::Error::new(err)
            .context(format!("Failed to parse batch file: '{}'", path.display())));
    }
    if parsed.records.is_empty() {
        return Err(anyhow!("You appear to have supplied an empty file."));
    }
    println!("{} subtitles", parsed.records.len());
    Ok(())
}

fn merge(args: MergeArgs, notifier: &mut ConsoleNotifier) -> Result<()> {
    let mut session = Session::new();
    if !session.load_batch(&args.batch, &read(&args.batch)?, notifier) {
        return Err(anyhow!(
            "No subtitles loaded from '{}'",
            args.batch.display()
        ));
    }

    for path in &args.import {
        session.import(&read(path)?, notifier);
    }

    if args.output == "-" {
        let mut dst = io::stdout().lock();
        serialiser::write_records(&mut dst, session.records())?;
        dst.flush()?;
    } else if session.save(Path::new(&args.output), notifier).is_none() {
        return Err(anyhow!("Subtitles were not saved."));
    }

    if notifier.errors > 0 {
        return Err(anyhow!("{} problem(s) reported", notifier.errors));
    }
    Ok(())
}

fn toggle(args: ToggleArgs) -> Result<()> {
    let marker = Marker::new(&args.tag)?;
    let selection = match (args.select, args.caret) {
        (Some((start, end)), _) => Selection::new(start, end),
        (None, Some(caret)) => Selection::new(caret, caret),
        (None, None) => Selection::Caret(args.text.chars().count()),
    };
    let toggled = markup::toggle(&args.text, &marker, selection);
    println!("{}", toggled.text);
    info!("{:?}", toggled.selection);
    Ok(())
}

fn parse_range(value: &str) -> Result<(usize, usize), String> {
    let (start, end) = value
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got '{}'", value))?;
    let start = start.parse::<usize>().map_err(|e| format!("invalid start: {}", e))?;
    let end = end.parse::<usize>().map_err(|e| format!("invalid end: {}", e))?;
    Ok((start, end))
}
