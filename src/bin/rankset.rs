use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rankset::{RankedSet, SnapshotOptions};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Build a snapshot from `id [score]` lines.
    Build {
        /// Text input, one member per line. `-` reads stdin.
        input: PathBuf,
        /// Snapshot file to write.
        output: PathBuf,
        /// gzip level 0-9. Defaults to the fastest level.
        #[arg(long)]
        level: Option<u32>,
    },
    /// Print member and score counts of a snapshot.
    Inspect { snapshot: PathBuf },
    /// Print scored members in rank order.
    Top {
        snapshot: PathBuf,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print member ids greater than `--after`, ascending.
    Page {
        snapshot: PathBuf,
        #[arg(long, default_value_t = 0)]
        after: u32,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Build {
            input,
            output,
            level,
        } => build(&input, &output, level),
        Cmd::Inspect { snapshot } => inspect(&snapshot),
        Cmd::Top {
            snapshot,
            offset,
            limit,
        } => top(&snapshot, offset, limit),
        Cmd::Page {
            snapshot,
            after,
            limit,
        } => page(&snapshot, after, limit),
    }
}

fn open(path: &Path) -> Result<RankedSet> {
    let set = RankedSet::new();
    set.load_from_path(path)
        .with_context(|| format!("loading snapshot {}", path.display()))?;
    Ok(set)
}

fn parse_line(line: &str) -> Result<Option<(u32, Option<f32>)>> {
    let mut fields = line.split_whitespace();
    let Some(id) = fields.next() else {
        return Ok(None);
    };
    if id.starts_with('#') {
        return Ok(None);
    }
    let id: u32 = id.parse().with_context(|| format!("bad id {id:?}"))?;
    let score = match fields.next() {
        Some(s) => Some(s.parse::<f32>().with_context(|| format!("bad score {s:?}"))?),
        None => None,
    };
    if fields.next().is_some() {
        bail!("expected `id [score]`, got {line:?}");
    }
    Ok(Some((id, score)))
}

fn build(input: &Path, output: &Path, level: Option<u32>) -> Result<()> {
    let reader: Box<dyn BufRead> = if input == Path::new("-") {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file =
            File::open(input).with_context(|| format!("opening input {}", input.display()))?;
        Box::new(BufReader::new(file))
    };

    let set = RankedSet::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let parsed = parse_line(&line).with_context(|| format!("line {}", lineno + 1))?;
        match parsed {
            Some((id, Some(score))) => set.insert(id, score),
            Some((id, None)) => set.add([id]),
            None => {}
        }
    }

    let opts = match level {
        Some(level) if level <= 9 => SnapshotOptions::with_level(flate2::Compression::new(level)),
        Some(level) => bail!("compression level {level} out of range 0-9"),
        None => SnapshotOptions::default(),
    };
    let mut w = BufWriter::new(
        File::create(output).with_context(|| format!("creating {}", output.display()))?,
    );
    set.save_with(&mut w, &opts)?;
    w.flush()?;
    info!(
        members = set.count(),
        scored = set.scored_len(),
        path = %output.display(),
        "snapshot written"
    );
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let set = open(path)?;
    println!("members {}", set.count());
    println!("scored  {}", set.scored_len());
    Ok(())
}

fn top(path: &Path, offset: usize, limit: usize) -> Result<()> {
    let set = open(path)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for item in set.ranked_items(offset, limit) {
        writeln!(out, "{} {}", item.id, item.score)?;
    }
    Ok(())
}

fn page(path: &Path, after: u32, limit: usize) -> Result<()> {
    let set = open(path)?;
    let mut buf = vec![0u32; limit];
    let n = set.range(after, &mut buf);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for id in &buf[..n] {
        writeln!(out, "{id}")?;
    }
    Ok(())
}
