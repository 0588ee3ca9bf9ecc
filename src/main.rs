use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use editor::config::EditorConfig;
use editor::doc::{MaskKind, Rect};
use editor::editor::{Editor, Host, Prompt};
use editor::engine::Action;
use editor::error::{ExportError, LoadError, TooLarge};
use editor::i18n::{Lang, MemoryLangStore, Message};
use editor::loader::{self, DownscaleProposal, Verdict};
use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("invalid mask file: {0}")]
    InvalidMasks(#[from] serde_json::Error),
    #[error("{source} ({hint})")]
    Load { source: LoadError, hint: String },
    #[error("{source} ({hint})")]
    Export { source: ExportError, hint: String },
}

#[derive(Parser, Debug)]
#[command(name = "image-redact", about = "Redact regions of PNG/JPEG/WebP images")]
struct Cli {
    /// Display language for notices (`ja` or `en`).
    #[arg(long, global = true, env = "REDACT_LANG")]
    lang: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report format, size and whether the image can be edited.
    Inspect { file: PathBuf },
    /// Apply masks from a JSON file and export the redacted PNG.
    Apply(ApplyArgs),
}

#[derive(Args, Debug)]
struct ApplyArgs {
    file: PathBuf,

    /// JSON array of `{x, y, w, h, type?, strength?}`.
    #[arg(long)]
    masks: PathBuf,

    /// Output file, or a directory to place the timestamped file in.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Edit large images at the proposed reduced size.
    #[arg(long, default_value_t = false)]
    accept_downscale: bool,

    /// Coordinate space of the mask file.
    #[arg(long, value_enum, default_value_t = Coords::Original)]
    coords: Coords,

    /// Raise weak blur/pixelate masks to the recommended strength.
    #[arg(long, default_value_t = false)]
    boost_weak: bool,

    /// Confirm the preview was checked; nothing is written without it.
    #[arg(long, default_value_t = false)]
    verified: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Coords {
    /// Pixels of the file on disk.
    Original,
    /// Pixels of the (possibly downscaled) editing image.
    Edit,
}

#[derive(Debug, Deserialize)]
struct MaskSpec {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    #[serde(rename = "type", default)]
    kind: MaskKind,
    strength: Option<u32>,
}

/// Non-interactive host: prompts are answered from flags.
struct CliHost {
    accept_downscale: bool,
    lang: Lang,
}

impl Host for CliHost {
    fn confirm_downscale(&mut self, proposal: &DownscaleProposal) -> bool {
        println!("{}", proposal.message().text(self.lang));
        println!("  downscale: {}", if self.accept_downscale { "accepted" } else { "declined" });
        self.accept_downscale
    }

    fn confirm(&mut self, prompt: Prompt) -> bool {
        tracing::debug!(?prompt, "auto-confirmed");
        true
    }

    fn handle(&mut self, action: Action) {
        tracing::debug!(?action, "editor action");
    }
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = EditorConfig::from_env();
    if let Some(tag) = cli.lang.as_deref() {
        config.lang = Some(Lang::from_tag(tag));
    }

    match cli.command {
        Command::Inspect { file } => run_inspect(&config, &file),
        Command::Apply(args) => run_apply(config, args),
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::Read { path: path.to_path_buf(), source })
}

/// Language for output produced outside an [`Editor`].
fn lang_of(config: &EditorConfig) -> Lang {
    config.lang.or_else(locale_lang).unwrap_or_default()
}

fn locale_lang() -> Option<Lang> {
    std::env::var("LANG").ok().filter(|tag| !tag.is_empty()).map(|tag| Lang::from_tag(&tag))
}

fn load_error(source: LoadError, lang: Lang) -> CliError {
    let hint = source.user_message(lang);
    CliError::Load { source, hint }
}

fn export_error(source: ExportError, lang: Lang) -> CliError {
    let hint = source.user_message(lang);
    CliError::Export { source, hint }
}

fn run_inspect(config: &EditorConfig, file: &Path) -> Result<(), CliError> {
    let lang = lang_of(config);
    let bytes = read_file(file)?;
    let info = loader::inspect(&bytes, &config.limits).map_err(|e| load_error(e, lang))?;

    println!("format: {}", info.format.mime());
    println!("size: {}x{} ({:.1} MP)", info.width, info.height, info.megapixels());
    match info.verdict {
        Verdict::Fits => println!("verdict: fits"),
        Verdict::Downscale(proposal) => {
            println!(
                "verdict: downscale proposed to {}x{} (x{:.3})",
                proposal.to_width, proposal.to_height, proposal.scale
            );
            println!("{}", proposal.message().text(lang));
        }
        Verdict::TooLarge(reason) => {
            println!("verdict: refused ({reason})");
            println!("{}", too_large_message(reason).text(lang));
        }
    }
    Ok(())
}

fn too_large_message(reason: TooLarge) -> Message {
    match reason {
        TooLarge::Dimension { .. } => Message::TooLargeDimension,
        TooLarge::Megapixels { limit } => Message::TooLargeMegapixels { limit },
    }
}

fn run_apply(config: EditorConfig, args: ApplyArgs) -> Result<(), CliError> {
    let bytes = read_file(&args.file)?;
    let specs: Vec<MaskSpec> = serde_json::from_slice(&read_file(&args.masks)?)?;
    let recommended = config.strength.recommended;

    let store = MemoryLangStore::new(locale_lang());
    let host = CliHost { accept_downscale: args.accept_downscale, lang: lang_of(&config) };
    let mut editor = Editor::new(host, config, &store);
    let lang = editor.lang();
    editor.host_mut().lang = lang;

    editor.open(&bytes).map_err(|e| load_error(e, lang))?;
    if let Some(image) = editor.image() {
        tracing::info!(
            width = image.edit_width(),
            height = image.edit_height(),
            downscaled = image.downscale_applied,
            "editing image"
        );
    }

    let mut rejected = 0_usize;
    for (index, spec) in specs.iter().enumerate() {
        let mut rect = Rect::new(spec.x, spec.y, spec.w, spec.h);
        if args.coords == Coords::Original {
            if let Some(image) = editor.image() {
                rect = image.original_to_edit(rect);
            }
        }
        let strength = spec.strength.unwrap_or(recommended);
        if editor.add_mask(rect, spec.kind, strength).is_none() {
            rejected += 1;
            println!("mask {index}: rejected (too small or outside the image)");
        }
    }
    println!("masks: {} applied, {rejected} rejected", editor.masks().len());

    if args.boost_weak {
        let boosted = editor.boost_weak_masks();
        println!("boosted: {boosted}");
    }

    let preview = editor.open_preview().map_err(|e| export_error(e, lang))?;
    println!("preview: {}x{}", preview.width(), preview.height());
    for notice in [preview.weak_warning(), preview.scaled_notice()].into_iter().flatten() {
        println!("{}", notice.text(lang));
    }

    editor.set_verified(args.verified);
    let file = editor.export(OffsetDateTime::now_utc()).map_err(|e| export_error(e, lang))?;

    let path = if args.out.is_dir() { args.out.join(&file.name) } else { args.out.clone() };
    fs::write(&path, &file.bytes).map_err(|source| CliError::Write { path: path.clone(), source })?;
    tracing::info!(path = %path.display(), width = file.width, height = file.height, scaled = file.scaled, "exported");
    println!("wrote {}", path.display());
    Ok(())
}
