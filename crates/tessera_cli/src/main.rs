use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tessera_cache::{RenderCache, SqliteRenderCache};
use tessera_cli::{config_loader, exec, walk};
use tessera_core::Dispatcher;
use tessera_core::model::DiagnosticLevel;

#[derive(Debug, Parser)]
#[command(name = "tessera")]
struct Cli {
    /// Config file, defaults to tessera.yaml in the working directory.
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Render block content in a file or directory.")]
    Render {
        path: PathBuf,
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    #[command(about = "Highlight a source file as a code block.")]
    Highlight {
        file: PathBuf,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        line_numbers: bool,
    },
    #[command(about = "Report malformed or unregistered blocks.")]
    Check { path: PathBuf },
    #[command(about = "Render every page of a site bundle.")]
    Build {
        #[arg(long, value_name = "PATH")]
        site: PathBuf,
        #[arg(long, value_name = "DIR", default_value = "out")]
        out: PathBuf,
        #[arg(long)]
        no_cache: bool,
        #[arg(long, value_name = "PATH")]
        cache_path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match &cli.command {
        Command::Render { path, out } => run_render(&cli, path, out.as_ref()),
        Command::Highlight {
            file,
            language,
            line_numbers,
        } => run_highlight(&cli, file, language.as_deref(), *line_numbers),
        Command::Check { path } => run_check(&cli, path),
        Command::Build {
            site,
            out,
            no_cache,
            cache_path,
        } => run_build(&cli, site, out, *no_cache, cache_path.as_ref()),
    }
}

fn init_logging(verbose: u8) {
    let level = if verbose == 0 {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Debug
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

fn root_dir() -> Result<PathBuf> {
    std::env::current_dir().context("failed to read current directory")
}

fn dispatcher(cli: &Cli) -> Result<Dispatcher> {
    let config = config_loader::load_config(&root_dir()?, cli.config.as_ref())?;
    Ok(Dispatcher::new(config.options))
}

fn run_render(cli: &Cli, path: &Path, out: Option<&PathBuf>) -> Result<()> {
    let dispatcher = dispatcher(cli)?;
    let files = walk::collect_html_files(path)?;
    match out {
        Some(out) => {
            let root = if path.is_dir() {
                path
            } else {
                path.parent().unwrap_or_else(|| Path::new(""))
            };
            let written = exec::render_files(&files, root, out, &dispatcher)?;
            println!("rendered: {}", written.len());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            for file in &files {
                let html = exec::render_file(file, &dispatcher)?;
                writeln!(stdout, "{html}").context("failed to write output")?;
            }
        }
    }
    Ok(())
}

fn run_highlight(cli: &Cli, file: &Path, language: Option<&str>, line_numbers: bool) -> Result<()> {
    let config = config_loader::load_config(&root_dir()?, cli.config.as_ref())?;
    let html = exec::highlight_file(file, language, line_numbers, &config.options)?;
    println!("{html}");
    Ok(())
}

fn run_check(cli: &Cli, path: &Path) -> Result<()> {
    let dispatcher = dispatcher(cli)?;
    let files = walk::collect_html_files(path)?;
    let report = exec::check_files(&files, &dispatcher)?;
    for problem in &report.problems {
        let label = match problem.level {
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Error => "error",
        };
        match &problem.block_id {
            Some(id) => eprintln!("{label}: {}: block {id}: {}", problem.path.display(), problem.message),
            None => eprintln!("{label}: {}: {}", problem.path.display(), problem.message),
        }
    }
    println!("files: {}", report.files);
    println!("blocks: {}", report.blocks);
    println!("problems: {}", report.problems.len());
    if !report.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_build(
    cli: &Cli,
    site: &Path,
    out: &Path,
    no_cache: bool,
    cache_path_override: Option<&PathBuf>,
) -> Result<()> {
    let root = root_dir()?;
    let config = config_loader::load_config(&root, cli.config.as_ref())?;
    let bundle = exec::load_bundle(site)?;
    let out_dir = if out.is_absolute() {
        out.to_path_buf()
    } else {
        root.join(out)
    };

    let (mut cache, cache_state) = open_cache(&root, no_cache, cache_path_override);
    let summary = exec::build_site(
        bundle,
        &config,
        &out_dir,
        cache.as_mut().map(|cache| cache as &mut dyn RenderCache),
    )?;
    if let Some(cache) = cache.as_mut() {
        match cache.retain(&summary.page_keys) {
            Ok(0) => {}
            Ok(removed) => log::info!("dropped {removed} stale cache entries"),
            Err(err) => log::warn!("cache cleanup failed: {err}"),
        }
    }
    println!("cache: {cache_state}");
    println!("rendered: {}", summary.rendered);
    println!("skipped: {}", summary.skipped);
    Ok(())
}

fn open_cache(
    root: &Path,
    no_cache: bool,
    cache_path_override: Option<&PathBuf>,
) -> (Option<SqliteRenderCache>, &'static str) {
    if no_cache {
        return (None, "off");
    }
    let cache_path = cache_path_override
        .map(|path| if path.is_absolute() { path.clone() } else { root.join(path) })
        .unwrap_or_else(|| root.join(".tessera").join("cache.sqlite"));
    match SqliteRenderCache::open(&cache_path) {
        Ok(cache) => (Some(cache), "on"),
        Err(err) => {
            log::warn!("failed to open cache at {}: {err}", cache_path.display());
            (None, "off")
        }
    }
}
