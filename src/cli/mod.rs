use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use indicatif::ProgressBar;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::config::resolve::{load_backend_config, resolve_project_with_override};
use crate::core::{PkgInfo, PkgName, PkgSpec};
use crate::ecosystem::backend_for;
use crate::ecosystem::traits::{LanguageBackend, Quirks};
use crate::error::{Result, UpmError};
use crate::util::output;

#[derive(Parser, Debug)]
#[command(name = "upm-yarn")]
#[command(about = "Node.js dependency manager backed by Yarn", long_about = None)]
pub struct Cli {
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[arg(short, long)]
    pub quiet: bool,
    #[arg(long)]
    pub no_color: bool,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Search(SearchArgs),
    Info(InfoArgs),
    Add(AddArgs),
    Remove(RemoveArgs),
    Lock,
    Install,
    List(ListArgs),
    Guess(GuessArgs),
    ShowSpecfile,
    ShowLockfile,
    Quirks,
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    pub query: Vec<String>,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    pub name: String,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// `name` or `name@spec`
    #[arg(required = true)]
    pub packages: Vec<String>,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    #[arg(required = true)]
    pub packages: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// List pinned versions from the lockfile instead of the specfile.
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct GuessArgs {
    /// Keep packages that the specfile already declares.
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    pub shell: Shell,
}

pub fn run() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    output::set_quiet(cli.quiet);
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
    if let Err(err) = dispatch(cli) {
        output::error(&err.to_string());
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn dispatch(cli: Cli) -> Result<()> {
    if let Commands::Completions(args) = &cli.command {
        clap_complete::generate(
            args.shell,
            &mut Cli::command(),
            "upm-yarn",
            &mut io::stdout(),
        );
        return Ok(());
    }

    let (root, backend) = load_backend(cli.dir)?;
    let backend = backend.as_ref();
    let format = cli.format;
    let quiet = cli.quiet;
    match cli.command {
        Commands::Search(args) => handle_search(backend, args, format, quiet),
        Commands::Info(args) => handle_info(backend, args, format, quiet),
        Commands::Add(args) => handle_add(backend, args),
        Commands::Remove(args) => handle_remove(backend, args),
        Commands::Lock => handle_lock(backend),
        Commands::Install => backend.install(),
        Commands::List(args) => handle_list(backend, args, format),
        Commands::Guess(args) => handle_guess(backend, &root, args, format),
        Commands::ShowSpecfile => {
            println!("{}", backend.specfile());
            Ok(())
        }
        Commands::ShowLockfile => {
            println!("{}", backend.lockfile());
            Ok(())
        }
        Commands::Quirks => {
            for name in backend.quirks().names() {
                println!("{}", name);
            }
            Ok(())
        }
        Commands::Completions(_) => Ok(()),
    }
}

fn load_backend(dir: Option<PathBuf>) -> Result<(PathBuf, Box<dyn LanguageBackend>)> {
    let cwd = env::current_dir()?;
    let resolved = resolve_project_with_override(cwd, dir)?;
    let config = load_backend_config(&resolved.config_path)?;
    let backend = backend_for(&resolved.root, &config);
    Ok((resolved.root, backend))
}

fn handle_search(
    backend: &dyn LanguageBackend,
    args: SearchArgs,
    format: Format,
    quiet: bool,
) -> Result<()> {
    let query = args.query.join(" ");
    let bar = spinner(&format!("searching for {}", query), quiet);
    let results = backend.search(&query);
    bar.finish_and_clear();
    let results = results?;

    match format {
        Format::Json => print_json(&results),
        Format::Text => {
            if results.is_empty() {
                output::info("no search results");
                return Ok(());
            }
            let rows = results
                .iter()
                .map(|pkg| {
                    vec![
                        pkg.name.clone(),
                        pkg.version.clone(),
                        pkg.description.clone(),
                    ]
                })
                .collect::<Vec<_>>();
            print_table(&["name", "version", "description"], &rows);
            Ok(())
        }
    }
}

fn handle_info(
    backend: &dyn LanguageBackend,
    args: InfoArgs,
    format: Format,
    quiet: bool,
) -> Result<()> {
    let bar = spinner(&format!("looking up {}", args.name), quiet);
    let info = backend.info(&PkgName::new(args.name.clone()));
    bar.finish_and_clear();
    let info = info?.ok_or_else(|| {
        UpmError::Other(anyhow::anyhow!(format!("no such package: {}", args.name)))
    })?;

    match format {
        Format::Json => print_json(&info),
        Format::Text => {
            print_info(&info);
            Ok(())
        }
    }
}

fn handle_add(backend: &dyn LanguageBackend, args: AddArgs) -> Result<()> {
    let pkgs = args
        .packages
        .iter()
        .map(|arg| parse_package_arg(arg))
        .collect::<BTreeMap<_, _>>();
    backend.add(&pkgs)?;
    if !backend.quirks().contains(Quirks::ADD_REMOVE_ALSO_INSTALLS) {
        backend.install()?;
    }
    Ok(())
}

fn handle_remove(backend: &dyn LanguageBackend, args: RemoveArgs) -> Result<()> {
    let declared = backend.list_specfile()?;
    let mut pkgs = BTreeSet::new();
    for arg in &args.packages {
        let name = PkgName::new(arg.as_str());
        if declared.contains_key(&name) {
            pkgs.insert(name);
        } else {
            output::warn(&format!("{} is not in {}, skipping", arg, backend.specfile()));
        }
    }
    if pkgs.is_empty() {
        return Ok(());
    }
    backend.remove(&pkgs)?;
    if !backend.quirks().contains(Quirks::ADD_REMOVE_ALSO_INSTALLS) {
        backend.install()?;
    }
    Ok(())
}

fn handle_lock(backend: &dyn LanguageBackend) -> Result<()> {
    backend.lock()?;
    if !backend.quirks().contains(Quirks::LOCK_ALSO_INSTALLS) {
        backend.install()?;
    }
    Ok(())
}

fn handle_list(backend: &dyn LanguageBackend, args: ListArgs, format: Format) -> Result<()> {
    let rows: BTreeMap<String, String> = if args.all {
        backend
            .list_lockfile()?
            .into_iter()
            .map(|(name, version)| (name.to_string(), version.to_string()))
            .collect()
    } else {
        backend
            .list_specfile()?
            .into_iter()
            .map(|(name, spec)| (name.to_string(), spec.to_string()))
            .collect()
    };

    match format {
        Format::Json => print_json(&rows),
        Format::Text => {
            let header = if args.all { "version" } else { "spec" };
            let rows = rows
                .into_iter()
                .map(|(name, value)| vec![name, value])
                .collect::<Vec<_>>();
            print_table(&["name", header], &rows);
            Ok(())
        }
    }
}

fn handle_guess(
    backend: &dyn LanguageBackend,
    root: &Path,
    args: GuessArgs,
    format: Format,
) -> Result<()> {
    let mut guessed = backend.guess()?;
    if !args.all && root.join(backend.specfile()).is_file() {
        let declared = backend.list_specfile()?;
        guessed.retain(|name| !declared.contains_key(name));
    }

    match format {
        Format::Json => print_json(&guessed),
        Format::Text => {
            for name in &guessed {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

/// Splits `name@spec`; the leading `@` of a scoped name is not a separator.
pub fn parse_package_arg(arg: &str) -> (PkgName, PkgSpec) {
    let search_from = usize::from(arg.starts_with('@'));
    match arg[search_from..].find('@') {
        Some(idx) => {
            let split = search_from + idx;
            (
                PkgName::new(&arg[..split]),
                PkgSpec::new(&arg[split + 1..]),
            )
        }
        None => (PkgName::new(arg), PkgSpec::new("")),
    }
}

fn spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| UpmError::Other(anyhow::Error::new(err)))?;
    println!("{}", text);
    Ok(())
}

fn print_info(info: &PkgInfo) {
    let fields = [
        ("name", info.name.as_str()),
        ("description", info.description.as_str()),
        ("version", info.version.as_str()),
        ("homepage", info.homepage_url.as_str()),
        ("documentation", info.documentation_url.as_str()),
        ("source code", info.source_code_url.as_str()),
        ("bug tracker", info.bug_tracker_url.as_str()),
        ("author", info.author.as_str()),
        ("license", info.license.as_str()),
    ];
    for (label, value) in fields {
        if !value.is_empty() {
            println!("{:<14}{}", format!("{}:", label), value);
        }
    }
    if !info.dependencies.is_empty() {
        println!("{:<14}{}", "dependencies:", info.dependencies.join(", "));
    }
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths = headers.iter().map(|h| h.len()).collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }
    let render = |cells: Vec<&str>| {
        cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| format!("{:<width$}", cell, width = widths[idx]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    println!("{}", render(headers.to_vec()));
    for row in rows {
        println!("{}", render(row.iter().map(String::as_str).collect()));
    }
}
