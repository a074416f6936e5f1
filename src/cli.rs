use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use shimgen_ffi::{BindingConfig, load_binding_config, validate_identifier};
use shimgen_utils::logger;
use shimgen_utils::{PhaseTiming, Profiler, emit_diagnostic};
use tracing::debug;

use crate::VERSION;
use crate::generator::{GenerateError, GeneratedArtifacts, Generator};
use crate::scanner::ScanError;
use crate::sink::FsSink;
use crate::source::{FsHeaderSource, HeaderFile, HeaderSource};

const DEFAULT_CONFIG_FILE: &str = "bindings.yaml";

#[derive(Parser, Debug)]
#[command(
    name = "shimgen",
    version = VERSION,
    about = "JavaScript FFI binding generator for annotated C++ headers"
)]
pub struct ShimgenCli {
    #[arg(long, global = true)]
    /// Print every scanned declaration with its ffi signature.
    dump_decls: bool,

    #[arg(long, global = true)]
    /// Display phase timing information.
    time: bool,

    #[arg(short, long, global = true)]
    /// Log each scanned declaration and written artifact.
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

impl ShimgenCli {
    pub const fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scans the headers and writes the script wrapper and the native shim.
    Generate(BindingArgs),
    /// Scans the headers and prints the exports as JSON without writing anything.
    List(BindingArgs),
}

/// Where the binding configuration comes from, plus per-field overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct BindingArgs {
    #[arg(short, long)]
    /// Binding config file; `./bindings.yaml` is used when present.
    pub config: Option<PathBuf>,

    #[arg(long)]
    /// Root directory searched for `*.h` files.
    pub headers: Option<PathBuf>,

    #[arg(long)]
    /// Directory below the header root to skip. Repeatable.
    pub exclude: Vec<PathBuf>,

    #[arg(long)]
    /// Script output: a `.js` file or the directory receiving `<api>.js`.
    pub script_out: Option<PathBuf>,

    #[arg(long)]
    /// Directory receiving `<api>_export.cpp`.
    pub native_out: Option<PathBuf>,

    #[arg(long)]
    /// API identifier used for file names and the registration function.
    pub api: Option<String>,

    #[arg(long)]
    /// Object literal wrapping the script entries; empty disables it.
    pub namespace: Option<String>,

    #[arg(long)]
    /// Treat duplicate export names as an error.
    pub strict: bool,
}

impl BindingArgs {
    pub fn resolve(&self) -> Result<BindingConfig> {
        let mut config = match self.config_file() {
            Some(path) => load_binding_config(&path)?,
            None => {
                let Some(api) = &self.api else {
                    bail!("no binding config found; pass --config or --api");
                };
                validate_identifier(api).context("invalid --api")?;
                BindingConfig::new(api.clone())
            }
        };

        if let Some(api) = &self.api {
            validate_identifier(api).context("invalid --api")?;
            config.api_name.clone_from(api);
        }
        if let Some(namespace) = &self.namespace {
            config.namespace.clone_from(namespace);
        }
        if let Some(root) = &self.headers {
            config.header_root.clone_from(root);
        }
        config.excludes.extend(self.exclude.iter().cloned());
        if let Some(script) = &self.script_out {
            config.script_output.clone_from(script);
        }
        if let Some(native) = &self.native_out {
            config.native_output_dir.clone_from(native);
        }
        config.strict |= self.strict;

        Ok(config)
    }

    fn config_file(&self) -> Option<PathBuf> {
        self.config.clone().or_else(|| {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            fallback.is_file().then_some(fallback)
        })
    }
}

pub fn run() -> Result<()> {
    let cli = ShimgenCli::parse();
    logger::init_logging(if cli.verbose { "debug" } else { "warn" });
    match cli.command() {
        Command::Generate(args) => handle_generate(&cli, args),
        Command::List(args) => handle_list(&cli, args),
    }
}

fn handle_generate(cli: &ShimgenCli, args: &BindingArgs) -> Result<()> {
    let config = args.resolve()?;
    let generator = Generator::new(&config);
    let mut profiler = Profiler::new();

    generator.check_preconditions()?;
    let headers = discover(&config, &mut profiler)?;
    let artifacts = generate(&generator, &headers, &mut profiler)?;

    if cli.dump_decls {
        dump_declarations(&generator, &artifacts);
    }

    profiler.record_phase("Write", || generator.write(&artifacts, &mut FsSink))?;

    for collision in &artifacts.collisions {
        println!(
            "{} `{}` exported by {}:{} and {}:{}",
            "duplicate".yellow().bold(),
            collision.name,
            collision.first.header.display(),
            collision.first.line,
            collision.second.header.display(),
            collision.second.line
        );
    }
    println!(
        "{} {} ({} exports)",
        "generated".green().bold(),
        artifacts.script_path.display(),
        artifacts.declarations.len()
    );
    println!("{} {}", "generated".green().bold(), artifacts.native_path.display());

    if cli.time {
        print_timings(&profiler);
    }

    Ok(())
}

fn handle_list(cli: &ShimgenCli, args: &BindingArgs) -> Result<()> {
    let config = args.resolve()?;
    let generator = Generator::new(&config);
    let mut profiler = Profiler::new();

    let headers = discover(&config, &mut profiler)?;
    let artifacts = generate(&generator, &headers, &mut profiler)?;

    if cli.dump_decls {
        dump_declarations(&generator, &artifacts);
    }

    let summaries: Vec<_> = artifacts
        .declarations
        .iter()
        .map(|decl| generator.summarize(decl))
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&summaries).context("failed to serialize exports")?
    );

    if cli.time {
        print_timings(&profiler);
    }

    Ok(())
}

fn discover(config: &BindingConfig, profiler: &mut Profiler) -> Result<Vec<HeaderFile>> {
    let source = FsHeaderSource::new(&config.header_root, config.excludes.clone());
    let headers = profiler.record_phase("Discover", || source.headers())?;
    debug!(count = headers.len(), root = %config.header_root.display(), "discovered headers");
    Ok(headers)
}

fn generate(
    generator: &Generator<'_>,
    headers: &[HeaderFile],
    profiler: &mut Profiler,
) -> Result<GeneratedArtifacts> {
    match profiler.record_phase("Generate", || generator.generate(headers)) {
        Ok(artifacts) => Ok(artifacts),
        Err(GenerateError::Scan(err)) => {
            emit_scan_error(&err, headers);
            bail!("scanning failed");
        }
        Err(other) => Err(other.into()),
    }
}

fn emit_scan_error(err: &ScanError, headers: &[HeaderFile]) {
    let source = headers
        .iter()
        .find(|header| header.path == err.header())
        .map_or("", |header| header.contents.as_str());
    let source_id = display_path(err.header());
    emit_diagnostic(&err.to_diagnostic(&source_id), source);
}

fn dump_declarations(generator: &Generator<'_>, artifacts: &GeneratedArtifacts) {
    println!("{}", "== Declarations ==".bold());
    for decl in &artifacts.declarations {
        let summary = generator.summarize(decl);
        println!(
            "{}:{} {}",
            display_path(&summary.header),
            summary.line,
            summary.ffi_signature
        );
    }
}

fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| pathdiff::diff_paths(path, cwd))
        .filter(|relative| !relative.starts_with(".."))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

fn print_timings(profiler: &Profiler) {
    println!("{}", "[Timing]".bold());
    for PhaseTiming { name, duration } in profiler.phases() {
        println!("{:>16}: {:>6.2} ms", name, duration.as_secs_f64() * 1000.0);
    }
    println!(
        "{:>16}: {:>6.2} ms",
        "Total",
        profiler.total().as_secs_f64() * 1000.0
    );
}
