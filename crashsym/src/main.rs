//! # crashsym - Main Entry Point
//!
//! Symbolicates a captured crash report: managed frames against per-root
//! symbol indexes (scanned fresh or loaded from gzip caches), native frames
//! against the offline offset map with the external symbolizer subprocess as
//! the fallback. The annotated report is emitted as JSON.
//!
//! Side modes: `--build-only` scans the roots and persists their caches
//! without symbolicating; `--write-native-index` emits the offline native
//! index for a binary.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use crashsym::cli::Args;
use crashsym::index::{cache, SymbolIndex, SymbolIndexBuilder};
use crashsym::native::{map_builder, NativeOffsetMap, NativeResolver, SymbolizerSession};
use crashsym::report::output::OutputDocument;
use crashsym::report::{ResolveStats, SymbolicationRequest};
use crashsym::scan::{scan_root, ScanStats, SymFileReader};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.to_string().contains("Usage:") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let quiet = args.quiet;

    // Side mode: emit the offline native index for --target.
    if let Some(out) = &args.write_native_index {
        let Some(target) = args.target.as_ref() else {
            bail!(
                "--write-native-index needs --target\n\n\
                 Usage:\n  crashsym --write-native-index mono.nsym --target ./mono-sgen"
            );
        };
        map_builder::write_native_index(target, out)?;
        if !quiet {
            println!("wrote native index: {}", out.display());
        }
        if args.crash.is_none() && !args.build_only {
            return Ok(());
        }
    }

    // ── Symbol indexes: explicit caches first, then scan roots ──────────
    let reader = SymFileReader;
    let mut indexes: Vec<SymbolIndex> = Vec::new();
    let mut scan_totals = ScanStats::default();

    for path in &args.index {
        let index = cache::load(path)
            .with_context(|| format!("failed to load index cache {}", path.display()))?;
        info!("loaded {} methods from {}", index.len(), path.display());
        indexes.push(index);
    }

    for root in &args.root {
        let cache_path = args.cache_dir.as_ref().map(|dir| cache_file_for(dir, root));

        if let Some(cache_path) = &cache_path {
            if cache_path.exists() {
                // A present cache is trusted as-is; the root is not rescanned.
                let index = cache::load(cache_path).with_context(|| {
                    format!("failed to load index cache {}", cache_path.display())
                })?;
                info!("loaded {} methods from cache {}", index.len(), cache_path.display());
                indexes.push(index);
                continue;
            }
        }

        let mut builder = SymbolIndexBuilder::new();
        let stats = scan_root(&reader, root, &mut builder)?;
        scan_totals.absorb(stats);
        let index = builder.finish();
        info!(
            "scanned {}: {} modules, {} methods ({} skipped)",
            root.display(),
            stats.modules_indexed,
            stats.methods_indexed,
            stats.modules_skipped
        );

        if let Some(cache_path) = &cache_path {
            cache::save(&index, cache_path).with_context(|| {
                format!("failed to write index cache {}", cache_path.display())
            })?;
            if !quiet {
                println!("cached: {}", cache_path.display());
            }
        }
        indexes.push(index);
    }

    if args.build_only {
        if args.root.is_empty() {
            bail!(
                "--build-only needs at least one --root\n\n\
                 Usage:\n  crashsym --build-only --root ./syms --cache-dir ./caches"
            );
        }
        return Ok(());
    }

    // ── Crash report ────────────────────────────────────────────────────
    let Some(crash_path) = &args.crash else {
        bail!(
            "Missing required argument: CRASH_FILE\n\n\
             Usage:\n  crashsym crash.json --root ./syms\n\n\
             Run 'crashsym --help' for more options"
        );
    };
    let text = fs::read_to_string(crash_path)
        .with_context(|| format!("crash report not found: {}", crash_path.display()))?;

    if !quiet {
        println!("crashsym v{}", env!("CARGO_PKG_VERSION"));
        println!("crash: {}", crash_path.display());
        println!("indexes: {}", indexes.len());
    }

    // ── Native resolution setup ─────────────────────────────────────────
    let map = match &args.native_index {
        Some(path) => Some(
            NativeOffsetMap::load(path)
                .with_context(|| format!("failed to load native index {}", path.display()))?,
        ),
        None => None,
    };
    let session = args.target.as_ref().map(|target| {
        SymbolizerSession::new(
            args.symbolizer.clone(),
            target.clone(),
            Duration::from_millis(args.symbolizer_timeout_ms),
        )
    });
    let mut native = NativeResolver::new(map, session);

    // ── Parse, resolve, emit ────────────────────────────────────────────
    let mut request = SymbolicationRequest::parse(&text)
        .with_context(|| format!("failed to parse crash report {}", crash_path.display()))?;
    let stats = request.resolve(&indexes, &mut native);
    native.shutdown();

    let output = request.to_output();
    write_output(&output, args.output.as_deref())?;

    if !quiet {
        print_summary(stats, scan_totals);
    }

    Ok(())
}

/// Per-root cache file name inside the cache directory.
fn cache_file_for(dir: &Path, root: &Path) -> PathBuf {
    let stem = root
        .file_name()
        .map_or_else(|| "root".to_string(), |name| name.to_string_lossy().into_owned());
    dir.join(format!("{stem}.symcache.gz"))
}

fn write_output(doc: &OutputDocument, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, doc).context("failed to write report")?;
            writer.flush()?;
        }
        None => {
            let text = serde_json::to_string_pretty(doc).context("failed to render report")?;
            println!("{text}");
        }
    }
    Ok(())
}

fn print_summary(stats: ResolveStats, scan: ScanStats) {
    eprintln!(
        "\ndone: managed {} resolved / {} unresolved, native {} resolved / {} unresolved \
         (modules: {} indexed, {} skipped)",
        stats.managed_resolved,
        stats.managed_unresolved,
        stats.native_resolved,
        stats.native_unresolved,
        scan.modules_indexed,
        scan.modules_skipped,
    );
}
