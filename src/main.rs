mod catalog;
mod index;
mod output;
mod utils;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roaring::RoaringBitmap;

use catalog::read_catalog;
use index::{IndexBuilder, IndexReader, IndexWriter};
use output::Hit;

#[derive(Parser)]
#[command(name = "apidex")]
#[command(about = "Token-suffix search index for API catalogs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index from a JSONL catalog
    Build {
        /// Catalog file: one {"name": ..., "id": ...} object per line
        #[arg(short, long)]
        input: PathBuf,

        /// Output index file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Search an index
    Search {
        /// Substring to look for
        query: String,

        /// Index file
        #[arg(short, long)]
        index: PathBuf,

        /// Resolve ids back to display names using this catalog
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Maximum number of distinct results
        #[arg(short, long, default_value_t = 200)]
        limit: usize,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// Show index statistics
    Stats {
        /// Index file
        #[arg(short, long)]
        index: PathBuf,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Export the tree as a Graphviz digraph
    Export {
        /// Index file
        #[arg(short, long)]
        index: PathBuf,

        /// Output .dot file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => build(&input, &output),
        Commands::Search {
            query,
            index,
            catalog,
            limit,
            no_color,
        } => search(&query, &index, catalog.as_deref(), limit, !no_color),
        Commands::Stats { index, json } => stats(&index, json),
        Commands::Export { index, output } => export(&index, output.as_deref()),
    }
}

fn build(input: &std::path::Path, output: &std::path::Path) -> Result<()> {
    let entries = read_catalog(input)?;

    #[cfg(feature = "progress")]
    let spinner = {
        let spinner = indicatif::ProgressBar::new(entries.len() as u64);
        spinner.set_style(
            indicatif::ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓▒░  "),
        );
        spinner.set_message("Indexing APIs...");
        spinner
    };

    // One sequential pass; the builder is single-threaded by design.
    let mut builder = IndexBuilder::new();
    for entry in &entries {
        builder.add(&entry.name, entry.id);
        #[cfg(feature = "progress")]
        spinner.inc(1);
    }

    #[cfg(feature = "progress")]
    spinner.finish_with_message(format!("Indexed {} APIs", builder.key_count()));

    IndexWriter::write_to_file(&builder, output)
        .with_context(|| format!("Failed to write index {}", output.display()))?;

    println!(
        "Index stored at: {} ({} keys, {} nodes)",
        output.display(),
        builder.key_count(),
        builder.node_count()
    );

    Ok(())
}

fn search(
    query: &str,
    index_path: &std::path::Path,
    catalog: Option<&std::path::Path>,
    limit: usize,
    color: bool,
) -> Result<()> {
    let reader = IndexReader::open(index_path)
        .with_context(|| format!("Failed to load index {}", index_path.display()))?;

    let names: Option<std::collections::HashMap<u32, String>> = match catalog {
        Some(path) => Some(
            read_catalog(path)?
                .into_iter()
                .map(|e| (e.id, e.name))
                .collect(),
        ),
        None => None,
    };

    // The index returns one entry per matching token boundary; keep the
    // first occurrence of each distinct id, capped at the limit.
    let mut seen = RoaringBitmap::new();
    let mut hits = Vec::new();
    for m in reader.lookup(query) {
        if !seen.insert(m.id) {
            continue;
        }
        let name = names.as_ref().and_then(|n| n.get(&m.id).cloned());
        hits.push(Hit::new(m, name));
        if hits.len() >= limit {
            break;
        }
    }

    if hits.is_empty() {
        println!("No matches for '{}'", query);
        return Ok(());
    }

    output::print_hits(&hits, query, color)?;
    Ok(())
}

fn stats(index_path: &std::path::Path, json: bool) -> Result<()> {
    let reader = IndexReader::open(index_path)
        .with_context(|| format!("Failed to load index {}", index_path.display()))?;
    let stats = reader.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let header = reader.header();
    println!("Index Statistics");
    println!("================");
    println!();
    println!("File:             {}", index_path.display());
    println!("Size:             {}", format_size(reader.size_bytes() as u64));
    println!("Format version:   {}", index::VERSION);
    println!("String region:    {} bytes", header.strings_len);
    println!("Node region:      {} bytes", header.nodes_len);
    println!();
    print!("{}", stats);

    Ok(())
}

fn export(index_path: &std::path::Path, output: Option<&std::path::Path>) -> Result<()> {
    let reader = IndexReader::open(index_path)
        .with_context(|| format!("Failed to load index {}", index_path.display()))?;

    match output {
        Some(path) => {
            let mut file = BufWriter::new(File::create(path)?);
            reader.write_dot(&mut file)?;
            file.flush()?;
            println!("Graph written to: {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            reader.write_dot(&mut lock)?;
        }
    }

    Ok(())
}

/// Format byte size to human readable
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
