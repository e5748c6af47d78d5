//! bindery - Manuscript export tool

use std::fs;
use std::process::ExitCode;

use clap::Parser;

use bindery::epub::{EpubConfig, EpubExporter, cover_data_url};
use bindery::manuscript::Manuscript;

#[derive(Parser)]
#[command(name = "bindery")]
#[command(version, about = "Manuscript to ebook exporter", long_about = None)]
#[command(after_help = "EXAMPLES:
    bindery draft.json book.epub              Export a manuscript as EPUB
    bindery draft.json book.epub -c art.jpg   Export with a cover image
    bindery -i draft.json                     Show manuscript metadata")]
struct Cli {
    /// Manuscript JSON file
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (.epub)
    #[arg(value_name = "OUTPUT", required_unless_present = "info")]
    output: Option<String>,

    /// Cover image file (JPEG or PNG)
    #[arg(short, long, value_name = "FILE")]
    cover: Option<String>,

    /// Seed for generated identifiers, for reproducible output
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Show manuscript metadata without exporting
    #[arg(short, long)]
    info: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = if cli.info {
        show_info(&cli.input)
    } else {
        // clap enforces OUTPUT unless --info is given.
        match cli.output {
            Some(ref output) => export(&cli, output),
            None => Err("output file required".to_string()),
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn show_info(path: &str) -> Result<(), String> {
    let manuscript = load_manuscript(path)?;

    println!("File: {path}");
    println!("Title: {}", manuscript.display_title());
    println!("Author: {}", manuscript.display_author());
    if let Some(ref genre) = manuscript.genre {
        println!("Genre: {genre}");
    }
    if !manuscript.themes.is_empty() {
        println!("Themes: {}", manuscript.themes.join(", "));
    }
    println!("Chapters: {}", manuscript.chapters.len());
    let words: usize = manuscript
        .chapters
        .iter()
        .map(|c| c.content.split_whitespace().count())
        .sum();
    println!("Words: {words}");

    Ok(())
}

fn export(cli: &Cli, output: &str) -> Result<(), String> {
    if !output.ends_with(".epub") {
        return Err(format!(
            "unsupported output format: {output} (expected .epub; \
             PDF export needs a section renderer, see the library API)"
        ));
    }

    let manuscript = load_manuscript(&cli.input)?;

    let cover = match cli.cover {
        Some(ref path) => {
            let data = fs::read(path).map_err(|e| format!("{path}: {e}"))?;
            Some(cover_data_url(path, &data))
        }
        None => None,
    };

    let config = EpubConfig {
        seed: cli.seed,
        ..Default::default()
    };
    EpubExporter::new()
        .with_config(config)
        .export_to_file(&manuscript, cover.as_deref(), output)
        .map_err(|e| e.to_string())?;

    if !cli.quiet {
        println!("Wrote {output}");
    }
    Ok(())
}

fn load_manuscript(path: &str) -> Result<Manuscript, String> {
    let json = fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
    Manuscript::from_json(&json).map_err(|e| e.to_string())
}
