//! CLI for layout-analysis debug visualization
//!
//! Takes a source PDF plus the analyzer's structural JSON dump and
//! writes the inspection artifacts next to each other:
//!
//! ```bash
//! # Everything, into ./viz/
//! layviz paper.pdf paper_layout.json --output ./viz
//!
//! # Overlay only (no pdfium needed)
//! layviz paper.pdf paper_layout.json --no-clean --no-lastline
//!
//! # Higher rasterization resolution
//! layviz paper.pdf paper_layout.json --dpi 300
//! ```
//!
//! Outputs under the output directory:
//! - `layout_<stem>.pdf` — annotated overlay
//! - `<stem>_clean.pdf` — clean reconstruction
//! - `lastline/page_NNN_lastline.png` — last-line crops

use clap::Parser;
use std::path::PathBuf;

use layviz::{
    classify_page, extract_last_lines, reconstruct_clean, render_overlay, save_last_line_images,
    ClassifiedPage, CleanOptions, LayoutDump, OverlayOptions,
};

/// Visualize document layout analysis results
#[derive(Parser, Debug)]
#[command(name = "layviz")]
#[command(version, about, long_about = None)]
struct Args {
    /// Source PDF
    pdf: PathBuf,

    /// Layout analyzer JSON dump (bare page array or pdf_info wrapper)
    layout: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Skip the clean reconstruction
    #[arg(long)]
    no_clean: bool,

    /// Skip last-line crop extraction
    #[arg(long)]
    no_lastline: bool,

    /// Hide reading-order numbering on the overlay
    #[arg(long)]
    no_reading_order: bool,

    /// Rasterization resolution for clean/last-line stages
    #[arg(long, default_value = "200")]
    dpi: f32,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "info" } else { "warn" }),
    )
    .init();

    if !args.pdf.exists() {
        eprintln!("Error: PDF not found: {}", args.pdf.display());
        std::process::exit(1);
    }
    if !args.layout.exists() {
        eprintln!("Error: layout dump not found: {}", args.layout.display());
        std::process::exit(1);
    }

    let pdf_bytes = std::fs::read(&args.pdf)?;
    let dump: LayoutDump = serde_json::from_str(&std::fs::read_to_string(&args.layout)?)?;
    let pages = dump.into_pages();
    let classified: Vec<ClassifiedPage> = pages.iter().map(classify_page).collect();

    if args.verbose {
        println!(
            "Loaded {} ({} bytes), {} structural pages",
            args.pdf.display(),
            pdf_bytes.len(),
            pages.len()
        );
    }

    std::fs::create_dir_all(&args.output)?;
    let stem = args
        .pdf
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");

    // Layout overlay
    let options = OverlayOptions {
        show_reading_order: !args.no_reading_order,
        ..OverlayOptions::default()
    };
    let annotated = render_overlay(&pdf_bytes, &classified, &options)?;
    let overlay_path = args.output.join(format!("layout_{stem}.pdf"));
    std::fs::write(&overlay_path, annotated)?;
    println!("Overlay: {}", overlay_path.display());

    // Clean reconstruction (best-effort)
    if !args.no_clean {
        let clean_options = CleanOptions { dpi: args.dpi };
        match reconstruct_clean(&pdf_bytes, &classified, &clean_options) {
            Some(bytes) => {
                let clean_path = args.output.join(format!("{stem}_clean.pdf"));
                std::fs::write(&clean_path, bytes)?;
                println!("Clean: {}", clean_path.display());
            }
            None => log::warn!("clean reconstruction skipped (rasterization unavailable)"),
        }
    }

    // Last-line crops (best-effort)
    if !args.no_lastline {
        match extract_last_lines(&pdf_bytes, &pages, args.dpi) {
            Some(images) => {
                let lastline_dir = args.output.join("lastline");
                save_last_line_images(&images, &lastline_dir)?;
                let count = images.iter().flatten().count();
                println!("Last lines: {} crops in {}", count, lastline_dir.display());
            }
            None => log::warn!("last-line extraction skipped (rasterization unavailable)"),
        }
    }

    Ok(())
}
