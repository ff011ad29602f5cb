mod error;
mod llm;
mod model;
mod output;
mod parser;
mod pdf;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::llm::ChatClient;
use crate::model::Category;
use crate::pdf::PageRange;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "hansard_digest", about = "Summarise a Hansard PDF into structured JSON")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, segment by ToC and summarise every proceeding
    Run {
        /// Hansard PDF to read
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// JSON file to write (overwritten)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Front pages sent to the table-of-contents pass
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        toc_pages: Option<u32>,
        /// Added to ToC page numbers to get PDF page indices
        #[arg(long, allow_hyphen_values = true)]
        page_offset: Option<i64>,
    },
    /// Run only the table-of-contents pass and show the page spans
    Toc {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        toc_pages: Option<u32>,
        #[arg(long, allow_hyphen_values = true)]
        page_offset: Option<i64>,
    },
    /// Print extracted text for a page range
    Text {
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// First page (1-based)
        #[arg(long, default_value = "1")]
        from: u32,
        /// Last page, inclusive (default: last page of the document)
        #[arg(long)]
        to: Option<u32>,
    },
    /// Summarise an output file written by `run`
    Stats {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let mut settings = Settings::load()?;

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            toc_pages,
            page_offset,
        } => {
            apply_overrides(&mut settings, input, output, toc_pages, page_offset);
            let client = ChatClient::from_settings(&settings)?;
            info!(model = client.model(), input = ?settings.input, "Starting Hansard run");

            println!("Hansard Digest");
            println!("==============\n");
            let (_, counts) = parser::run(&client, &settings).await?;
            counts.print();
            println!("Output: {:?}", settings.output);
            Ok(())
        }
        Commands::Toc {
            input,
            toc_pages,
            page_offset,
        } => {
            apply_overrides(&mut settings, input, None, toc_pages, page_offset);
            let client = ChatClient::from_settings(&settings)?;
            let extracted = pdf::extract_text(&settings.input, None)?;
            let front = parser::front_text(&extracted.pages, settings.toc_pages);
            let entries = parser::toc::parse_toc(&client, &front).await?;
            let spans = parser::segments::segment_spans(
                &entries,
                extracted.last_page(),
                settings.page_offset,
            );

            println!("{:>3} | {:<48} | {:>5} | {:<12}", "#", "Title", "Page", "Span");
            println!("{}", "-".repeat(78));
            for (i, (entry, span)) in entries.iter().zip(&spans).enumerate() {
                println!(
                    "{:>3} | {:<48} | {:>5} | {:<12}",
                    i + 1,
                    truncate(&entry.title, 48),
                    entry.page_start,
                    span.to_string()
                );
            }
            println!("\n{} entries over {} pages", entries.len(), extracted.last_page());
            Ok(())
        }
        Commands::Text { input, from, to } => {
            if let Some(p) = input {
                settings.input = p;
            }
            let to = match to {
                Some(t) => t,
                None => pdf::page_count(&settings.input)?,
            };
            let extracted = pdf::extract_text(&settings.input, Some(PageRange::new(from, to)))?;
            for (page, text) in &extracted.pages {
                println!("--- page {} ---", page);
                println!("{}", text);
            }
            Ok(())
        }
        Commands::Stats { output } => {
            let path = output.unwrap_or_else(|| settings.output.clone());
            let doc = output::read_document(&path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            let s = output::summarize(&doc);
            let meta = &doc.document_metadata;

            println!("Chamber:       {}", meta.chamber);
            println!("Date:          {}", meta.date);
            println!("Session:       {}", meta.parliament_session);
            println!("Proceedings:   {}", s.proceedings);
            println!("Interventions: {}", s.interventions);
            println!("Divisions:     {}", s.votes);
            if let (Some(first), Some(last)) = (s.first_id, s.last_id) {
                println!("Sequence ids:  {}..={}", first, last);
            }

            println!("\n{:<26} | {:>5}", "Category", "Count");
            println!("{}", "-".repeat(34));
            for category in Category::ALL {
                if let Some(n) = s.by_category.get(&category) {
                    println!("{:<26} | {:>5}", category.as_str(), n);
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn apply_overrides(
    settings: &mut Settings,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    toc_pages: Option<u32>,
    page_offset: Option<i64>,
) {
    if let Some(p) = input {
        settings.input = p;
    }
    if let Some(p) = output {
        settings.output = p;
    }
    if let Some(n) = toc_pages {
        settings.toc_pages = n;
    }
    if let Some(o) = page_offset {
        settings.page_offset = o;
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
