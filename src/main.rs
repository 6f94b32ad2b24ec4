// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion_cms::config::Command;
use notion_cms::{
    blocks_from_document, upload_media, CommandLineInput, LocalObjectStore, NotionHttpClient,
    NotionRepository, PageId, PageNode, PageTreeCache, ResolvedConfig, SiteConfig, SystemClock,
    Workspace,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("notion_cms.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stderr_appender = ConsoleAppender::builder()
        .target(log4rs::append::console::Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}",
        )))
        .build(&log_file_path)
        .with_context(|| format!("Cannot open log file {}", log_file_path.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

fn page_arg(input: &str) -> Result<PageId> {
    PageId::parse(input).with_context(|| format!("'{}' is not a Notion page URL or id", input))
}

/// Builds the workspace the remote commands run against.
fn open_workspace(config: &ResolvedConfig) -> Result<Workspace> {
    let client = NotionHttpClient::new(config.api_key()?)?;
    let repo: Arc<dyn NotionRepository> = Arc::new(client);
    let cache = Arc::new(PageTreeCache::new(
        repo.clone(),
        Arc::new(SystemClock),
        config.roots.clone(),
        config.cache_ttl,
    ));
    Ok(Workspace::new(repo, cache, config.conversion.clone()))
}

fn print_tree(nodes: &[PageNode], depth: usize) {
    for node in nodes {
        let marker = if node.has_children { "▸" } else { "•" };
        println!("{}{} {}  ({})", "  ".repeat(depth), marker, node.name, node.id);
        print_tree(&node.children, depth + 1);
    }
}

fn guess_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("mp4") => "video/mp4",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Commands that need no Notion connection.
async fn run_offline(config: &ResolvedConfig) -> Result<()> {
    match &config.command {
        Command::Convert { html_file } => {
            let html = tokio::fs::read_to_string(html_file)
                .await
                .with_context(|| format!("Cannot read {}", html_file.display()))?;
            let blocks = blocks_from_document(&html, &config.conversion);
            println!("{}", serde_json::to_string_pretty(&blocks)?);
        }
        Command::Upload { file, content_type } => {
            let store = LocalObjectStore::new(
                &config.storage_root,
                config.public_base_url.clone(),
                config.bucket.clone(),
            );
            let filename = file
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default();
            let content_type = content_type
                .as_deref()
                .unwrap_or_else(|| guess_content_type(file));
            let mut body = tokio::fs::File::open(file)
                .await
                .with_context(|| format!("Cannot open {}", file.display()))?;

            let url = upload_media(&store, &SystemClock, filename, &mut body, content_type).await?;
            println!("{}", url);
        }
        other => anyhow::bail!("{:?} needs a Notion connection", other),
    }
    Ok(())
}

async fn run(config: &ResolvedConfig) -> Result<()> {
    if !config.command.needs_notion() {
        return run_offline(config).await;
    }
    let workspace = open_workspace(config)?;

    match &config.command {
        Command::Tree => print_tree(&workspace.cache().get_tree().await, 0),
        Command::Children { page } => {
            print_tree(&workspace.sub_pages(&page_arg(page)?).await, 0);
        }
        Command::Breadcrumbs { page } => {
            let trail = workspace.cache().breadcrumbs(&page_arg(page)?).await;
            if trail.is_empty() {
                eprintln!("Page is not reachable from the configured roots");
            }
            let names: Vec<&str> = trail.iter().map(|crumb| crumb.name.as_str()).collect();
            println!("{}", names.join(" / "));
        }
        Command::Show { page, output_file } => {
            let html = workspace.page_html(&page_arg(page)?).await?;
            match output_file {
                Some(path) => {
                    tokio::fs::write(path, html)
                        .await
                        .with_context(|| format!("Cannot write {}", path.display()))?;
                    println!("✓ Page saved to {}", path.display());
                }
                None => println!("{}", html),
            }
        }
        Command::Save { page, html_file } => {
            let html = tokio::fs::read_to_string(html_file)
                .await
                .with_context(|| format!("Cannot read {}", html_file.display()))?;
            let written = workspace.save_page_html(&page_arg(page)?, &html).await?;
            println!("✓ Wrote {} blocks", written);
        }
        Command::Create { parent, title } => {
            let id = workspace.create_sub_page(&page_arg(parent)?, title).await?;
            println!("✓ Created page {}", id);
        }
        Command::Rename { page, title } => {
            workspace.rename_page(&page_arg(page)?, title).await?;
            println!("✓ Renamed page to '{}'", title);
        }
        Command::Delete { page } => {
            workspace.delete_page(&page_arg(page)?).await?;
            println!("✓ Archived page");
        }
        Command::Duplicate { page } => {
            let id = workspace.duplicate_page(&page_arg(page)?).await?;
            println!("✓ Created copy {}", id);
        }
        offline => anyhow::bail!("{:?} runs without a Notion connection", offline),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    let config = SiteConfig::load(&cli.config)
        .with_context(|| format!("Cannot load configuration from {}", cli.config.display()))?
        .resolve(&cli)
        .context("Invalid configuration")?;

    run(&config).await
}
