// src/config.rs
use crate::constants::{DEFAULT_CACHE_TTL_SECS, DEFAULT_CODE_LANGUAGE};
use crate::error::AppError;
use crate::html::{AnnotationMode, ConversionOptions};
use crate::types::{ApiKey, PageId};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Parsed and validated command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Site configuration file (JSON)
    #[arg(short, long, global = true, default_value = "config.json")]
    pub config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// What to do. Page arguments accept a Notion URL or a bare id.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the page tree of the configured root pages
    Tree,
    /// List the sub-pages of a page
    Children { page: String },
    /// Print the path from a root page down to a page
    Breadcrumbs { page: String },
    /// Render a page's content as editor HTML
    Show {
        page: String,
        /// Write the HTML to this file instead of stdout
        #[arg(short, long)]
        output_file: Option<PathBuf>,
    },
    /// Replace a page's content with the blocks parsed from an HTML file
    Save { page: String, html_file: PathBuf },
    /// Create an empty sub-page
    Create { parent: String, title: String },
    /// Rename a page
    Rename { page: String, title: String },
    /// Archive a page
    Delete { page: String },
    /// Copy a page and its content next to itself
    Duplicate { page: String },
    /// Store a media file and print its public URL
    Upload {
        file: PathBuf,
        /// MIME type of the file (guessed from the extension when omitted)
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Convert an HTML file to block JSON without contacting Notion
    Convert { html_file: PathBuf },
}

impl Command {
    /// Whether the command talks to the Notion API.
    pub fn needs_notion(&self) -> bool {
        !matches!(self, Command::Upload { .. } | Command::Convert { .. })
    }
}

/// A root page of the navigation tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootPage {
    pub page_id: String,
}

/// Where uploaded media is stored and served from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root_dir: PathBuf,
    pub public_base_url: String,
    pub bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("uploads"),
            public_base_url: "http://localhost:8000".to_string(),
            bucket: "media".to_string(),
        }
    }
}

/// The site configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub notion_token: Option<String>,
    pub pages: Vec<RootPage>,
    pub cache_ttl_secs: u64,
    pub default_code_language: String,
    pub nested_annotations: AnnotationMode,
    pub storage: StorageConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            notion_token: None,
            pages: Vec::new(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            default_code_language: DEFAULT_CODE_LANGUAGE.to_string(),
            nested_annotations: AnnotationMode::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Reads the configuration file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("No configuration at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_json(&content, path)
    }

    pub fn from_json(content: &str, path: &Path) -> Result<Self, AppError> {
        serde_json::from_str(content).map_err(|source| AppError::JsonParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates the file against the command line and environment.
    ///
    /// `NOTION_API_KEY` takes precedence over the file's `notion_token`.
    pub fn resolve(mut self, cli: &CommandLineInput) -> Result<ResolvedConfig, AppError> {
        let token = std::env::var("NOTION_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or(self.notion_token.take());
        self.resolve_with_token(token, cli)
    }

    fn resolve_with_token(
        self,
        token: Option<String>,
        cli: &CommandLineInput,
    ) -> Result<ResolvedConfig, AppError> {
        let api_key = token.map(ApiKey::new).transpose()?;
        if api_key.is_none() && cli.command.needs_notion() {
            return Err(AppError::MissingConfiguration(
                "set NOTION_API_KEY or notion_token in the configuration file".to_string(),
            ));
        }

        let roots = self
            .pages
            .iter()
            .map(|root| PageId::parse(&root.page_id))
            .collect::<Result<Vec<_>, _>>()?;

        let public_base_url = Url::parse(&self.storage.public_base_url).map_err(|e| {
            AppError::MissingConfiguration(format!(
                "storage.public_base_url '{}' is not a URL: {}",
                self.storage.public_base_url, e
            ))
        })?;

        let cache_ttl = chrono::Duration::from_std(std::time::Duration::from_secs(
            self.cache_ttl_secs,
        ))
        .map_err(|e| AppError::Validation(format!("cache_ttl_secs out of range: {}", e)))?;

        let default_code_language = if self.default_code_language.trim().is_empty() {
            DEFAULT_CODE_LANGUAGE.to_string()
        } else {
            self.default_code_language
        };

        Ok(ResolvedConfig {
            api_key,
            roots,
            cache_ttl,
            conversion: ConversionOptions {
                annotation_mode: self.nested_annotations,
                default_code_language,
            },
            storage_root: self.storage.root_dir,
            public_base_url,
            bucket: self.storage.bucket,
            verbose: cli.verbose,
            command: cli.command.clone(),
        })
    }
}

/// Configuration validated and ready to drive a command.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_key: Option<ApiKey>,
    pub roots: Vec<PageId>,
    pub cache_ttl: chrono::Duration,
    pub conversion: ConversionOptions,
    pub storage_root: PathBuf,
    pub public_base_url: Url,
    pub bucket: String,
    pub verbose: bool,
    pub command: Command,
}

impl ResolvedConfig {
    pub fn api_key(&self) -> Result<&ApiKey, AppError> {
        self.api_key
            .as_ref()
            .ok_or_else(|| AppError::MissingConfiguration("Notion API key".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const KEY: &str = "secret_0123456789abcdefghijklmnop";

    fn cli(command: Command) -> CommandLineInput {
        CommandLineInput {
            config: PathBuf::from("config.json"),
            verbose: false,
            command,
        }
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config =
            SiteConfig::from_json(r#"{"pages": [{"page_id": "550e8400e29b41d4a716446655440000"}]}"#, Path::new("c.json"))
                .unwrap();
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.default_code_language, "plain text");
        assert_eq!(config.nested_annotations, AnnotationMode::Innermost);
        assert_eq!(config.storage.bucket, "media");
    }

    #[test]
    fn test_resolve_parses_roots_and_mode() {
        let config = SiteConfig::from_json(
            r#"{
                "pages": [{"page_id": "https://www.notion.so/Home-550e8400e29b41d4a716446655440000"}],
                "nested_annotations": "accumulate",
                "cache_ttl_secs": 60
            }"#,
            Path::new("c.json"),
        )
        .unwrap();
        let resolved = config
            .resolve_with_token(Some(KEY.to_string()), &cli(Command::Tree))
            .unwrap();

        assert_eq!(resolved.roots[0].as_str(), "550e8400e29b41d4a716446655440000");
        assert_eq!(resolved.conversion.annotation_mode, AnnotationMode::Accumulate);
        assert_eq!(resolved.cache_ttl, chrono::Duration::seconds(60));
    }

    #[test]
    fn test_token_required_only_for_remote_commands() {
        let offline = SiteConfig::default()
            .resolve_with_token(None, &cli(Command::Convert { html_file: PathBuf::from("a.html") }));
        assert!(offline.is_ok());

        let remote = SiteConfig::default().resolve_with_token(None, &cli(Command::Tree));
        assert!(matches!(remote, Err(AppError::MissingConfiguration(_))));
    }

    #[test]
    fn test_resolve_takes_token_and_storage_defaults() {
        let config = SiteConfig {
            notion_token: Some(KEY.to_string()),
            ..SiteConfig::default()
        };
        let resolved = config.resolve(&cli(Command::Tree)).unwrap();
        assert!(resolved.api_key().is_ok());
        assert_eq!(resolved.bucket, "media");
    }

    #[test]
    fn test_bad_json_names_the_file() {
        let err = SiteConfig::from_json("{", Path::new("site.json")).unwrap_err();
        assert!(err.to_string().contains("site.json"));
    }
}
