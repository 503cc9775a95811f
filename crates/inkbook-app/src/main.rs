//! Main application entry point (native).
//!
//! Headless access to notebooks saved by the file store:
//!
//! ```text
//! inkbook list <user>
//! inkbook export <user> <notebook> <page> <png|pdf> [out_dir]
//! ```

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
mod cli {
    use clap::{Parser, Subcommand, ValueEnum};
    use inkbook_app::{CONFIG_ENV, DATA_DIR_ENV, NotebookSession, ScriptedPrompt, SessionConfig, SessionError};
    use inkbook_core::storage::FileStore;
    use inkbook_core::{NotebookError, StorageError};
    use inkbook_render::{RasterImages, RasterSurface, RenderError};
    use std::path::{Path, PathBuf};
    use thiserror::Error;

    /// Inkbook notebooks from the command line
    #[derive(Debug, Parser)]
    #[command(name = "inkbook", author, version, about)]
    pub struct Cli {
        /// Directory holding the saved notebooks
        #[arg(long, env = DATA_DIR_ENV, global = true)]
        pub data_dir: Option<PathBuf>,

        /// JSON session config file
        #[arg(long, env = CONFIG_ENV, global = true)]
        pub config: Option<PathBuf>,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Subcommand)]
    pub enum Command {
        /// List a user's notebooks with their paper and page count
        List { user: String },
        /// Write one page as an image or a document
        Export {
            user: String,
            notebook: String,
            /// Page number, starting at 1
            page: usize,
            #[arg(value_enum)]
            format: ExportFormat,
            /// Directory the file is written to
            #[arg(default_value = ".")]
            out_dir: PathBuf,
        },
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    pub enum ExportFormat {
        Png,
        Pdf,
    }

    #[derive(Debug, Error)]
    pub enum CliError {
        #[error("Invalid config {path}: {message}")]
        Config { path: PathBuf, message: String },
        #[error("Failed to write {path}: {source}")]
        Write {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        #[error(transparent)]
        Session(#[from] SessionError),
        #[error(transparent)]
        Storage(#[from] StorageError),
        #[error(transparent)]
        Render(#[from] RenderError),
    }

    type Session = NotebookSession<FileStore, RasterSurface, RasterImages, ScriptedPrompt>;

    fn load_config(path: Option<&Path>) -> Result<SessionConfig, CliError> {
        let Some(path) = path else {
            return Ok(SessionConfig::default());
        };
        let config_error = |message: String| CliError::Config {
            path: path.to_path_buf(),
            message,
        };
        let json = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        SessionConfig::from_json(&json).map_err(|e| config_error(e.to_string()))
    }

    fn open_store(data_dir: Option<PathBuf>) -> Result<FileStore, CliError> {
        let store = match data_dir {
            Some(dir) => FileStore::new(dir)?,
            None => FileStore::default_location()?,
        };
        log::info!("Using data directory {}", store.base_path().display());
        Ok(store)
    }

    async fn open_session(cli: &Cli, user: &str) -> Result<Session, CliError> {
        let config = load_config(cli.config.as_deref())?;
        let surface = RasterSurface::new(config.canvas_width, config.canvas_height)?;
        let store = open_store(cli.data_dir.clone())?;
        let session =
            NotebookSession::for_user(store, ScriptedPrompt::new(), surface, RasterImages, &config, user).await?;
        Ok(session)
    }

    async fn list(cli: &Cli, user: &str) -> Result<(), CliError> {
        let session = open_session(cli, user).await?;
        for name in session.notebooks().names() {
            if let Some(notebook) = session.notebooks().get(name) {
                println!("{}\t{}\t{} pages", name, notebook.paper_type, notebook.page_count());
            }
        }
        Ok(())
    }

    async fn export(
        cli: &Cli,
        user: &str,
        notebook: &str,
        page: usize,
        format: ExportFormat,
        out_dir: &Path,
    ) -> Result<(), CliError> {
        let mut session = open_session(cli, user).await?;

        if !session.open_notebook(notebook).await? {
            return Err(SessionError::from(NotebookError::NotFound(notebook.to_string())).into());
        }
        if page != 1 && !session.goto_page(page).await? {
            let count = session.page_count();
            return Err(SessionError::from(NotebookError::PageOutOfRange { page, count }).into());
        }

        let artifact = match format {
            ExportFormat::Png => session.export_image()?,
            ExportFormat::Pdf => session.export_document()?,
        };
        let path = out_dir.join(&artifact.file_name);
        std::fs::write(&path, &artifact.bytes).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?;
        log::info!("Wrote {} ({} bytes)", path.display(), artifact.bytes.len());
        println!("{}", path.display());
        Ok(())
    }

    pub async fn run(cli: Cli) -> Result<(), CliError> {
        match &cli.command {
            Command::List { user } => list(&cli, user).await,
            Command::Export {
                user,
                notebook,
                page,
                format,
                out_dir,
            } => export(&cli, user, notebook, *page, *format, out_dir).await,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_export_arguments() {
            let cli = Cli::try_parse_from(["inkbook", "export", "ana", "math", "3", "pdf", "/tmp/out"]).unwrap();
            let Command::Export {
                user,
                notebook,
                page,
                format,
                out_dir,
            } = cli.command
            else {
                panic!("expected export");
            };
            assert_eq!((user.as_str(), notebook.as_str(), page), ("ana", "math", 3));
            assert_eq!(format, ExportFormat::Pdf);
            assert_eq!(out_dir, PathBuf::from("/tmp/out"));
        }

        #[test]
        fn test_export_defaults_to_current_dir() {
            let cli = Cli::try_parse_from(["inkbook", "export", "ana", "math", "1", "png"]).unwrap();
            assert!(matches!(
                cli.command,
                Command::Export { ref out_dir, format: ExportFormat::Png, .. } if out_dir == Path::new(".")
            ));
        }

        #[test]
        fn test_rejects_bad_page_and_format() {
            assert!(Cli::try_parse_from(["inkbook", "export", "ana", "math", "two", "png"]).is_err());
            assert!(Cli::try_parse_from(["inkbook", "export", "ana", "math", "2", "gif"]).is_err());
            assert!(Cli::try_parse_from(["inkbook", "list"]).is_err());
        }

        #[test]
        fn test_data_dir_flag() {
            let cli = Cli::try_parse_from(["inkbook", "--data-dir", "/srv/ink", "list", "ana"]).unwrap();
            assert_eq!(cli.data_dir, Some(PathBuf::from("/srv/ink")));
            assert!(matches!(cli.command, Command::List { ref user } if user == "ana"));
        }

        #[test]
        fn test_array_config_file_is_rejected() {
            let dir = std::env::temp_dir().join(format!("inkbook-cli-config-{}", std::process::id()));
            std::fs::create_dir_all(&dir).unwrap();
            let path = dir.join("config.json");
            std::fs::write(&path, "[]").unwrap();

            let result = load_config(Some(&path));

            assert!(matches!(result, Err(CliError::Config { .. })));
            assert!(load_config(None).is_ok());
            std::fs::remove_dir_all(&dir).unwrap();
        }
    }
}

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
fn main() {
    use clap::Parser;

    env_logger::init();
    log::info!("Starting Inkbook");

    let cli = cli::Cli::parse();
    if let Err(e) = pollster::block_on(cli::run(cli)) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

#[cfg(any(not(feature = "native"), target_arch = "wasm32"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native` on a desktop target");
}
