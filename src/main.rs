use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use doc_translator::{Upload, build_service, settings};

#[derive(Parser, Debug)]
#[command(
    name = "doc-translator",
    version,
    about = "Translate office documents with pretrained translation models"
)]
struct Cli {
    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings", global = true)]
    read_settings: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Listen address (default: settings [server] addr)
        #[arg(short = 'a', long = "addr")]
        addr: Option<String>,
    },
    /// Translate one document and print the JSON response
    Translate {
        /// Document to translate (pdf/docx/pptx/xls/xlsx)
        #[arg(short = 'd', long = "data")]
        data: PathBuf,

        /// Target language
        #[arg(short = 'l', long = "lang")]
        lang: String,

        /// Source language; detected from the text when omitted
        #[arg(short = 'L', long = "source-lang")]
        source_lang: Option<String>,
    },
    /// Show the model catalog (src-tgt<TAB>model per line) and exit
    Models,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    doc_translator::logging::init(cli.verbose)?;
    let settings = settings::load_settings(cli.read_settings.as_deref())?;
    let service = build_service(&settings)?;

    match cli.command {
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| settings.server_addr.clone());
            doc_translator::server::run_server(service, &addr, settings.max_upload_bytes).await
        }
        Command::Translate {
            data,
            lang,
            source_lang,
        } => {
            let upload = Upload {
                file_name: file_name(&data)?,
                bytes: std::fs::read(&data)
                    .with_context(|| format!("failed to read data file: {}", data.display()))?,
                language: lang,
                source_language: source_lang,
            };
            let response = service
                .translate_document(upload)
                .await
                .map_err(|err| anyhow!("{:#}", err))?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Command::Models => {
            for (pair, model) in service.translator().catalog().pairs() {
                println!("{}\t{}", pair, model);
            }
            Ok(())
        }
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
        .ok_or_else(|| anyhow!("invalid data path: {}", path.display()))
}
