use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use docrelay::{
    config::Config,
    logging,
    parser::{DocumentParser, ParseJob, TikaDocumentParser},
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "docrelay",
    about = "Extract text with Tika and archive documents as PDF with Gotenberg"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract text and creation date, then convert to PDF.
    Parse(DocumentArgs),
    /// Print raw document metadata.
    Metadata(DocumentArgs),
    /// Convert a document to PDF.
    Convert(DocumentArgs),
    /// Render a thumbnail, converting to PDF first.
    Thumbnail(DocumentArgs),
    /// Run parse, thumbnail and metadata in pipeline order.
    Process(DocumentArgs),
}

#[derive(Args)]
struct DocumentArgs {
    /// Document to process.
    path: PathBuf,
    /// Declared MIME type; guessed from the extension when omitted.
    #[arg(long)]
    mime_type: Option<String>,
    /// Display filename passed to Tika.
    #[arg(long)]
    file_name: Option<String>,
    /// Scratch directory for converted output; a fresh `docrelay-<uuid>` under the system temp
    /// dir by default. It is kept after the run so the printed output paths stay valid.
    #[arg(long)]
    tempdir: Option<PathBuf>,
}

impl DocumentArgs {
    fn mime_type(&self) -> String {
        self.mime_type.clone().unwrap_or_else(|| guess_mime_type(&self.path))
    }

    fn job(&self) -> Result<ParseJob> {
        let job = match &self.tempdir {
            Some(dir) => ParseJob::new(dir),
            None => {
                let logging_group = Uuid::new_v4();
                ParseJob::with_logging_group(
                    default_scratch_dir(&std::env::temp_dir(), logging_group),
                    logging_group,
                )
            }
        };
        std::fs::create_dir_all(&job.tempdir).with_context(|| {
            format!("failed to create scratch directory {}", job.tempdir.display())
        })?;
        eprintln!("scratch directory: {}", job.tempdir.display());
        Ok(job)
    }
}

#[tokio::main]
async fn main() {
    logging::init_tracing();
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("failed to load configuration")?;
    let parser = TikaDocumentParser::new(config);

    match cli.command {
        Command::Parse(args) => {
            let mut job = args.job()?;
            let extraction = parser
                .parse(&mut job, &args.path, &args.mime_type(), args.file_name.as_deref())
                .await?;
            print_json(&extraction)?;
            if let Some(archive) = job.archive_path() {
                eprintln!("archive: {}", archive.display());
            }
        }
        Command::Metadata(args) => {
            let metadata = parser.extract_metadata(&args.path, &args.mime_type()).await;
            if let Some(failure) = metadata.failure() {
                eprintln!("warning: metadata unavailable: {failure}");
            }
            print_json(metadata.value())?;
        }
        Command::Convert(args) => {
            let job = args.job()?;
            let artifact = parser
                .convert_to_pdf(&job, &args.path, &args.mime_type())
                .await?;
            print_json(&artifact)?;
        }
        Command::Thumbnail(args) => {
            let mut job = args.job()?;
            let thumbnail = parser
                .get_thumbnail(&mut job, &args.path, &args.mime_type(), args.file_name.as_deref())
                .await?;
            println!("{}", thumbnail.display());
        }
        Command::Process(args) => {
            let mut job = args.job()?;
            let processed = parser
                .process(&mut job, &args.path, &args.mime_type(), args.file_name.as_deref())
                .await?;
            print_json(&processed)?;
        }
    }

    Ok(())
}

/// Per-run scratch directory, named after the job's logging group.
fn default_scratch_dir(base: &Path, logging_group: Uuid) -> PathBuf {
    base.join(format!("docrelay-{logging_group}"))
}

fn guess_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_job_dir_carries_logging_group() {
        let base = tempfile::tempdir().expect("temp dir");
        let args = DocumentArgs {
            path: PathBuf::from("statement.docx"),
            mime_type: None,
            file_name: None,
            tempdir: None,
        };
        let job = args.job().expect("job");
        let expected = default_scratch_dir(&std::env::temp_dir(), job.logging_group);

        assert_eq!(job.tempdir, expected);
        assert!(job.tempdir.is_dir());
        std::fs::remove_dir_all(&job.tempdir).expect("cleanup");

        let dir = default_scratch_dir(base.path(), Uuid::nil());
        assert_eq!(
            dir,
            base.path().join("docrelay-00000000-0000-0000-0000-000000000000")
        );
    }

    #[test]
    fn explicit_tempdir_is_used_as_is() {
        let base = tempfile::tempdir().expect("temp dir");
        let args = DocumentArgs {
            path: PathBuf::from("statement.docx"),
            mime_type: Some("application/pdf".into()),
            file_name: None,
            tempdir: Some(base.path().join("run")),
        };
        let job = args.job().expect("job");

        assert_eq!(job.tempdir, base.path().join("run"));
        assert!(job.tempdir.is_dir());
        assert_eq!(args.mime_type(), "application/pdf");
    }
}
