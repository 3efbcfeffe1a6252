use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use slidesmith::common::default_config_path;
use slidesmith::{CredentialManager, GoogleApiHandler, HandlerConfig, SlidesLookup};

#[derive(Parser, Debug)]
#[command(name = "slidesmith", version, about = "Fill Google Slides templates from the command line")]
struct Args {
    /// Config file (defaults to ~/.slidesmith/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Drive folder for copied templates; overrides the config file
    #[arg(long, global = true)]
    folder: Option<String>,

    /// Token artifact path; overrides the config file
    #[arg(long, global = true)]
    token: Option<PathBuf>,

    /// Client secrets path; overrides the config file
    #[arg(long, global = true)]
    secrets: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Obtain (or refresh) the stored token and exit
    Auth,
    #[command(flatten)]
    Op(Operation),
}

#[derive(Subcommand, Debug)]
enum Operation {
    /// Copy a template presentation into the target folder
    CopyTemplate { source_id: String, name: String },
    /// Print a presentation's full structure
    Presentation { presentation_id: String },
    /// List slide ids and their image elements
    Slides { presentation_id: String },
    /// Replace text, case-sensitively, everywhere in a presentation
    ReplaceText {
        presentation_id: String,
        search: String,
        replacement: String,
    },
    /// Replace an image element with a Drive image
    ReplaceImage {
        presentation_id: String,
        image_object_id: String,
        drive_file_id: String,
    },
    /// Delete a Drive file
    Delete { file_id: String },
    /// Print a spreadsheet range as JSON rows
    ReadRange { spreadsheet_id: String, range: String },
}

fn load_config(args: &Args) -> anyhow::Result<HandlerConfig> {
    let path = match &args.config {
        Some(path) => Some(path.clone()),
        None => default_config_path().ok().filter(|p| p.exists()),
    };

    let mut config = match path {
        Some(path) => HandlerConfig::load(&path)?,
        None => HandlerConfig::new(""),
    };

    if let Some(folder) = &args.folder {
        config.target_folder_id = folder.clone();
    }
    if let Some(token) = &args.token {
        config.token_path = token.clone();
    }
    if let Some(secrets) = &args.secrets {
        config.secrets_path = secrets.clone();
    }

    // Obtaining a token never touches the target folder.
    if matches!(args.command, Command::Auth) {
        config.validate_limits()?;
    } else {
        config
            .validate()
            .context("set target_folder_id in the config file or pass --folder")?;
    }
    Ok(config)
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn authorize(config: &HandlerConfig) -> anyhow::Result<()> {
    let credential = CredentialManager::from_config(config).acquire().await?;
    print_json(&json!({
        "token_path": &config.token_path,
        "scopes": &credential.scopes,
        "expiry": &credential.expiry,
    }))
}

async fn run(handler: &GoogleApiHandler, operation: Operation) -> anyhow::Result<()> {
    match operation {
        Operation::CopyTemplate { source_id, name } => {
            let id = handler.copy_template(&source_id, &name).await?;
            print_json(&json!({ "id": id }))
        }
        Operation::Presentation { presentation_id } => {
            let presentation = handler.get_presentation(&presentation_id).await?;
            print_json(&serde_json::to_value(&presentation)?)
        }
        Operation::Slides { presentation_id } => match handler.get_slides(&presentation_id).await {
            SlidesLookup::Slides(slides) => {
                let listing: Vec<_> = slides
                    .iter()
                    .map(|s| json!({ "object_id": s.object_id, "images": s.image_object_ids() }))
                    .collect();
                print_json(&json!(listing))
            }
            SlidesLookup::NoSlides => print_json(&json!([])),
            SlidesLookup::Unavailable(e) => {
                anyhow::bail!("could not determine slides of {}: {}", presentation_id, e)
            }
        },
        Operation::ReplaceText {
            presentation_id,
            search,
            replacement,
        } => {
            handler
                .replace_text(&search, &replacement, &presentation_id)
                .await?;
            Ok(())
        }
        Operation::ReplaceImage {
            presentation_id,
            image_object_id,
            drive_file_id,
        } => {
            handler
                .replace_images([(image_object_id.as_str(), drive_file_id.as_str())], &presentation_id)
                .await?;
            Ok(())
        }
        Operation::Delete { file_id } => {
            handler.delete_file(&file_id).await?;
            Ok(())
        }
        Operation::ReadRange {
            spreadsheet_id,
            range,
        } => {
            let rows = handler.read_range(&spreadsheet_id, &range).await?;
            print_json(&json!(rows))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    tracing::debug!(
        "Target folder {}, token {:?}",
        config.target_folder_id,
        config.token_path
    );

    match args.command {
        Command::Auth => authorize(&config).await,
        Command::Op(operation) => {
            let handler = GoogleApiHandler::connect(&config).await?;
            run(&handler, operation).await
        }
    }
}
