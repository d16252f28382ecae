use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use topicpress::config::{GeneratorConfig, ServeConfig};
use topicpress::crud::DB;
use topicpress::generate::{GenerateRequest, GenerationPlan, generate_topic};
use topicpress::llm::{self, ApiKeyStore};
use topicpress::server::{self, AppState};

const DEFAULT_LOG_FILTER: &str = "topicpress=info,tower_http=info";

#[derive(Parser, Debug)]
#[command(
    name = "topicpress",
    version,
    about = "Homework topics written by an LLM, published as a shareable page.",
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve(ServeConfig),
    /// Show how a title is classified and the instruction it produces, without calling any API
    Prompt {
        /// Homework title or question
        #[arg(value_name = "TITLE")]
        title: String,
    },
    /// Generate a single topic from the terminal
    Generate {
        /// Homework title or question
        #[arg(value_name = "TITLE")]
        title: String,
        /// Also build an illustration link
        #[arg(long, default_value_t = false)]
        image: bool,
        #[command(flatten)]
        generator: GeneratorConfig,
    },
    /// Manage the text generation API key
    Llm {
        /// Store a new API key in the local auth file
        #[arg(long, value_name = "KEY", conflicts_with = "clear")]
        set: Option<String>,
        /// Remove the stored API key from the local auth file
        #[arg(long, conflicts_with = "test")]
        clear: bool,
        /// Verify the configured API key against the API
        #[arg(long, conflicts_with = "clear")]
        test: bool,
        /// Base URL of an OpenAI-compatible API, used by --test
        #[arg(long, value_name = "URL", env = "TOPICPRESS_API_BASE")]
        api_base: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run_cli().await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(config) => serve(config).await?,
        Command::Prompt { title } => {
            let plan = GenerationPlan::for_title(&title)?;
            println!("{}", serde_json::to_string_pretty(&plan.classification)?);
            println!("\n{}", plan.prompt);
            if let Some(image_prompt) = plan.image_prompt {
                println!("\nImage prompt: {image_prompt}");
            }
        }
        Command::Generate {
            title,
            image,
            generator,
        } => {
            let store = ApiKeyStore::in_data_dir()?;
            let text = generator.text_generator(&store)?;
            let images = generator.image_renderer()?;
            let request = GenerateRequest {
                title: Some(title),
                generate_image: Some(image),
            };

            let topic = generate_topic(&text, &images, &request).await?;
            println!("{}", topic.content);
            if let Some(url) = topic.image_url {
                println!("\nImage: {url}");
            }
            if let Some(warning) = topic.image_warning {
                eprintln!("\n{warning}");
            }
        }
        Command::Llm {
            set,
            clear,
            test,
            api_base,
        } => handle_llm_command(set, clear, test, api_base.as_deref()).await?,
    }

    Ok(())
}

async fn serve(config: ServeConfig) -> Result<()> {
    let store = ApiKeyStore::in_data_dir()?;
    let text = config.generator.text_generator(&store)?;
    let images = config.generator.image_renderer()?;
    tracing::info!(model = text.model(), "text generation configured");

    let db = DB::new(config.database.as_deref()).await?;
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    let state = AppState {
        db,
        text: Arc::new(text),
        images: Arc::new(images),
    };
    server::serve(listener, state).await
}

async fn handle_llm_command(
    set: Option<String>,
    clear: bool,
    test: bool,
    api_base: Option<&str>,
) -> Result<()> {
    let store = ApiKeyStore::in_data_dir()?;
    let mut action_taken = false;

    if let Some(key) = set {
        store.store(&key)?;
        println!("Stored API key in {}.", store.path().display());
        action_taken = true;
    }

    if clear {
        if store.clear()? {
            println!("Removed the stored API key.");
        } else {
            println!("No API key found in the auth file.");
        }
        action_taken = true;
    }

    if test {
        let source = llm::test_configured_api_key(&store, api_base).await?;
        println!("API key from the {} is valid.", source.description());
        action_taken = true;
    }

    if !action_taken {
        bail!("No action provided. Use --set, --clear, or --test.");
    }
    Ok(())
}
