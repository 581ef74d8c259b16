use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use wq_core::{EntityRecognizer, Error, QuizStorage};
use wq_inference::{create_model, Config, Provider, QuizGenerator};
use wq_scraper::{
    create_recognizer, HeuristicRecognizer, QuizManager, RecognizerKind, Scraper, WikipediaScraper,
};
use wq_storage::create_storage;
use wq_web::{create_app, AppState};

mod logging;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate multiple-choice quizzes from Wikipedia articles",
    long_about = None
)]
struct Cli {
    #[arg(
        long,
        env = "MODEL_PROVIDER",
        default_value = "openai",
        help = "Model provider. Available providers: openai (default), dummy"
    )]
    provider: String,

    #[arg(long, env = "MODEL_NAME", default_value = wq_inference::DEFAULT_MODEL_NAME)]
    model_name: String,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "MODEL_BASE_URL", default_value = wq_inference::DEFAULT_BASE_URL)]
    model_base_url: String,

    #[arg(long, env = "MODEL_TEMPERATURE", default_value_t = wq_inference::DEFAULT_TEMPERATURE)]
    temperature: f32,

    #[arg(long, env = "MAX_ARTICLE_CHARS", default_value_t = wq_inference::DEFAULT_MAX_ARTICLE_CHARS)]
    max_article_chars: usize,

    #[arg(
        long,
        env = "ENTITY_RECOGNIZER",
        default_value = "heuristic",
        help = "Entity recognizer: heuristic (default) or model"
    )]
    entities: String,

    #[arg(long, env = "DATABASE_URL", help = "sqlite://path.db, sqlite::memory: or memory")]
    database_url: Option<String>,

    #[arg(long, env = "CORS_ORIGINS", default_value = "*", value_delimiter = ',')]
    cors_origins: Vec<String>,

    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
    bind: String,

    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API
    Serve,
    /// Scrape, generate and store a quiz for one article
    Generate { url: String },
    /// Print the extracted article content without generating a quiz
    Scrape { url: String },
    /// List stored quizzes, newest first
    History,
    /// Print a stored quiz
    Show { id: i64 },
}

impl Cli {
    fn inference_config(&self) -> Result<Config, Error> {
        Ok(Config {
            provider: self.provider.parse::<Provider>()?,
            api_key: self.api_key.clone(),
            model_name: self.model_name.clone(),
            base_url: self.model_base_url.clone(),
            temperature: self.temperature,
            max_article_chars: self.max_article_chars,
        })
    }

    fn recognizer_kind(&self) -> Result<RecognizerKind, Error> {
        self.entities.parse()
    }

    async fn storage(&self) -> Result<Arc<dyn QuizStorage>, Error> {
        let database_url = self
            .database_url
            .as_deref()
            .ok_or_else(|| Error::Config("DATABASE_URL is required".to_string()))?;
        let storage = create_storage(database_url).await?;
        info!("💾 Storage ready ({})", database_url.split('?').next().unwrap_or(database_url));
        Ok(storage)
    }

    /// Builds every long-lived component up front so missing configuration
    /// fails before any work starts.
    async fn manager(&self) -> Result<QuizManager, Error> {
        let config = self.inference_config()?;
        let kind = self.recognizer_kind()?;
        let storage = self.storage().await?;

        let model = create_model(&config)?;
        info!("🧠 Model ready ({} / {})", model.name(), model.model_id());

        let recognizer = create_recognizer(kind, model.clone(), config.max_article_chars);
        let scraper = WikipediaScraper::new(recognizer)?;
        let generator = QuizGenerator::new(model, &config);
        Ok(QuizManager::new(Arc::new(scraper), generator, storage))
    }

    /// Extraction alone only needs a model when entities come from one.
    fn scraper(&self) -> Result<WikipediaScraper, Error> {
        let recognizer: Arc<dyn EntityRecognizer> = match self.recognizer_kind()? {
            RecognizerKind::Heuristic => Arc::new(HeuristicRecognizer::new()),
            kind => {
                let config = self.inference_config()?;
                create_recognizer(kind, create_model(&config)?, config.max_article_chars)
            }
        };
        WikipediaScraper::new(recognizer)
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match &cli.command {
        Commands::Serve => {
            let manager = cli.manager().await?;
            let app = create_app(AppState::new(manager), &cli.cors_origins)?;
            let listener = tokio::net::TcpListener::bind(&cli.bind).await?;
            info!("🚀 Listening on http://{}", listener.local_addr()?);
            axum::serve(listener, app).await?;
        }
        Commands::Generate { url } => {
            let quiz = cli.manager().await?.generate(url).await?;
            print_json(&quiz)?;
        }
        Commands::Scrape { url } => {
            let article = cli.scraper()?.scrape_article(url).await?;
            print_json(&article)?;
        }
        Commands::History => {
            let storage = cli.storage().await?;
            let items: Vec<_> = storage
                .list_recent()
                .await?
                .iter()
                .map(wq_core::quiz::HistoryItem::from)
                .collect();
            print_json(&items)?;
        }
        Commands::Show { id } => {
            let storage = cli.storage().await?;
            print_json(&storage.get_by_id(*id).await?)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("wq").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = parse(&[
            "--provider",
            "dummy",
            "--database-url",
            "memory",
            "--cors-origins",
            "http://a.test,http://b.test",
            "generate",
            "https://en.wikipedia.org/wiki/Rust",
        ]);
        assert_eq!(cli.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert!(matches!(cli.command, Commands::Generate { ref url } if url.ends_with("/Rust")));
        assert_eq!(cli.inference_config().unwrap().provider, Provider::Dummy);
    }

    #[test]
    fn test_unknown_provider_is_a_config_error() {
        let cli = parse(&["--provider", "ollama", "history"]);
        assert!(matches!(cli.inference_config(), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_dummy_manager_with_memory_storage() {
        let cli = parse(&["--provider", "dummy", "--database-url", "memory", "serve"]);
        assert!(cli.manager().await.is_ok());
    }

    #[test]
    fn test_heuristic_scraper_needs_no_model() {
        let cli = parse(&[
            "--provider",
            "openai",
            "--entities",
            "heuristic",
            "scrape",
            "https://en.wikipedia.org/wiki/Rust",
        ]);
        assert!(cli.scraper().is_ok());
    }
}
