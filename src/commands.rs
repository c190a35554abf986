use console::style;
use tracing::{info, warn};

use crate::Result;
use crate::config::Config;
use crate::context::assemble;
use crate::embeddings::{EmbeddingProvider, OllamaClient};
use crate::generator::{ChatClient, Prompt, build_labeled_prompt};
use crate::retriever::{DEFAULT_TOP_K, Retrieval, Retriever, parse_query};
use crate::store::IndexStore;

const PROMPT_BANNER: &str = "----- COPY THIS PROMPT INTO YOUR CHAT MODEL -----";
const PROMPT_FOOTER: &str = "----- END PROMPT -----";

/// Per-question options shared by the `prompt` and `ask` commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub k: usize,
    /// Print per-result diagnostics to stderr
    pub debug: bool,
    /// Fail on index/record misalignment instead of dropping matches
    pub strict: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            k: DEFAULT_TOP_K,
            debug: false,
            strict: false,
        }
    }
}

/// Open the configured index with the Ollama embedder
#[inline]
pub fn open_retriever(config: &Config, strict: bool) -> Result<Retriever<OllamaClient>> {
    let index_path = config.index_path()?;
    let records_path = config.records_path()?;
    let embedder = OllamaClient::new(&config.embedding)?;

    info!(
        "Using embedding model {} at {}",
        embedder.model(),
        embedder.base_url()
    );

    Ok(Retriever::open(&index_path, &records_path, embedder)?.with_strict(strict))
}

/// Retrieve context for `question` and build the prompt around it
#[inline]
pub fn prepare_prompt<E: EmbeddingProvider>(
    retriever: &Retriever<E>,
    question: &str,
    options: QueryOptions,
    context_label: &str,
) -> Result<Prompt> {
    let retrieval = retriever.retrieve(question, options.k)?;
    if options.debug {
        print_diagnostics(&retrieval);
    }
    if retrieval.is_empty() {
        warn!("No context retrieved for question; the prompt will say so");
    }

    let context = assemble(&retrieval.texts());
    Ok(build_labeled_prompt(question, &context, context_label))
}

/// Full pipeline: retrieve, build the prompt and ask the completion endpoint
#[inline]
pub fn answer_question<E: EmbeddingProvider>(
    retriever: &Retriever<E>,
    chat: &ChatClient,
    question: &str,
    options: QueryOptions,
    context_label: &str,
) -> Result<String> {
    let prompt = prepare_prompt(retriever, question, options, context_label)?;
    chat.generate(&prompt)
}

/// Print a copy-ready prompt for manual use with any chat model
#[inline]
pub fn run_prompt(config: &Config, question: &str, options: QueryOptions) -> Result<()> {
    let question = parse_query(question)?;
    let retriever = open_retriever(config, options.strict)?;
    let prompt = prepare_prompt(&retriever, question, options, &config.prompt.context_label)?;

    println!("\n{}\n", style(PROMPT_BANNER).bold().cyan());
    println!("{}", prompt.render());
    println!("\n{}\n", style(PROMPT_FOOTER).bold().cyan());

    Ok(())
}

/// Answer a question through the configured completion endpoint
#[inline]
pub fn run_ask(config: &Config, question: &str, options: QueryOptions) -> Result<()> {
    let question = parse_query(question)?;
    // Credentials are checked before any retrieval work
    let endpoint = config.generation.endpoint()?;
    let chat = ChatClient::new(&endpoint)?;

    let retriever = open_retriever(config, options.strict)?;
    let answer = answer_question(
        &retriever,
        &chat,
        question,
        options,
        &config.prompt.context_label,
    )?;

    println!("{answer}");
    Ok(())
}

/// Show the index/record consistency report and embedding provider health
#[inline]
pub fn show_status(config: &Config) -> Result<()> {
    let index_path = config.index_path()?;
    let records_path = config.records_path()?;
    let store = IndexStore::open(&index_path, &records_path)?;
    let report = store.consistency();

    println!("{}", style("Index Status").bold());
    println!("  Index file:   {}", index_path.display());
    println!("  Records file: {}", records_path.display());
    println!("  Vectors:      {}", report.vectors);
    println!("  Records:      {}", report.records);
    println!("  Dimension:    {}", report.dimension);
    println!("  Metric:       {}", report.metric);
    if report.is_consistent {
        println!("  {}", style(report.summary()).green());
    } else {
        println!("  {}", style(report.summary()).red());
    }

    println!();
    println!("{}", style("Embedding Provider").bold());
    let embedder = OllamaClient::new(&config.embedding)?;
    println!("  URL:   {}", embedder.base_url());
    println!("  Model: {}", embedder.model());
    match embedder.health_check() {
        Ok(()) => println!("  {}", style("✓ Reachable, model available").green()),
        Err(e) => println!("  {}", style(format!("⚠ {e:#}")).yellow()),
    }

    Ok(())
}

/// Print the effective configuration with credentials masked
#[inline]
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.redacted().to_toml()?);
    Ok(())
}

fn print_diagnostics(retrieval: &Retrieval) {
    eprintln!("{}", style("DEBUG").bold().yellow());
    eprintln!("{}", retrieval.diagnostics());
}
