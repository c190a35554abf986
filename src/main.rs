use clap::{Args, Parser, Subcommand};
use console::style;
use rag_chat::commands::{QueryOptions, run_ask, run_prompt, show_config, show_status};
use rag_chat::config::Config;
use rag_chat::retriever::parse_top_k;
use rag_chat::{RagError, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rag-chat")]
#[command(about = "Answer questions from a prebuilt vector index with retrieval-augmented prompts")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to $RAG_CHAT_CONFIG, then the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a copy-paste RAG prompt for use with any chat model
    Prompt(QuestionArgs),
    /// Retrieve context and ask the configured completion endpoint
    Ask(QuestionArgs),
    /// Show index consistency and embedding provider health
    Status,
    /// Show the effective configuration
    Config,
}

#[derive(Args)]
struct QuestionArgs {
    /// Your question to ask the model
    question: String,
    /// How many context chunks to retrieve
    #[arg(short, default_value_t = 7, allow_negative_numbers = true)]
    k: i64,
    /// Print retrieved chunks for inspection
    #[arg(long)]
    debug: bool,
    /// Fail when the index and record file are misaligned
    #[arg(long)]
    strict: bool,
}

impl QuestionArgs {
    fn options(&self) -> Result<QueryOptions> {
        Ok(QueryOptions {
            k: parse_top_k(self.k)?,
            debug: self.debug,
            strict: self.strict,
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let debug = matches!(&cli.command, Commands::Prompt(args) | Commands::Ask(args) if args.debug);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug { "rag_chat=debug" } else { "rag_chat=warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("error:").bold().red(), e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).map_err(RagError::from)?;

    match cli.command {
        Commands::Prompt(args) => {
            let options = args.options()?;
            run_prompt(&config, &args.question, options)
        }
        Commands::Ask(args) => {
            let options = args.options()?;
            run_ask(&config, &args.question, options)
        }
        Commands::Status => show_status(&config),
        Commands::Config => show_config(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn prompt_command_defaults() {
        let cli = Cli::try_parse_from(["rag-chat", "prompt", "How did I sleep?"])
            .expect("should parse");

        if let Commands::Prompt(args) = cli.command {
            assert_eq!(args.question, "How did I sleep?");
            assert_eq!(args.k, 7);
            assert!(!args.debug);
            assert!(!args.strict);
        } else {
            panic!("expected prompt command");
        }
    }

    #[test]
    fn ask_command_with_flags() {
        let cli = Cli::try_parse_from([
            "rag-chat", "ask", "Tuesday?", "-k", "3", "--debug", "--strict",
        ])
        .expect("should parse");

        if let Commands::Ask(args) = cli.command {
            let options = args.options().expect("valid options");
            assert_eq!(options.k, 3);
            assert!(options.debug);
            assert!(options.strict);
        } else {
            panic!("expected ask command");
        }
    }

    #[test]
    fn negative_k_is_invalid_argument() {
        let cli = Cli::try_parse_from(["rag-chat", "prompt", "q", "-k", "-2"])
            .expect("negative numbers should parse");

        if let Commands::Prompt(args) = cli.command {
            let err = args.options().expect_err("negative k must be rejected");
            assert!(matches!(err, RagError::InvalidArgument(_)));
            assert_eq!(err.exit_code(), 4);
        } else {
            panic!("expected prompt command");
        }
    }

    #[test]
    fn global_config_flag() {
        let cli = Cli::try_parse_from(["rag-chat", "status", "--config", "/tmp/rag.toml"])
            .expect("should parse");
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/rag.toml")));
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn question_is_required() {
        let cli = Cli::try_parse_from(["rag-chat", "prompt"]);
        assert!(matches!(
            cli.map(|_| ()).map_err(|e| e.kind()),
            Err(ErrorKind::MissingRequiredArgument)
        ));
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["rag-chat", "invalid"]);
        assert!(matches!(
            cli.map(|_| ()).map_err(|e| e.kind()),
            Err(ErrorKind::InvalidSubcommand)
        ));
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["rag-chat", "--help"]);
        assert!(matches!(
            cli.map(|_| ()).map_err(|e| e.kind()),
            Err(ErrorKind::DisplayHelp)
        ));
    }
}
