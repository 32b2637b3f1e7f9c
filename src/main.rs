use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};
use callm::analysis::{Analysis, analysis_prompt};
use callm::{Config, TerminalQuiz, data, logging};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Append tracing output to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the quiz in the terminal
    Quiz {
        /// JSON file to load the questions from
        #[arg(short, long)]
        questions: PathBuf,

        /// File to resume from and save answers to
        #[arg(short, long)]
        answers: Option<PathBuf>,

        /// Delay before moving to the next question, in milliseconds
        #[arg(long)]
        debounce_ms: Option<u64>,
    },
    /// Print the analysis prompt for a set of answers
    Prompt {
        #[arg(short, long)]
        questions: PathBuf,

        #[arg(short, long)]
        answers: PathBuf,
    },
    /// Validate a model analysis and print the shareable summary
    Summary {
        /// File holding the model's reply
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref()).context("failed to initialise logging")?;

    match cli.command {
        Command::Quiz {
            questions,
            answers,
            debounce_ms,
        } => {
            let config = Config::from_env(questions, answers, debounce_ms)?;
            let quiz = TerminalQuiz::from_config(&config)?;
            quiz.run().await.context("quiz ended with an error")?;
        }
        Command::Prompt {
            questions,
            answers: answers_path,
        } => {
            let quiz = data::load_quiz(&questions)?;
            let Some(answers) = data::load_answers(&answers_path)? else {
                bail!("no answers saved at {}", answers_path.display());
            };
            println!("{}", analysis_prompt(&quiz, &answers));
        }
        Command::Summary { file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let analysis = Analysis::parse(&text)
                .with_context(|| format!("{} is not a valid analysis", file.display()))?;
            println!("{}\n", analysis.band().description());
            println!("{}", analysis.share_text());
        }
    }

    Ok(())
}
