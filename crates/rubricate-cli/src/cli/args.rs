use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rubricate",
    version,
    about = "Extract questions and rubrics from documents, then grade answers with an AI service"
)]
pub struct Cli {
    /// Runtime config (YAML). Built-in defaults when omitted
    #[arg(long, global = true, env = "RUBRICATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database holding questions and grades
    #[arg(long, global = true, env = "RUBRICATE_DB", default_value = "rubricate.db")]
    pub db: PathBuf,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level or filter directive (overrides --verbose)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the database schema
    InitDb,
    /// Extract questions and rubrics from a document's text into a review session
    Extract(ExtractArgs),
    /// Inspect or edit a review session
    Review(ReviewArgs),
    /// Save a reviewed session (or a question-set file) to the database
    Save(SaveArgs),
    /// Show the questions stored for a filename
    Questions(FilenameArgs),
    /// Grade answers against the questions stored for a filename
    Grade(GradeArgs),
    /// Show grading history for a filename
    History(FilenameArgs),
}

#[derive(Parser, Clone)]
pub struct ExtractArgs {
    /// Plain-text document, or `-` for stdin
    pub input: PathBuf,

    /// Lookup key for the batch (defaults to the input's file name)
    #[arg(long)]
    pub filename: Option<String>,

    /// Where to write the review session
    #[arg(long, default_value = "session.json")]
    pub session: PathBuf,
}

#[derive(Parser, Clone)]
pub struct ReviewArgs {
    /// Session file written by `extract`
    pub session: PathBuf,

    #[command(subcommand)]
    pub action: Option<ReviewAction>,
}

#[derive(Subcommand, Clone)]
pub enum ReviewAction {
    /// Print the session (default)
    Show,
    /// Replace the text of question INDEX
    EditQuestion { index: usize, text: String },
    /// Replace the rubric of question INDEX
    EditRubric { index: usize, text: String },
    /// Drop question INDEX
    Remove { index: usize },
    /// Append a question
    Add {
        question: String,
        #[arg(long)]
        rubric: Option<String>,
    },
}

#[derive(Parser, Clone)]
pub struct SaveArgs {
    /// Review session, or a question-set file when --filename is given
    pub input: PathBuf,

    /// Treat INPUT as a JSON/YAML question set and save it under this filename
    #[arg(long)]
    pub filename: Option<String>,
}

#[derive(Parser, Clone)]
pub struct FilenameArgs {
    pub filename: String,
}

#[derive(Parser, Clone)]
pub struct GradeArgs {
    /// JSON request file: {"filename": "...", "answers": ["...", ...]}
    #[arg(long, conflicts_with_all = ["filename", "answers"])]
    pub request: Option<PathBuf>,

    /// Lookup key of the stored questions
    #[arg(required_unless_present = "request")]
    pub filename: Option<String>,

    /// Answer text, in question order (repeatable)
    #[arg(long = "answer")]
    pub answers: Vec<String>,
}
