use super::args::*;
use anyhow::Context;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use rubricate_core::{ErrorBody, GradingRequest, QuestionDraft, QuestionSet, ReviewSession};
use rubricate_runtime::{
    AiGateway, GradeStore, GradingError, GradingOrchestrator, ProviderRegistry,
    QuestionExtractor, RuntimeConfig, SqliteStore,
};

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const NOT_FOUND: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
    pub const RUNTIME_ERROR: i32 = 3;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let Cli {
        config, db, cmd, ..
    } = cli;

    match cmd {
        Command::InitDb => cmd_init_db(&db),
        Command::Extract(args) => cmd_extract(config.as_deref(), args).await,
        Command::Review(args) => cmd_review(args),
        Command::Save(args) => cmd_save(&db, args),
        Command::Questions(args) => cmd_questions(&db, &args.filename),
        Command::Grade(args) => cmd_grade(config.as_deref(), &db, args).await,
        Command::History(args) => cmd_history(&db, &args.filename),
    }
}

fn cmd_init_db(db: &Path) -> anyhow::Result<i32> {
    open_store(db)?;
    eprintln!("initialised {}", db.display());
    Ok(exit_codes::OK)
}

async fn cmd_extract(config: Option<&Path>, args: ExtractArgs) -> anyhow::Result<i32> {
    let Some(runtime) = load_config(config) else {
        return Ok(exit_codes::CONFIG_ERROR);
    };
    let provider = match runtime.create_provider(&ProviderRegistry::with_defaults()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("config error: {e}");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let filename = match args.filename {
        Some(f) => f,
        None => default_filename(&args.input)?,
    };
    let text = read_document(&args.input)?;

    let extractor = QuestionExtractor::new(AiGateway::new(provider, runtime.completion_config()));
    let extraction = extractor.extract(&text).await?;
    tracing::info!(
        filename = %filename,
        questions = extraction.drafts.len(),
        total_tokens = extraction.usage.total(),
        "extraction finished"
    );

    let session = extraction.into_session(filename);
    session
        .save_to(&args.session)
        .with_context(|| format!("failed to write session {}", args.session.display()))?;
    eprintln!(
        "wrote {} question(s) to {}; review, then `rubricate save {}`",
        session.len(),
        args.session.display(),
        args.session.display()
    );
    print_json(&session)?;
    Ok(exit_codes::OK)
}

fn cmd_review(args: ReviewArgs) -> anyhow::Result<i32> {
    let mut session = ReviewSession::load_from(&args.session)
        .with_context(|| format!("failed to load session {}", args.session.display()))?;

    let changed = match args.action.unwrap_or(ReviewAction::Show) {
        ReviewAction::Show => false,
        ReviewAction::EditQuestion { index, text } => {
            session.edit_question(index, text)?;
            true
        }
        ReviewAction::EditRubric { index, text } => {
            session.edit_rubric(index, text)?;
            true
        }
        ReviewAction::Remove { index } => {
            session.remove(index)?;
            true
        }
        ReviewAction::Add { question, rubric } => {
            session.push(QuestionDraft::new(question, rubric));
            true
        }
    };

    if changed {
        session.save_to(&args.session)?;
    }
    print_json(&session)?;
    Ok(exit_codes::OK)
}

fn cmd_save(db: &Path, args: SaveArgs) -> anyhow::Result<i32> {
    let (filename, questions) = match args.filename {
        Some(filename) => {
            let set = QuestionSet::from_path(&args.input)
                .with_context(|| format!("failed to read question set {}", args.input.display()))?;
            let questions = set.into_questions(&filename);
            (filename, questions)
        }
        None => {
            let session = ReviewSession::load_from(&args.input)
                .with_context(|| format!("failed to load session {}", args.input.display()))?;
            (session.filename.clone(), session.into_questions())
        }
    };

    let store = open_store(db)?;
    let count = store.insert_questions(&questions)?;
    tracing::info!(filename = %filename, count, "saved questions");

    print_json(&serde_json::json!({
        "message": "Questions saved successfully",
        "filename": filename,
        "count": count,
    }))?;
    Ok(exit_codes::OK)
}

fn cmd_questions(db: &Path, filename: &str) -> anyhow::Result<i32> {
    let store = open_store(db)?;
    let questions = store.questions_for(filename)?;
    if questions.is_empty() {
        print_json(&ErrorBody::new(GradingError::NotFound {
            filename: filename.to_string(),
        }))?;
        return Ok(exit_codes::NOT_FOUND);
    }

    let questions: Vec<_> = questions
        .into_iter()
        .map(|q| q.with_parsed_rubric())
        .collect();
    print_json(&questions)?;
    Ok(exit_codes::OK)
}

async fn cmd_grade(config: Option<&Path>, db: &Path, args: GradeArgs) -> anyhow::Result<i32> {
    let Some(runtime) = load_config(config) else {
        return Ok(exit_codes::CONFIG_ERROR);
    };
    let request = grading_request(args)?;

    let provider = match runtime.create_provider(&ProviderRegistry::with_defaults()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("config error: {e}");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let store: Arc<dyn GradeStore> = open_store(db)?;

    let orchestrator = GradingOrchestrator::builder()
        .provider(provider)
        .store(store)
        .config(runtime)
        .build()?;

    match orchestrator.grade_request(&request).await {
        Ok(report) => {
            eprintln!(
                "Total Score: {} / {}",
                report.total_score(),
                report.total_out_of()
            );
            print_json(&report)?;
            Ok(exit_codes::OK)
        }
        Err(e @ GradingError::NotFound { .. }) => {
            print_json(&ErrorBody::new(&e))?;
            Ok(exit_codes::NOT_FOUND)
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_history(db: &Path, filename: &str) -> anyhow::Result<i32> {
    let store = open_store(db)?;
    print_json(&store.graded_for(filename)?)?;
    Ok(exit_codes::OK)
}

/// Load the runtime config, reporting failures on stderr.
fn load_config(path: Option<&Path>) -> Option<RuntimeConfig> {
    match RuntimeConfig::load(path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("config error: {e}");
            None
        }
    }
}

fn open_store(db: &Path) -> anyhow::Result<Arc<SqliteStore>> {
    if let Some(parent) = db.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let store = SqliteStore::open(db)
        .with_context(|| format!("failed to open database {}", db.display()))?;
    Ok(Arc::new(store))
}

fn grading_request(args: GradeArgs) -> anyhow::Result<GradingRequest> {
    match (args.request, args.filename) {
        (Some(path), _) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read request {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid grading request {}", path.display()))
        }
        (None, Some(filename)) => Ok(GradingRequest {
            filename,
            answers: args.answers,
        }),
        (None, None) => anyhow::bail!("either --request or a filename is required"),
    }
}

fn default_filename(input: &Path) -> anyhow::Result<String> {
    input
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| *n != "-")
        .map(str::to_string)
        .context("--filename is required when reading from stdin")
}

fn read_document(input: &Path) -> anyhow::Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    std::fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("rubricate").chain(args.iter().copied())).unwrap()
    }

    #[tokio::test]
    async fn test_save_then_questions() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("data/grades.db");
        let set = dir.path().join("exam.yaml");
        std::fs::write(
            &set,
            "- question: Explain X\n  \
             rubric: Accuracy (5 pts) Depth (5 pts)\n\
             - question: Define Y\n",
        )
        .unwrap();

        let db_arg = db.to_str().unwrap();
        let code = dispatch(cli(&[
            "--db", db_arg, "save", set.to_str().unwrap(), "--filename", "exam.pdf",
        ]))
        .await
        .unwrap();
        assert_eq!(code, exit_codes::OK);

        let store = SqliteStore::open(&db).unwrap();
        let stored = store.questions_for("exam.pdf").unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].rubric, "");

        let code = dispatch(cli(&["--db", db_arg, "questions", "exam.pdf"])).await.unwrap();
        assert_eq!(code, exit_codes::OK);
    }

    #[tokio::test]
    async fn test_unknown_filename_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("grades.db");

        let code = dispatch(cli(&["--db", db.to_str().unwrap(), "questions", "missing.pdf"]))
            .await
            .unwrap();
        assert_eq!(code, exit_codes::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_review_edits_persist_and_save_uses_session_filename() {
        let dir = tempfile::tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        ReviewSession::new(
            "exam.pdf",
            QuestionSet::new(vec![QuestionDraft::new("Explian X", None)]),
        )
        .save_to(&session_path)
        .unwrap();
        let session_arg = session_path.to_str().unwrap();

        let code = dispatch(cli(&["review", session_arg, "edit-question", "0", "Explain X"]))
            .await
            .unwrap();
        assert_eq!(code, exit_codes::OK);
        let code = dispatch(cli(&[
            "review",
            session_arg,
            "add",
            "Define Y",
            "--rubric",
            "Precision (2 pts)",
        ]))
        .await
        .unwrap();
        assert_eq!(code, exit_codes::OK);

        let db = dir.path().join("grades.db");
        let code = dispatch(cli(&["--db", db.to_str().unwrap(), "save", session_arg]))
            .await
            .unwrap();
        assert_eq!(code, exit_codes::OK);

        let stored = SqliteStore::open(&db).unwrap().questions_for("exam.pdf").unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].question_text, "Explain X");
        assert_eq!(stored[1].rubric, "Precision (2 pts)");
    }

    #[tokio::test]
    async fn test_review_out_of_range_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        ReviewSession::new("exam.pdf", QuestionSet::default())
            .save_to(&session_path)
            .unwrap();

        let session_arg = session_path.to_str().unwrap();
        let result = dispatch(cli(&["review", session_arg, "remove", "3"])).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_bad_config_exits_with_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("rubricate.yaml");
        std::fs::write(&config, "default_out_of: -1\n").unwrap();

        let code = dispatch(cli(&[
            "--config",
            config.to_str().unwrap(),
            "--db",
            dir.path().join("grades.db").to_str().unwrap(),
            "grade",
            "exam.pdf",
            "--answer",
            "a",
        ]))
        .await
        .unwrap();
        assert_eq!(code, exit_codes::CONFIG_ERROR);
    }

    #[test]
    fn test_grading_request_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("req.json");
        std::fs::write(&path, r#"{"filename": "exam.pdf", "answers": ["a", "b"]}"#).unwrap();

        let request = grading_request(GradeArgs {
            request: Some(path),
            filename: None,
            answers: vec![],
        })
        .unwrap();
        assert_eq!(request.filename, "exam.pdf");
        assert_eq!(request.answers, vec!["a", "b"]);
    }

    #[test]
    fn test_default_filename() {
        assert_eq!(default_filename(Path::new("/tmp/exam.txt")).unwrap(), "exam.txt");
        assert!(default_filename(Path::new("-")).is_err());
    }
}
