//! CLI interface for offnet

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;

use crate::app::App;
use crate::config::Config;
use crate::content::ContentModule;
use crate::users::{FontSize, UserProfile};

#[derive(Parser)]
#[command(name = "offnet")]
#[command(about = "Offline learning companion with a local tutor", long_about = None)]
#[command(version)]
struct Cli {
    /// Learner id (defaults to the configured user)
    #[arg(short, long, global = true, env = "OFFNET_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List learning modules with your progress
    Modules,
    /// Print a lesson
    Lesson {
        /// Module ID
        module: String,
        /// Lesson position within the module
        #[arg(short, long, default_value = "0")]
        index: usize,
    },
    /// Ask the tutor a single question
    Ask {
        /// Question text
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },
    /// Start an interactive tutoring session (default when no command given)
    Tutor,
    /// Show a practice exercise
    Exercise {
        /// Topic, e.g. fractions or natural-numbers
        #[arg(default_value = "fractions")]
        topic: String,
        /// Check an answer instead of showing the solution
        #[arg(short, long)]
        answer: Option<String>,
    },
    /// Mark a lesson as completed
    Complete {
        /// Module ID
        module: String,
        /// Lesson ID
        lesson: String,
    },
    /// Record a quiz score for a lesson
    Quiz {
        /// Module ID
        module: String,
        /// Lesson ID
        lesson: String,
        /// Score to record
        score: f64,
    },
    /// Show saved progress
    Progress,
    /// Show or update your profile
    Profile {
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Dark mode preference
        #[arg(long)]
        dark_mode: Option<bool>,
        /// Font size: small, medium or large
        #[arg(long)]
        font_size: Option<FontSize>,
    },
    /// Load the local model and show its status
    Model,
    /// Show how many entries each store namespace holds
    Storage,
    /// Delete all profiles, content and progress
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    let user_id = cli.user.unwrap_or_else(|| config.user.default_user_id.clone());

    let app = App::open(&config)
        .await
        .context("Failed to open the learning database")?;

    match cli.command.unwrap_or(Commands::Tutor) {
        Commands::Modules => list_modules(&app, &user_id).await?,
        Commands::Lesson { module, index } => show_lesson(&app, &module, index).await?,
        Commands::Ask { question } => {
            let question = question.join(" ");
            println!("{}", app.engine.respond(&question).await);
        }
        Commands::Tutor => run_tutor(&app).await?,
        Commands::Exercise { topic, answer } => show_exercise(&app, &topic, answer.as_deref()).await,
        Commands::Complete { module, lesson } => {
            let module = require_lesson(&app, &module, &lesson).await?;
            let tracker = app.tracker(&user_id).await?;
            let record = tracker.complete_lesson(&module.id, &lesson).await?;
            println!(
                "✅ Completed {} / {} ({:.0}% of module)",
                module.id,
                lesson,
                record.completion_ratio(&module) * 100.0
            );
        }
        Commands::Quiz { module, lesson, score } => {
            let module = require_lesson(&app, &module, &lesson).await?;
            let tracker = app.tracker(&user_id).await?;
            tracker.record_quiz_score(&module.id, &lesson, score).await?;
            println!("Recorded score {} for {} / {}", score, module.id, lesson);
        }
        Commands::Progress => show_progress(&app, &user_id).await?,
        Commands::Profile { name, dark_mode, font_size } => {
            update_profile(&app, &config, &user_id, name, dark_mode, font_size).await?
        }
        Commands::Model => {
            app.model.ensure_loaded().await;
            let info = app.model.info();
            println!("Model:  {} ({})", info.name, info.size);
            println!("Status: {}", info.status);
        }
        Commands::Storage => {
            let info = app.storage_info().await?;
            println!("Users:    {}", info.users);
            println!("Content:  {}", info.content);
            println!("Progress: {}", info.progress);
        }
        Commands::Reset { yes } => {
            if !yes {
                anyhow::bail!("Refusing to delete all data without --yes");
            }
            app.clear_all_data().await?;
            println!("All learning data cleared.");
        }
    }

    Ok(())
}

async fn require_module(app: &App, module_id: &str) -> Result<ContentModule> {
    app.content.ensure_seeded().await?;
    app.content
        .get_module(module_id)
        .await?
        .with_context(|| format!("Unknown module '{}'", module_id))
}

/// The module holding `lesson_id`, or an error if either is unknown
async fn require_lesson(app: &App, module_id: &str, lesson_id: &str) -> Result<ContentModule> {
    let module = require_module(app, module_id).await?;
    if module.lesson(lesson_id).is_none() {
        anyhow::bail!("Module '{}' has no lesson '{}'", module.id, lesson_id);
    }
    Ok(module)
}

async fn list_modules(app: &App, user_id: &str) -> Result<()> {
    let modules = app.content.get_all_modules().await?;
    let tracker = app.tracker(user_id).await?;

    for module in &modules {
        let done = tracker
            .module_progress(&module.id)
            .await
            .map(|p| p.completion_ratio(module))
            .unwrap_or(0.0);
        let count = module.lessons.len();
        println!(
            "{:<12} {} - {} {} ({:.0}% done)",
            module.id,
            module.title,
            count,
            if count == 1 { "lesson" } else { "lessons" },
            done * 100.0
        );
        println!("             {}", module.description);
    }

    Ok(())
}

async fn show_lesson(app: &App, module_id: &str, index: usize) -> Result<()> {
    let module = require_module(app, module_id).await?;
    let lesson = module
        .lesson_at(index)
        .with_context(|| format!("Module '{}' has {} lessons", module.id, module.lessons.len()))?;

    println!("{} - lesson {} of {}", module.title, index + 1, module.lessons.len());
    println!("{}", lesson.content.trim());

    let next = module.next_lesson_index(index);
    if next != index {
        println!("\nNext: offnet lesson {} --index {}", module.id, next);
    }

    Ok(())
}

async fn show_exercise(app: &App, topic: &str, answer: Option<&str>) {
    let exercise = app.engine.exercise(topic).await;

    println!("{}", exercise.question);
    if let Some(options) = &exercise.options {
        for (i, option) in options.iter().enumerate() {
            println!("  {}) {}", i + 1, option);
        }
    }

    match answer {
        Some(answer) if exercise.is_correct(answer) => println!("\n✅ Correct!"),
        Some(_) => println!("\n❌ Not quite. Try again."),
        None => {
            println!("\nAnswer: {}", exercise.correct_answer);
            if let Some(explanation) = &exercise.explanation {
                println!("{}", explanation);
            }
        }
    }
}

async fn show_progress(app: &App, user_id: &str) -> Result<()> {
    let tracker = app.tracker(user_id).await?;
    let records = tracker.records().await;

    if records.is_empty() {
        println!("No progress saved for '{}' yet.", user_id);
        return Ok(());
    }

    for record in records {
        println!(
            "{:<12} {} lessons completed, last visited {}",
            record.module_id,
            record.completed_lessons.len(),
            record.last_accessed.format("%Y-%m-%d %H:%M")
        );
        for (lesson, score) in &record.quiz_scores {
            println!("             quiz {}: {}", lesson, score);
        }
    }

    Ok(())
}

async fn update_profile(
    app: &App,
    config: &Config,
    user_id: &str,
    name: Option<String>,
    dark_mode: Option<bool>,
    font_size: Option<FontSize>,
) -> Result<()> {
    let existing = app.users.get_user(user_id).await?;
    let changed = name.is_some() || dark_mode.is_some() || font_size.is_some();

    let mut profile = existing
        .clone()
        .unwrap_or_else(|| UserProfile::new(user_id, config.user.default_name.clone()));
    if let Some(name) = name {
        profile.name = name;
    }
    if let Some(dark_mode) = dark_mode {
        profile.preferences.dark_mode = dark_mode;
    }
    if let Some(font_size) = font_size {
        profile.preferences.font_size = font_size;
    }

    if changed || existing.is_none() {
        app.users.save_user(&profile).await?;
    }

    println!("Id:        {}", profile.id);
    println!("Name:      {}", profile.name);
    println!("Dark mode: {}", profile.preferences.dark_mode);
    println!("Font size: {}", profile.preferences.font_size);

    Ok(())
}

async fn run_tutor(app: &App) -> Result<()> {
    let mut session = app.session();
    let mut rl = rustyline::DefaultEditor::new()?;

    let info = app.model.info();
    println!("Offline tutor ({} {}). Type /exercise <topic>, /clear or /quit.", info.name, info.size);

    loop {
        match rl.readline("you> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match line {
                    "/quit" | "/exit" => break,
                    "/clear" => {
                        session.clear();
                        println!("Conversation cleared.");
                    }
                    _ if line.starts_with("/exercise") => {
                        let topic = line.trim_start_matches("/exercise").trim();
                        let topic = if topic.is_empty() { "fractions" } else { topic };
                        show_exercise(app, topic, None).await;
                    }
                    _ => {
                        if let Some(reply) = session.ask(line).await {
                            println!("tutor> {}\n", reply);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    println!("{} messages this session. Goodbye!", session.messages().len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DurableStore, Namespace, SqliteStore};
    use std::sync::Arc;

    fn app() -> (Arc<SqliteStore>, App) {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        (store.clone(), App::with_store(store, &Config::default()))
    }

    #[tokio::test]
    async fn test_require_lesson_accepts_seeded_lesson() {
        let (_, app) = app();
        let module = require_lesson(&app, "intro", "lesson-2").await.unwrap();
        assert_eq!(module.id, "intro");
    }

    #[tokio::test]
    async fn test_require_lesson_rejects_unknown_ids() {
        let (store, app) = app();

        let err = require_lesson(&app, "calculus", "lesson-1").await.unwrap_err();
        assert!(err.to_string().contains("Unknown module 'calculus'"));

        let err = require_lesson(&app, "intro", "lesson-9").await.unwrap_err();
        assert!(err.to_string().contains("has no lesson 'lesson-9'"));

        assert_eq!(store.count(Namespace::Progress).await.unwrap(), 0);
    }
}
