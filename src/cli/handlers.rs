use crate::cli::commands::{Cli, Commands, ConfigCommands};
use crate::config::{self, ProfessorConfig};
use crate::dashboard::{Action, Dashboard, DashboardState, Status, View};
use crate::error::{ProfessorError, Result};
use crate::lectures::{LectureDraft, LectureService};
use crate::storage::database::Database;
use crate::storage::{Lecture, LectureId, Visibility};
use crate::{llm, transcription, upload};
use std::path::{Path, PathBuf};

pub async fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Lectures { search } => handle_browse(View::Lectures, search),
        Commands::Discover { search } => handle_browse(View::Discover, search),
        Commands::Code { code } => handle_browse(View::CodeSearch, Some(code)),
        Commands::Show { id } => handle_show(&id),
        Commands::Create {
            title,
            private,
            video_url,
            transcribe,
            transcript_file,
        } => handle_create(title, private, video_url, transcribe, transcript_file).await,
        Commands::Delete { id, yes } => handle_delete(&id, yes),
        Commands::Ask {
            id,
            question,
            transcript_file,
        } => handle_ask(id, &question, transcript_file).await,
        Commands::Transcribe { url } => handle_transcribe(&url).await,
        Commands::UploadUrl { name, content_type } => handle_upload_url(&name, &content_type).await,
        Commands::Dashboard => handle_dashboard().await,
        Commands::Config { action } => handle_config(action),
    }
}

fn open_dashboard(cfg: &ProfessorConfig) -> Result<Dashboard> {
    let db_path = config::loader::database_path(cfg)?;
    tracing::debug!("Opening lecture store at {}", db_path.display());
    let db = Database::open(&db_path)?;
    Ok(Dashboard::new(LectureService::new(db, cfg.lectures.code_policy)))
}

fn handle_browse(view: View, search: Option<String>) -> Result<()> {
    let mut dash = open_dashboard(&config::loader::load_config_with_env()?)?;
    dash.dispatch(Action::SelectView(view));
    if let Some(term) = search {
        dash.dispatch(Action::Search(term));
    }

    print_lectures(dash.state());
    check_status(dash.state())
}

fn check_status(state: &DashboardState) -> Result<()> {
    match &state.status {
        Status::Failed(message) => Err(ProfessorError::Dashboard(message.clone())),
        _ => Ok(()),
    }
}

/// The lecture a create produced, even if refreshing the list afterwards failed.
fn created_lecture(state: &DashboardState) -> Result<Option<&Lecture>> {
    match &state.last_created {
        Some(lecture) => {
            if let Status::Failed(message) = &state.status {
                tracing::warn!("Lecture saved but the list could not be refreshed: {}", message);
            }
            Ok(Some(lecture))
        }
        None => check_status(state).map(|_| None),
    }
}

fn handle_show(id: &str) -> Result<()> {
    let dash = open_dashboard(&config::loader::load_config_with_env()?)?;
    let lecture = dash.service().get(&LectureId::from_string(id.to_string()))?;

    println!("Title:      {}", lecture.display_title());
    println!("ID:         {}", lecture.id);
    println!("Visibility: {}", lecture.visibility);
    if let Some(code) = &lecture.private_code {
        println!("Code:       {}", code);
    }
    println!(
        "Created:    {}",
        lecture.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "Video:      {}",
        lecture.video_url.as_deref().unwrap_or("No video URL available.")
    );
    println!();
    println!("Transcription:");
    println!(
        "{}",
        lecture
            .transcription
            .as_deref()
            .unwrap_or("No transcription available.")
    );
    Ok(())
}

async fn handle_create(
    title: String,
    private: bool,
    video_url: Option<String>,
    transcribe: bool,
    transcript_file: Option<PathBuf>,
) -> Result<()> {
    let cfg = &config::loader::load_config_with_env()?;
    let visibility = if private {
        Visibility::Private
    } else {
        Visibility::Public
    };
    let mut draft = LectureDraft::new(title, visibility);

    if !draft.has_title() {
        println!("A lecture title is required; nothing was saved.");
        return Ok(());
    }

    // Transcription happens before the write so a failure leaves no record.
    draft.transcription = match (&video_url, transcribe, transcript_file) {
        (Some(url), true, _) => {
            println!("Transcribing {}...", url);
            Some(transcription::transcribe_url(&cfg.transcription, url).await?)
        }
        (_, _, Some(path)) => Some(read_transcript(&path)?),
        _ => None,
    };
    draft.video_url = video_url;

    let mut dash = open_dashboard(cfg)?;
    dash.dispatch(Action::SelectView(View::Lectures));
    dash.dispatch(Action::SubmitCreate(draft));

    match created_lecture(dash.state())? {
        Some(lecture) => {
            println!("Created lecture: {}", lecture.display_title());
            println!("  ID:   {}", lecture.id);
            if let Some(code) = &lecture.private_code {
                println!("  Code: {}", code);
            }
        }
        None => println!("Nothing was saved."),
    }
    Ok(())
}

fn handle_delete(id: &str, yes: bool) -> Result<()> {
    use dialoguer::{theme::ColorfulTheme, Confirm};

    let mut dash = open_dashboard(&config::loader::load_config_with_env()?)?;
    let lecture = dash.service().get(&LectureId::from_string(id.to_string()))?;

    dash.dispatch(Action::SelectView(View::Lectures));
    dash.dispatch(Action::RequestDelete(lecture.id.clone()));

    let confirmed = yes
        || Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Are you sure you want to delete \"{}\"?",
                lecture.display_title()
            ))
            .default(false)
            .interact()
            .unwrap_or(false);

    if !confirmed {
        dash.dispatch(Action::CancelDelete);
        println!("Cancelled.");
        return Ok(());
    }

    dash.dispatch(Action::ConfirmDelete);
    check_status(dash.state())?;
    println!("Deleted lecture: {}", lecture.display_title());
    Ok(())
}

async fn handle_ask(
    id: Option<String>,
    question: &str,
    transcript_file: Option<PathBuf>,
) -> Result<()> {
    let cfg = &config::loader::load_config_with_env()?;
    let transcript = match (id, transcript_file) {
        (_, Some(path)) => read_transcript(&path)?,
        (Some(id), None) => {
            let dash = open_dashboard(cfg)?;
            let lecture = dash.service().get(&LectureId::from_string(id))?;
            lecture
                .transcription
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| {
                    ProfessorError::Validation(format!(
                        "Lecture \"{}\" has no transcription",
                        lecture.title
                    ))
                })?
        }
        (None, None) => {
            return Err(ProfessorError::Validation(
                "Provide a lecture ID or a transcript file".to_string(),
            ))
        }
    };

    let answer = llm::answer_question(&cfg.llm, &transcript, question).await?;
    println!("{}", answer);
    Ok(())
}

async fn handle_transcribe(url: &str) -> Result<()> {
    let cfg = config::loader::load_config_with_env()?;
    let text = transcription::transcribe_url(&cfg.transcription, url).await?;
    println!("{}", text);
    Ok(())
}

async fn handle_upload_url(name: &str, content_type: &str) -> Result<()> {
    let cfg = config::loader::load_config_with_env()?;
    let ticket = upload::presign_upload(&cfg.upload, name, content_type).await?;
    println!("Upload URL: {}", ticket.upload_url);
    println!("Key:        {}", ticket.key);
    println!("Object URL: {}", ticket.object_url);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Switch(View),
    Search,
    Open,
    Create,
    Delete,
    Refresh,
    Quit,
}

impl MenuItem {
    fn label(&self, view: View) -> String {
        match self {
            MenuItem::Switch(target) => format!("Go to {}", target.label()),
            MenuItem::Search if view == View::CodeSearch => "Enter private code".to_string(),
            MenuItem::Search => "Search titles".to_string(),
            MenuItem::Open => "Open a lecture".to_string(),
            MenuItem::Create => "New lecture".to_string(),
            MenuItem::Delete => "Delete a lecture".to_string(),
            MenuItem::Refresh => "Refresh".to_string(),
            MenuItem::Quit => "Quit".to_string(),
        }
    }
}

fn menu_for(state: &DashboardState) -> Vec<MenuItem> {
    let mut items = vec![MenuItem::Search];
    if !state.lectures.is_empty() {
        items.push(MenuItem::Open);
    }
    if state.view == View::Lectures {
        items.push(MenuItem::Create);
        if !state.lectures.is_empty() {
            items.push(MenuItem::Delete);
        }
    }
    if state.active_query.is_some() {
        items.push(MenuItem::Refresh);
    }
    items.extend(
        View::ALL
            .iter()
            .filter(|v| **v != state.view)
            .map(|v| MenuItem::Switch(*v)),
    );
    items.push(MenuItem::Quit);
    items
}

async fn handle_dashboard() -> Result<()> {
    use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

    let cfg = &config::loader::load_config_with_env()?;
    let theme = ColorfulTheme::default();
    let mut dash = open_dashboard(cfg)?;
    dash.dispatch(Action::SelectView(View::Lectures));

    loop {
        println!();
        println!("== {} ==", dash.state().view.label());
        print_lectures(dash.state());

        let view = dash.state().view;
        let items = menu_for(dash.state());
        let labels: Vec<String> = items.iter().map(|i| i.label(view)).collect();
        let selection = Select::with_theme(&theme)
            .items(&labels)
            .default(0)
            .interact_opt()
            .map_err(|e| ProfessorError::Prompt(e.to_string()))?;

        let Some(index) = selection else {
            return Ok(());
        };

        match items[index] {
            MenuItem::Switch(target) => dash.dispatch(Action::SelectView(target)),
            MenuItem::Search => {
                let prompt = if view == View::CodeSearch {
                    "Private code"
                } else {
                    "Title starts with (blank for all)"
                };
                let term: String = Input::with_theme(&theme)
                    .with_prompt(prompt)
                    .allow_empty(true)
                    .interact_text()
                    .map_err(|e| ProfessorError::Prompt(e.to_string()))?;
                dash.dispatch(Action::Search(term));
            }
            MenuItem::Open => {
                if let Some(lecture) = pick_lecture(&theme, &dash.state().lectures)? {
                    print_lecture(lecture);
                    ask_loop(cfg, &theme, lecture).await?;
                }
            }
            MenuItem::Create => {
                let title: String = Input::with_theme(&theme)
                    .with_prompt("Lecture title")
                    .allow_empty(true)
                    .interact_text()
                    .map_err(|e| ProfessorError::Prompt(e.to_string()))?;
                let private = Confirm::with_theme(&theme)
                    .with_prompt("Private (reachable by code only)?")
                    .default(false)
                    .interact()
                    .unwrap_or(false);
                let video_url: String = Input::with_theme(&theme)
                    .with_prompt("Video URL (blank for none)")
                    .allow_empty(true)
                    .interact_text()
                    .map_err(|e| ProfessorError::Prompt(e.to_string()))?;

                let visibility = if private {
                    Visibility::Private
                } else {
                    Visibility::Public
                };
                let mut draft = LectureDraft::new(title, visibility);
                if draft.has_title() && !video_url.trim().is_empty() {
                    match transcription::transcribe_url(&cfg.transcription, &video_url).await {
                        Ok(text) => {
                            draft.video_url = Some(video_url.trim().to_string());
                            draft.transcription = Some(text);
                        }
                        Err(e) => {
                            eprintln!("Error: {}", e);
                            continue;
                        }
                    }
                }
                dash.dispatch(Action::SubmitCreate(draft));
                if let Some(code) = dash
                    .state()
                    .last_created
                    .as_ref()
                    .and_then(|l| l.private_code.as_ref())
                {
                    println!("Private code: {}", code);
                }
            }
            MenuItem::Delete => {
                let Some(lecture) = pick_lecture(&theme, &dash.state().lectures)? else {
                    continue;
                };
                let title = lecture.display_title().to_string();
                let id = lecture.id.clone();
                dash.dispatch(Action::RequestDelete(id));
                let confirmed = Confirm::with_theme(&theme)
                    .with_prompt(format!("Are you sure you want to delete \"{}\"?", title))
                    .default(false)
                    .interact()
                    .unwrap_or(false);
                if confirmed {
                    dash.dispatch(Action::ConfirmDelete);
                } else {
                    dash.dispatch(Action::CancelDelete);
                }
            }
            MenuItem::Refresh => dash.dispatch(Action::Refresh),
            MenuItem::Quit => return Ok(()),
        }
    }
}

fn pick_lecture<'a>(
    theme: &dialoguer::theme::ColorfulTheme,
    lectures: &'a [Lecture],
) -> Result<Option<&'a Lecture>> {
    let items: Vec<String> = lectures
        .iter()
        .map(|l| {
            format!(
                "{} | {}",
                l.created_at.format("%Y-%m-%d %H:%M"),
                truncate(l.display_title(), 40)
            )
        })
        .collect();

    let selection = dialoguer::Select::with_theme(theme)
        .with_prompt("Select a lecture")
        .items(&items)
        .default(0)
        .interact_opt()
        .map_err(|e| ProfessorError::Prompt(e.to_string()))?;

    Ok(selection.map(|i| &lectures[i]))
}

async fn ask_loop(
    cfg: &ProfessorConfig,
    theme: &dialoguer::theme::ColorfulTheme,
    lecture: &Lecture,
) -> Result<()> {
    let Some(transcript) = lecture.transcription.as_deref() else {
        return Ok(());
    };

    loop {
        let question: String = dialoguer::Input::with_theme(theme)
            .with_prompt("Ask about this lecture (blank to go back)")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| ProfessorError::Prompt(e.to_string()))?;
        if question.trim().is_empty() {
            return Ok(());
        }

        match llm::answer_question(&cfg.llm, transcript, &question).await {
            Ok(answer) => println!("\n{}\n", answer),
            Err(e) => eprintln!("Error: {}", e),
        }
    }
}

fn print_lectures(state: &DashboardState) {
    if let Status::Failed(message) = &state.status {
        eprintln!("Error: {}", message);
    }

    if state.lectures.is_empty() {
        match state.view {
            View::CodeSearch if state.active_query.is_none() => {
                println!("Enter a private code to find a lecture.")
            }
            View::CodeSearch => println!("No lecture found for that code."),
            _ => println!("No lectures found."),
        }
        return;
    }

    let show_code = state.view == View::Lectures;
    if show_code {
        println!(
            "{:<36} {:<30} {:<8} {:<7} {:<16}",
            "ID", "Title", "Access", "Code", "Created"
        );
        println!("{}", "-".repeat(101));
    } else {
        println!("{:<36} {:<30} {:<16}", "ID", "Title", "Created");
        println!("{}", "-".repeat(84));
    }

    for lecture in &state.lectures {
        let created = lecture.created_at.format("%Y-%m-%d %H:%M").to_string();
        if show_code {
            let code = lecture
                .private_code
                .as_ref()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<36} {:<30} {:<8} {:<7} {:<16}",
                lecture.id,
                truncate(lecture.display_title(), 28),
                lecture.visibility,
                code,
                created
            );
        } else {
            println!(
                "{:<36} {:<30} {:<16}",
                lecture.id,
                truncate(lecture.display_title(), 28),
                created
            );
        }
    }
}

fn print_lecture(lecture: &Lecture) {
    println!();
    println!("# {}", lecture.display_title());
    println!(
        "Video: {}",
        lecture.video_url.as_deref().unwrap_or("No video URL available.")
    );
    println!();
    println!(
        "{}",
        lecture
            .transcription
            .as_deref()
            .unwrap_or("No transcription available.")
    );
    println!();
}

fn read_transcript(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Err(ProfessorError::Validation(format!(
            "Transcript file is empty: {}",
            path.display()
        )));
    }
    Ok(text)
}

fn handle_config(action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let cfg = config::loader::load_config()?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigCommands::Path => {
            println!("{}", config::loader::config_path()?.display());
        }
        ConfigCommands::Init => {
            config::loader::ensure_directories()?;
            let cfg = config::loader::load_config()?;
            println!(
                "Configuration initialized at: {}",
                config::loader::config_path()?.display()
            );
            println!("\nDefault settings:");
            println!("  Database: {}", config::loader::database_path(&cfg)?.display());
            println!("  Code policy: {:?}", cfg.lectures.code_policy);
            println!("  Transcription model: {}", cfg.transcription.model);
            println!("  Q&A model: {}", cfg.llm.model);
        }
    }
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
