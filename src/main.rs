use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use chefing::backend::HttpBackend;
use chefing::commands::{self, Command, HELP};
use chefing::config::{ClientConfig, APP_NAME};
use chefing::models::{
    AssistantReply, FeedbackRequest, ImageAttachment, Message, Profile, ProfileField,
    ProfileRequest, Recipe,
};
use chefing::services::{ProfileDraft, ProfileEditError};
use chefing::{App, AppError};

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    let base_url = config
        .base_url()
        .with_context(|| format!("Invalid API URL: {}", config.api_base_url))?;
    let backend = HttpBackend::new(base_url, config.request_timeout())
        .context("Failed to build HTTP client")?;
    tracing::info!("Using backend at {}", backend.base_url());

    let mut app = App::new(Arc::new(backend), config);
    if let Err(e) = app.load().await {
        report(&e);
    }

    println!("{} - type /help for commands", APP_NAME);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    if app.needs_setup() {
        println!("No profile yet. Let's set one up.");
        run_setup(&mut app, &mut input).await?;
    }

    while let Some(line) = input.next_line().await.context("Failed to read input")? {
        let command = match commands::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        run_command(&mut app, &mut input, command).await?;
    }

    Ok(())
}

async fn run_command(app: &mut App, input: &mut Input, command: Command) -> Result<()> {
    match command {
        Command::Send(text) => send(app, &text, None).await,
        Command::SendImage { path, text } => match ImageAttachment::from_path(&path).await {
            Ok(image) => send(app, &text, Some(image)).await,
            Err(e) => println!("{:#}", e),
        },
        Command::New => match app.new_conversation().await {
            Ok(conversation) => println!("Started conversation {}", conversation.id),
            Err(e) => report(&e),
        },
        Command::List => print_conversations(app),
        Command::Open(id) => {
            if let Err(e) = app.select_conversation(Some(id)).await {
                report(&e);
            }
            print_timeline(app);
        }
        Command::Close => {
            if let Err(e) = app.select_conversation(None).await {
                report(&e);
            }
        }
        Command::Profile => {
            print_profile("Profile", app.profile());
            print_history(app);
        }
        Command::Edit {
            field,
            index,
            value,
        } => edit_profile(app, |draft| draft.set_item(field, index, value)),
        Command::Add { field, value } => edit_profile(app, |draft| {
            let index = draft.append_item(field);
            draft.set_item(field, index, value)
        }),
        Command::Remove { field, index } => {
            edit_profile(app, |draft| draft.remove_item(field, index).map(|_| ()))
        }
        Command::Save => match app.commit_profile_edit().await {
            Ok(profile) => print_profile("Saved", profile),
            Err(e) => report(&e),
        },
        Command::Cancel => {
            match app.profile_draft() {
                Some(draft) if draft.has_changes() => println!("Profile edits discarded"),
                Some(_) => println!("Profile editor closed"),
                None => println!("No profile edit in progress"),
            }
            app.cancel_profile_edit();
        }
        Command::Setup => run_setup(app, input).await?,
        Command::Feedback {
            rating,
            status,
            comments,
        } => {
            let Some(recipe) = last_recipe(app) else {
                println!("No recipe in this conversation to give feedback on.");
                return Ok(());
            };
            let feedback = FeedbackRequest {
                made_status: status,
                rating,
                comments,
                recipe,
            };
            match app.submit_feedback(feedback).await {
                Ok(()) => println!("Thanks for the feedback!"),
                Err(e) => report(&e),
            }
        }
        Command::Reset => {
            println!("This deletes all conversations and your profile. Type 'yes' to confirm.");
            let answer = input.next_line().await.context("Failed to read input")?;
            if answer.as_deref().map(str::trim) != Some("yes") {
                println!("Reset cancelled");
                return Ok(());
            }
            match app.reset().await {
                Ok(()) => {
                    println!("All data deleted.");
                    if app.needs_setup() {
                        run_setup(app, input).await?;
                    }
                }
                Err(e) => report(&e),
            }
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
    Ok(())
}

async fn send(app: &mut App, text: &str, image: Option<ImageAttachment>) {
    let job = match app.begin_send(text, image).await {
        Ok(Some(job)) => job,
        Ok(None) => return,
        Err(e) => {
            report(&e);
            return;
        }
    };
    print_timeline(app);

    let backend = app.backend();
    let outcome = job.run(backend.as_ref()).await;
    match app.finish_send(outcome) {
        Ok(()) => print_timeline(app),
        Err(e) => report(&e),
    }
}

fn edit_profile<F>(app: &mut App, edit: F)
where
    F: FnOnce(&mut ProfileDraft) -> Result<(), ProfileEditError>,
{
    if app.profile_draft().is_none() {
        app.begin_profile_edit();
    }
    let Some(draft) = app.profile_draft_mut() else {
        return;
    };
    match edit(draft) {
        Ok(()) => print_profile("Editing (use /save or /cancel)", draft.profile()),
        Err(e) => report(&AppError::from(e)),
    }
}

async fn run_setup(app: &mut App, input: &mut Input) -> Result<()> {
    let Some(ability) = prompt(input, "Describe your cooking ability:").await? else {
        return Ok(());
    };
    let Some(restrictions) = prompt(input, "Any dietary restrictions? (optional)").await? else {
        return Ok(());
    };
    let Some(goals) = prompt(input, "What are your cooking goals? (optional)").await? else {
        return Ok(());
    };

    let request = ProfileRequest {
        ability_description: ability,
        restrictions_description: restrictions,
        goal_description: goals,
    };
    match app.complete_setup(request).await {
        Ok(()) => print_profile("Profile created", app.profile()),
        Err(e) => report(&e),
    }
    Ok(())
}

async fn prompt(input: &mut Input, question: &str) -> Result<Option<String>> {
    println!("{}", question);
    let line = input.next_line().await.context("Failed to read input")?;
    Ok(line.map(|l| l.trim().to_string()))
}

fn last_recipe(app: &App) -> Option<Recipe> {
    app.timeline()
        .current_view()
        .filter_map(|m| m.reply.recipe())
        .last()
        .cloned()
}

fn report(error: &AppError) {
    tracing::debug!("{:?}", error);
    println!("! {}", error.notice());
}

fn print_conversations(app: &App) {
    let groups = app.grouped_conversations(&Local::now());
    if groups.is_empty() {
        println!("No conversations yet.");
        return;
    }
    let active = app.active_conversation_id();
    for group in groups {
        println!("{}", group.bucket);
        for conversation in group.conversations {
            let marker = if Some(conversation.id) == active { '*' } else { ' ' };
            match conversation.message_count_label() {
                Some(count) => println!(
                    " {} [{}] {} ({})",
                    marker,
                    conversation.id,
                    conversation.display_title(),
                    count
                ),
                None => println!(
                    " {} [{}] {}",
                    marker,
                    conversation.id,
                    conversation.display_title()
                ),
            }
        }
    }
}

fn print_timeline(app: &App) {
    if let Some(conversation) = app.active_conversation() {
        println!("== {} ==", conversation.display_title());
    }
    for message in app.timeline().current_view() {
        print_message(app, message);
    }
}

fn print_message(app: &App, message: &Message) {
    println!("you: {}", message.text);
    if let Some(url) = message.image.as_ref().and_then(|image| app.image_url(image)) {
        if url.starts_with("data:") {
            println!("     [image attached]");
        } else {
            println!("     [image: {}]", url);
        }
    }

    if app.is_pending(message.id) {
        println!("chef: Thinking...");
        return;
    }
    match &message.reply {
        AssistantReply::Empty => {}
        AssistantReply::Recipe(recipe) => {
            println!("chef: {}", recipe.name);
            if !recipe.ingredients.is_empty() {
                println!("  Ingredients:");
                for item in &recipe.ingredients {
                    println!("    - {}", item);
                }
            }
            for (i, step) in recipe.steps.iter().enumerate() {
                println!("  {}. {}", i + 1, step);
            }
        }
        AssistantReply::ProfileUpdate { parsed, long_term } => {
            println!("chef: Got it, I'll remember that.");
            for field in ProfileField::ALL {
                for item in parsed.items(field).iter().chain(long_term.items(field)) {
                    println!("  + {}: {}", field.display_name(), item);
                }
            }
        }
        AssistantReply::Unrecognized(value) => println!("chef: {}", value),
    }
}

fn print_profile(heading: &str, profile: &Profile) {
    println!("== {} ==", heading);
    for field in ProfileField::ALL {
        let items = profile.items(field);
        if items.is_empty() {
            continue;
        }
        println!("{}:", field.display_name());
        for (i, item) in items.iter().enumerate() {
            println!("  {}. {}", i, item);
        }
    }
}

fn print_history(app: &App) {
    let summary = app.history_summary();
    if summary.total == 0 {
        return;
    }
    println!("Recent messages:");
    for item in &summary.items {
        match &item.recipe_name {
            Some(name) => println!("  - {} -> {}", item.text, name),
            None => println!("  - {}", item.text),
        }
    }
    if summary.remaining() > 0 {
        println!("  ... and {} more", summary.remaining());
    }
}
