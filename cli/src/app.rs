use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use dishanveshi_core::{Action, Controller, Indicator, Outcome, PlaceKind};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

use crate::cli::Command;
use crate::output;

/// Terminal spinner shown while a request is in flight
#[derive(Default)]
pub struct SpinnerIndicator {
    spinner: Mutex<Option<ProgressBar>>,
}

impl SpinnerIndicator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Indicator for SpinnerIndicator {
    fn show(&self, label: &str) {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(label.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));

        let mut slot = self.spinner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.replace(spinner) {
            previous.finish_and_clear();
        }
    }

    fn hide(&self) {
        let mut slot = self.spinner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(spinner) = slot.take() {
            spinner.finish_and_clear();
        }
    }
}

/// Runs one action and prints whatever it added to the message log
async fn perform(controller: &mut Controller, action: Action) -> Outcome {
    let mark = controller.view().messages.len();
    let outcome = controller.handle(action).await;
    output::print_messages_since(controller.view(), mark);
    outcome
}

fn prompt_email(email: Option<String>) -> Result<String> {
    match email {
        Some(email) => Ok(email),
        None => Input::<String>::new()
            .with_prompt("Email")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read email"),
    }
}

fn prompt_password() -> Result<String> {
    Password::new()
        .with_prompt("Password")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read password")
}

/// Logs in, or registers and then offers to log in with the same credentials
async fn run_auth(controller: &mut Controller, email: Option<String>, register: bool) -> Result<Outcome> {
    let email = prompt_email(email)?;
    let password = prompt_password()?;

    if !register {
        let outcome = perform(controller, Action::Login { email, password }).await;
        output::print_saved(controller.view());
        return Ok(outcome);
    }

    let outcome = perform(
        controller,
        Action::Register {
            email: email.clone(),
            password: password.clone(),
        },
    )
    .await;
    if outcome != Outcome::Registered {
        return Ok(outcome);
    }

    let login_now = Confirm::new()
        .with_prompt("Log in now?")
        .default(true)
        .interact()
        .context("Failed to read confirmation")?;
    if !login_now {
        return Ok(Outcome::Completed);
    }
    let outcome = perform(controller, Action::Login { email, password }).await;
    output::print_saved(controller.view());
    Ok(outcome)
}

/// Runs a single command and reports how it ended
pub async fn run_command(controller: &mut Controller, command: Command) -> Result<Outcome> {
    info!("Running command: {:?}", command);
    let outcome = match command {
        Command::Login { email } => run_auth(controller, email, false).await?,
        Command::Register { email } => run_auth(controller, email, true).await?,
        Command::Logout => perform(controller, Action::Logout).await,
        Command::Status => {
            output::print_status(controller);
            Outcome::Completed
        }
        Command::Plan { destination, save } => {
            let outcome = perform(
                controller,
                Action::GenerateItinerary {
                    destination: destination.unwrap_or_default(),
                },
            )
            .await;
            if outcome == Outcome::Completed {
                output::print_plan(controller.view());
            }
            if save && outcome == Outcome::Completed {
                perform(controller, Action::SaveItinerary).await
            } else {
                outcome
            }
        }
        Command::Ask { query } => {
            perform(
                controller,
                Action::Ask {
                    query: query.join(" "),
                },
            )
            .await
        }
        Command::Saved => {
            let outcome = perform(controller, Action::LoadSaved).await;
            output::print_saved(controller.view());
            outcome
        }
        Command::Places { lat, lng, kind } => {
            perform(
                controller,
                Action::SearchPlaces {
                    lat,
                    lng,
                    kind: kind.into(),
                },
            )
            .await
        }
        Command::Health => perform(controller, Action::Health).await,
        Command::Shell => {
            run_interactive_shell(controller).await?;
            Outcome::Completed
        }
        // handled in main before the controller exists
        Command::Config { .. } => Outcome::Completed,
    };
    Ok(outcome)
}

/// One parsed line of interactive input
#[derive(Debug, PartialEq)]
pub(crate) enum ShellInput {
    Exit,
    Help,
    Status,
    Login(Option<String>),
    Register(Option<String>),
    Action(Action),
    Invalid(String),
}

pub(crate) fn parse_shell_line(line: &str) -> Option<ShellInput> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return Some(ShellInput::Exit);
    }
    let Some(command) = line.strip_prefix('/') else {
        return Some(ShellInput::Action(Action::Ask {
            query: line.to_string(),
        }));
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };
    let optional = |rest: &str| (!rest.is_empty()).then(|| rest.to_string());

    let input = match name.to_ascii_lowercase().as_str() {
        "help" => ShellInput::Help,
        "status" => ShellInput::Status,
        "login" => ShellInput::Login(optional(rest)),
        "register" => ShellInput::Register(optional(rest)),
        "logout" => ShellInput::Action(Action::Logout),
        "plan" => ShellInput::Action(Action::GenerateItinerary {
            destination: rest.to_string(),
        }),
        "save" => ShellInput::Action(Action::SaveItinerary),
        "saved" => ShellInput::Action(Action::LoadSaved),
        "health" => ShellInput::Action(Action::Health),
        "places" => parse_places(rest),
        other => ShellInput::Invalid(format!("Unknown command /{}. Try /help.", other)),
    };
    Some(input)
}

fn parse_places(rest: &str) -> ShellInput {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    let usage = || ShellInput::Invalid("Usage: /places <lat> <lng> [food|stay]".to_string());
    let (lat, lng) = match (parts.first(), parts.get(1)) {
        (Some(lat), Some(lng)) => match (lat.parse::<f64>(), lng.parse::<f64>()) {
            (Ok(lat), Ok(lng)) => (lat, lng),
            _ => return usage(),
        },
        _ => return usage(),
    };
    let kind = match parts.get(2).map(|k| k.to_ascii_lowercase()) {
        None => PlaceKind::Food,
        Some(k) if k == "food" => PlaceKind::Food,
        Some(k) if k == "stay" => PlaceKind::Stay,
        Some(_) => return usage(),
    };
    ShellInput::Action(Action::SearchPlaces { lat, lng, kind })
}

/// Runs an interactive session until the user types exit or closes stdin
pub async fn run_interactive_shell(controller: &mut Controller) -> Result<()> {
    println!("Dishanveshi interactive session. Type /help for commands, 'exit' to leave.");
    output::print_status(controller);
    println!();

    loop {
        print!("{}: ", "You".green().bold());
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        let read = io::stdin()
            .read_line(&mut line)
            .context("Failed to read input")?;
        if read == 0 {
            println!();
            break;
        }

        let Some(input) = parse_shell_line(&line) else {
            continue;
        };
        debug!("Shell input: {:?}", input);

        match input {
            ShellInput::Exit => {
                println!("Goodbye.");
                break;
            }
            ShellInput::Help => output::print_shell_help(),
            ShellInput::Status => output::print_status(controller),
            ShellInput::Invalid(message) => eprintln!("{}", message.yellow()),
            ShellInput::Login(email) => {
                run_auth(controller, email, false).await?;
            }
            ShellInput::Register(email) => {
                run_auth(controller, email, true).await?;
            }
            ShellInput::Action(action) => {
                // the user's own line is already on screen
                let is_ask = matches!(action, Action::Ask { .. });
                let shows_plan = matches!(action, Action::GenerateItinerary { .. });
                let shows_saved = matches!(action, Action::LoadSaved | Action::SaveItinerary);
                let mark = controller.view().messages.len();
                let outcome = controller.handle(action).await;
                let skip = if is_ask && outcome == Outcome::Completed { 1 } else { 0 };
                output::print_messages_since(controller.view(), mark + skip);
                if shows_plan && outcome == Outcome::Completed {
                    output::print_plan(controller.view());
                }
                if shows_saved {
                    output::print_saved(controller.view());
                }
            }
        }
        println!();
    }

    Ok(())
}
