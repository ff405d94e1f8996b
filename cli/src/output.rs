use colored::*;
use dishanveshi_core::{AuthView, Controller, Message, SavedPanel, Sender, View};
use pulldown_cmark::{Event as MdEvent, HeadingLevel, Options, Parser as MdParser, Tag};

/// Print every message appended to the log since `from`
pub fn print_messages_since(view: &View, from: usize) {
    for message in view.messages.iter().skip(from) {
        print_message(message);
    }
}

pub fn print_message(message: &Message) {
    match message.sender {
        Sender::User => println!("{}: {}", "You".green().bold(), message.text),
        Sender::Assistant if message.is_error => {
            eprintln!("{}: {}", "Dishanveshi".red().bold(), message.text.red())
        }
        Sender::Assistant => println!(
            "{}: {}",
            "Dishanveshi".blue().bold(),
            render_markdown(&message.text).trim_end()
        ),
    }
}

/// Print the current plan as one card per day
pub fn print_plan(view: &View) {
    if view.plan.is_empty() {
        return;
    }
    if let Some(destination) = &view.plan_destination {
        println!();
        println!("{}", format!("Itinerary: {}", destination).yellow().bold());
    }
    for card in &view.plan {
        println!();
        println!("{}", format!("Day {}", card.day).cyan().bold());
        if !card.summary.is_empty() {
            println!("  {}", card.summary);
        }
        for name in &card.place_names {
            println!("  {}  {}", "•".yellow(), name);
        }
    }
    if let Some(url) = &view.map_url {
        println!();
        println!("{} {}", "Map:".cyan(), url.dimmed());
    }
    if let Some(notice) = &view.map_notice {
        println!("{}", format!("⚠ {}", notice).yellow());
    }
}

pub fn print_saved(view: &View) {
    match &view.saved {
        SavedPanel::NotLoaded => {}
        SavedPanel::Failed(notice) => eprintln!("{}", format!("⚠ {}", notice).yellow()),
        SavedPanel::Loaded(saved) if saved.is_empty() => {
            println!("{}", "No saved itineraries yet.".dimmed())
        }
        SavedPanel::Loaded(saved) => {
            println!("{}", "Saved itineraries:".yellow().bold());
            for item in saved {
                let mut line = format!("  {}  {}", "•".yellow(), item.destination);
                if let Some(days) = item.days {
                    line.push_str(&format!(" ({} days)", days));
                }
                if let Some(id) = item.id {
                    line.push_str(&format!(" {}", format!("#{}", id).dimmed()));
                }
                println!("{}", line);
            }
        }
    }
}

pub fn print_status(controller: &Controller) {
    let view = controller.view();
    let state = match view.auth {
        AuthView::Authenticated => "logged in".green().bold(),
        AuthView::Anonymous => "not logged in".yellow().bold(),
    };
    println!("{} {}", "Session:".cyan(), state);
    println!("{} {}", "API:".cyan(), controller.client().base_url());
    match (&view.map_notice, controller.map().is_some()) {
        (Some(notice), _) => println!("{} {}", "Map:".cyan(), notice.yellow()),
        (None, true) => println!("{} {}", "Map:".cyan(), "enabled"),
        (None, false) => println!("{} {}", "Map:".cyan(), "disabled (no key)".dimmed()),
    }
}

/// Show usage instructions when no command is provided
pub fn print_usage_instructions() {
    println!("{}", "Usage:".yellow().bold());
    println!("  {}", "dishanveshi login".green().bold());
    println!("    Log in; the session is remembered until you log out");
    println!();
    println!("  {}", "dishanveshi plan \"Hampi\"".green().bold());
    println!("    Generate an itinerary (add --save to keep it)");
    println!();
    println!("  {}", "dishanveshi ask \"street food near FC Road\"".green().bold());
    println!("    Ask the assistant for a recommendation");
    println!();
    println!("  {}", "dishanveshi shell".green().bold());
    println!("    Start an interactive session");
    println!();
    println!("{}", "Options:".cyan());
    println!("  --api-base <URL>   API base URL (or DISHANVESHI_API_BASE)");
    println!("  --maps-key <KEY>   Map provider key (or DISHANVESHI_MAPS_KEY)");
    println!("  --help             Show all commands");
    println!();
}

pub fn print_shell_help() {
    println!("{}", "Commands:".yellow().bold());
    println!("  /plan [destination]          generate an itinerary");
    println!("  /save                        save the current itinerary");
    println!("  /saved                       list saved itineraries");
    println!("  /places <lat> <lng> [stay]   restaurants (or hotels) nearby");
    println!("  /login [email]  /register [email]  /logout  /status  /health");
    println!("  exit | quit");
    println!("Anything else is sent to the assistant.");
}

/// Render markdown in the terminal
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = MdParser::new_ext(markdown, options);

    let mut in_code_block = false;
    let mut code_block_content = String::new();
    let mut bold = false;
    let mut output = String::new();

    for event in parser {
        match event {
            MdEvent::Start(Tag::Heading(level, ..)) => match level {
                HeadingLevel::H1 | HeadingLevel::H2 => {
                    output.push_str(&format!("\n{} ", "#".bright_cyan().bold()))
                }
                _ => output.push('\n'),
            },
            MdEvent::End(Tag::Heading(..)) => {
                output.push('\n');
            }
            MdEvent::Start(Tag::Paragraph) => {
                if !output.is_empty() && !output.ends_with('\n') {
                    output.push_str("\n\n");
                }
            }
            MdEvent::End(Tag::Paragraph) => {
                output.push('\n');
            }
            MdEvent::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
                code_block_content.clear();
                output.push('\n');
            }
            MdEvent::End(Tag::CodeBlock(_)) => {
                for line in code_block_content.lines() {
                    output.push_str(&format!("  {}\n", line.dimmed()));
                }
                in_code_block = false;
            }
            MdEvent::Start(Tag::List(_)) => {
                output.push('\n');
            }
            MdEvent::End(Tag::List(_)) => {
                output.push('\n');
            }
            MdEvent::Start(Tag::Item) => {
                output.push_str(&format!("{}  ", "•".yellow()));
            }
            MdEvent::End(Tag::Item) => {
                output.push('\n');
            }
            MdEvent::Start(Tag::Strong) => bold = true,
            MdEvent::End(Tag::Strong) => bold = false,
            MdEvent::Code(ref code) => {
                output.push_str(&format!("`{}`", code.on_bright_black().white()));
            }
            MdEvent::Text(ref text) => {
                if in_code_block {
                    code_block_content.push_str(text);
                } else if bold {
                    output.push_str(&text.bold().to_string());
                } else {
                    output.push_str(text);
                }
            }
            MdEvent::SoftBreak => output.push(' '),
            MdEvent::HardBreak => output.push('\n'),
            _ => {}
        }
    }

    output
}
