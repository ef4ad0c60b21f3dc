//! Interactive chat application for conversing with models hosted on Groq.
//!
//! This binary provides a streaming REPL interface over Groq's
//! OpenAI-compatible chat completions API.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! groqchat
//!
//! # Specify a model
//! groqchat --model llama-3.1-8b-instant
//!
//! # Disable colors (useful for piping output)
//! groqchat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/clear` - Clear conversation history
//! - `/model <id>` - Change the model
//! - `/models` - List available models
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use groqchat::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, help_text,
    parse_command,
};
use groqchat::{Groq, ModelDescriptor, registry};

/// Main entry point for the groqchat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("groqchat [OPTIONS]");
    let mut config = ChatConfig::try_from(args)?;

    let client = Groq::with_options(None, config.base_url.clone(), None)?;
    let mut session = ChatSession::with_model(client, config.model);
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    println!("Groq Chat");
    print_model_card(session.active_model());
    println!("Type /help for commands, /quit to exit\n");

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            session.clear();
                            renderer.print_info("Conversation cleared.");
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {line}");
                            }
                        }
                        ChatCommand::Model(id) => match session.select_model(&id) {
                            Ok(true) => {
                                config = config.with_model(session.model());
                                renderer.print_info(&format!(
                                    "Model changed to: {}. Conversation cleared.",
                                    session.active_model().display_name
                                ));
                                print_model_card(session.active_model());
                            }
                            Ok(false) => {
                                renderer.print_info(&format!("Already using {id}."));
                            }
                            Err(err) => {
                                renderer.print_error(&err.to_string());
                                renderer.print_hint("Use /models to list available models.");
                            }
                        },
                        ChatCommand::Models => {
                            print_models(session.active_model());
                        }
                        ChatCommand::MaxTokens(value) => {
                            config = config.with_max_tokens(value);
                            renderer
                                .print_info(&format!("max_tokens set to {}", config.max_tokens));
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::ShowConfig => {
                            print_config(&config);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to API
                if let Err(e) = session
                    .submit(line, config.max_tokens, &mut renderer)
                    .await
                {
                    renderer.print_error(&e.to_string());
                    if e.is_service() {
                        renderer.print_hint(
                            "Please check your GROQ_API_KEY and network connection, \
                             then try again.",
                        );
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {err}"));
                break;
            }
        }
    }

    Ok(())
}

fn print_model_card(model: &ModelDescriptor) {
    println!("    {} by {}", model.display_name, model.developer);
    println!("    {}", model.description);
    println!("    Max tokens: {}", model.max_tokens);
}

fn print_models(active: &ModelDescriptor) {
    println!("    Available models:");
    for model in registry() {
        let marker = if model == active { "*" } else { " " };
        println!("    {marker} {:<26} {}", model.id, model.picker_label());
    }
}

fn print_stats(session: &ChatSession<Groq>) {
    println!("    Session Statistics:");
    for line in session.stats().to_string().lines() {
        println!("      {line}");
    }
}

fn print_config(config: &ChatConfig) {
    println!("    Current Configuration:");
    println!("      Model: {}", config.model);
    println!("      Max tokens: {}", config.max_tokens);
    println!("      Color: {}", if config.use_color { "on" } else { "off" });
    println!(
        "      Base URL: {}",
        config.base_url.as_deref().unwrap_or("(default)")
    );
}
