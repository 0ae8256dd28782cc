use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::{Parser, Subcommand};

use bolso_chat::{IncomingMessage, MemoryStore, MessageHandler};
use bolso_core::intent::classify;

#[derive(Parser, Debug)]
#[command(name = "bolso", version, about = "Bolso — assistente financeiro de conversa")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat session against an in-memory store
    Chat {
        /// Display name of the demo user
        #[arg(long, default_value = "você")]
        name: String,
    },

    /// Classify one message and print the typed intent (debugging aid)
    Classify {
        /// Message text
        text: Vec<String>,

        /// Print the intent as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Chat { name } => run_chat(&name),
        Command::Classify { text, json } => run_classify(&text.join(" "), json),
    }
}

fn run_chat(name: &str) -> Result<()> {
    println!("Bolso — digite mensagens como no chat (q para sair)\n");
    println!("Exemplos: /saldo 1000 · gastei 50 no mercado · /ajuda\n");

    let mut handler = MessageHandler::new(MemoryStore::default());
    let stdin = io::stdin();
    let mut message_id: u64 = 0;

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "q" || line == "sair" {
            break;
        }

        message_id += 1;
        let msg = IncomingMessage {
            sender: "cli@local".to_string(),
            message_id: message_id.to_string(),
            push_name: Some(name.to_string()),
            text: line.to_string(),
        };

        for reply in handler.handle(&msg, chrono::Utc::now()) {
            println!("\n{reply}\n");
        }
    }

    Ok(())
}

fn run_classify(text: &str, json: bool) -> Result<()> {
    let intent = classify(text);
    if json {
        println!("{}", serde_json::to_string_pretty(&intent)?);
    } else {
        println!("{intent:#?}");
    }
    Ok(())
}
