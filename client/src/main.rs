use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use guestbook_client::config::{DEFAULT_API_URL, DEFAULT_ORIGIN};
use guestbook_client::render::render;
use guestbook_client::view::DELETE_PROMPT;
use guestbook_client::{ApiClient, ClientConfig, Guestbook, Submit};

/// Terminal guestbook: sign, edit and delete entries on a guestbook server.
#[derive(Debug, Parser)]
#[command(name = "guestbook", version)]
struct Args {
    /// Entry collection URL, absolute or relative to --origin
    #[arg(long, env = "GUESTBOOK_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Server origin used to resolve a relative --api-url
    #[arg(long, env = "GUESTBOOK_ORIGIN", default_value = DEFAULT_ORIGIN)]
    origin: String,
}

const HELP: &str = "\
commands:
  name <text>      set your name
  message <text>   set your message
  submit           sign the guestbook (or save the edit)
  edit <n>         edit entry n
  cancel           stop editing
  delete <n>       delete entry n
  reload           fetch entries again
  help             show this text
  quit             exit";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Name(String),
    Message(String),
    Submit,
    Edit(usize),
    Cancel,
    Delete(usize),
    Reload,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match word {
            "name" => Some(Command::Name(rest.to_string())),
            "message" | "msg" => Some(Command::Message(rest.to_string())),
            "submit" | "sign" | "save" => Some(Command::Submit),
            "edit" => rest.parse().ok().map(Command::Edit),
            "cancel" => Some(Command::Cancel),
            "delete" | "rm" => rest.parse().ok().map(Command::Delete),
            "reload" | "r" => Some(Command::Reload),
            "help" | "?" => Some(Command::Help),
            "quit" | "exit" | "q" => Some(Command::Quit),
            _ => None,
        }
    }
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, question: &str) -> anyhow::Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(question.as_bytes()).await?;
    stdout.flush().await?;
    Ok(lines.next_line().await?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guestbook_client=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ClientConfig::new(&args.api_url, &args.origin)?;
    let guestbook = Guestbook::init(ApiClient::new(config)).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", render(&guestbook.snapshot()));
    println!("(type 'help' for commands)");

    while let Some(line) = prompt(&mut lines, "> ").await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = Command::parse(&line) else {
            println!("unknown command, type 'help'");
            continue;
        };

        match command {
            Command::Name(name) => guestbook.set_name(name),
            Command::Message(message) => guestbook.set_message(message),
            Command::Submit => {
                if guestbook.submit().await == Submit::Incomplete {
                    println!("Please fill out both your name and a message.");
                    continue;
                }
            }
            Command::Edit(n) => match nth_entry(&guestbook, n) {
                Some(entry) => guestbook.start_edit(&entry),
                None => {
                    println!("no entry {}", n);
                    continue;
                }
            },
            Command::Cancel => guestbook.cancel_edit(),
            Command::Delete(n) => {
                let Some(entry) = nth_entry(&guestbook, n) else {
                    println!("no entry {}", n);
                    continue;
                };
                let answer = prompt(&mut lines, &format!("{} [y/N] ", DELETE_PROMPT)).await?;
                let confirmed = matches!(answer.as_deref().map(str::trim), Some("y" | "Y" | "yes"));
                guestbook.delete(entry.id, &|_: &str| confirmed).await;
            }
            Command::Reload => {
                guestbook.load_entries().await;
            }
            Command::Help => {
                println!("{}", HELP);
                continue;
            }
            Command::Quit => break,
        }

        println!("{}", render(&guestbook.snapshot()));
    }

    Ok(())
}

/// Entries are shown numbered from 1.
fn nth_entry(guestbook: &Guestbook, n: usize) -> Option<guestbook_types::Entry> {
    let state = guestbook.snapshot();
    n.checked_sub(1).and_then(|i| state.entries.get(i).cloned())
}
