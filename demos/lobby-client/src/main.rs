//! Line-oriented lobby client.
//!
//! ```text
//! lobby-client [URL]
//! > join Alice
//! > ready
//! > list
//! > quit
//! ```

use huddle::DEFAULT_PORT;
use huddle_client::{ClientState, LobbyClient, Update};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Join(String),
    Ready,
    List,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match word {
        "join" => Some(Command::Join(rest.trim().to_string())),
        "ready" => Some(Command::Ready),
        "list" => Some(Command::List),
        "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

fn print_roster(state: &ClientState) {
    println!("-- lobby ({}) --", state.roster().len());
    for p in state.roster() {
        let me = if Some(p.id) == state.id() { " (you)" } else { "" };
        let ready = if p.ready { "ready" } else { "not ready" };
        println!("  #{} {} [{}] {}{}", p.id, p.name, p.color, ready, me);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| format!("ws://127.0.0.1:{DEFAULT_PORT}"));
    let mut client = LobbyClient::connect(&url).await?;
    println!("connected to {url}; commands: join <name>, ready, list, quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            update = client.next_update() => match update? {
                Some(Update::Registered(id)) => println!("joined as #{id}"),
                Some(Update::Roster) => print_roster(client.state()),
                Some(Update::Ignored) => {}
                None => {
                    println!("disconnected");
                    break;
                }
            },
            line = lines.next_line() => {
                let Some(line) = line? else {
                    client.close().await?;
                    break;
                };
                let result = match parse_command(&line) {
                    Some(Command::Join(name)) => client.register(&name).await,
                    Some(Command::Ready) => client.toggle_ready().await,
                    Some(Command::List) => client.request_roster().await,
                    Some(Command::Quit) => {
                        client.close().await?;
                        break;
                    }
                    None => {
                        println!("unknown command: {}", line.trim());
                        Ok(())
                    }
                };
                if let Err(e) = result {
                    println!("error: {e}");
                }
            }
        }
    }

    Ok(())
}
