use clap::Subcommand;
use sessiontrack_core::{format_duration, Session};

use crate::store::JsonSessionStore;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Add a session to the local store
    Add {
        /// Session ID
        id: String,
        /// Session title
        #[arg(long)]
        title: Option<String>,
        /// Existing duration in seconds
        #[arg(long, default_value = "0")]
        duration: u64,
    },
    /// List stored sessions
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = JsonSessionStore::open_default()?;
    match action {
        SessionAction::Add {
            id,
            title,
            duration,
        } => {
            if store.get(&id)?.is_some() {
                return Err(format!("session already exists: {id}").into());
            }
            let mut session = Session::new(id).with_duration(duration);
            session.title = title;
            store.put(&session)?;
            println!("Session created: {}", session.id);
        }
        SessionAction::List { json } => {
            let sessions = store.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else {
                for s in sessions {
                    println!(
                        "{}\t{}\t{}\t{}",
                        s.id,
                        s.status,
                        format_duration(s.duration),
                        s.title.as_deref().unwrap_or("-")
                    );
                }
            }
        }
    }
    Ok(())
}
