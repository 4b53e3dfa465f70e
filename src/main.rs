use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use tokio::io::{self, AsyncBufReadExt, BufReader};

use focusplus::{
    format_time, Database, FileStorage, SessionTimerStore, StaticIdentity,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let data_dir = std::env::var("FOCUSPLUS_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./focusplus-data"));
    std::fs::create_dir_all(&data_dir)?;

    let user_id = std::env::var("FOCUSPLUS_USER").unwrap_or_else(|_| "local".to_string());

    let storage = Arc::new(FileStorage::new(data_dir.join("storage"))?);
    let database = Database::new(data_dir.join("focusplus.sqlite3"))?;
    let identity = Arc::new(StaticIdentity::signed_in(user_id.clone()));

    let store = SessionTimerStore::load(storage, identity, Arc::new(database.clone())).await;

    // Print advisory notifications the way the UI would show toasts.
    let mut events = store.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!("* {}", event.message());
        }
    });

    let state = store.state().await;
    if state.is_running {
        println!(
            "Recovered session '{}' at {}{}",
            state.subject,
            format_time(state.elapsed_seconds),
            if state.is_paused { " (paused)" } else { "" }
        );
    }

    println!("commands: start <subject> | pause | resume | end | status | history | quit");

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "" => {}
            "start" => {
                store.start(rest).await;
            }
            "pause" => store.pause().await,
            "resume" => store.resume().await,
            "end" => match store.end().await {
                Ok(Some(record)) => {
                    println!("saved {} ({} min)", record.subject, record.duration_minutes)
                }
                Ok(None) => println!("no active session to save"),
                Err(err) => println!("save failed, session kept: {err:#}"),
            },
            "status" => {
                let state = store.state().await;
                if state.is_running {
                    println!(
                        "{} - {}{}",
                        state.subject,
                        format_time(state.elapsed_seconds),
                        if state.is_paused { " (paused)" } else { "" }
                    );
                } else {
                    println!("idle");
                }
            }
            "history" => {
                let sessions = database.list_sessions_for_user(&user_id).await?;
                for session in &sessions {
                    println!(
                        "{}  {}  {} min",
                        session.started_at.format("%Y-%m-%d %H:%M"),
                        session.subject,
                        session.duration_minutes
                    );
                }
                let total = database.total_minutes_for_user(&user_id).await?;
                println!("{} sessions, {} min total", sessions.len(), total);
            }
            "quit" | "exit" => match store.unload_warning().await {
                Some(warning) => {
                    println!("{warning} (use 'end' to save, or 'quit!' to leave anyway)")
                }
                None => break,
            },
            "quit!" => break,
            other => println!("unknown command: {other}"),
        }
    }

    Ok(())
}
