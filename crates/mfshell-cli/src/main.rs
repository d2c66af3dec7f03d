//! `mfshell-demo` – walks one page through the shell lifecycle.
//!
//! 1. Loads `~/.mfshell/config.toml` (defaults plus `MFSHELL_*` overrides
//!    when absent) and installs the tracing subscriber.
//! 2. Registers two `chat` providers, mounts the first uncontrolled at
//!    `#left` and the second controlled at `#right`.
//! 3. Emits a message on the global bus and reports which chat heard it.
//! 4. Prints the registry as JSON, then unmounts both chats.

mod chat;

use std::process::ExitCode;

use colored::Colorize;
use mfshell_runtime::{
    InstantiateOptions, MountNode, ServiceId, Shell, ShellConfig, ShellError, ShellEvent, config,
    init_tracing,
};
use tracing::warn;

use crate::chat::{ChatService, TOPIC};

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = match config::load() {
        Ok(Some(cfg)) => cfg,
        Ok(None) => ShellConfig::from_env(),
        Err(e) => {
            eprintln!("{}: {e}", "Config error".red());
            ShellConfig::from_env()
        }
    };
    let _guard = init_tracing("mfshell-demo", cfg.log_format);

    match run(&cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "Demo failed".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cfg: &ShellConfig) -> Result<(), ShellError> {
    let shell: Shell = Shell::new(cfg);
    let chat_id = ServiceId::from("chat");
    let left = MountNode::from("#left");
    let right = MountNode::from("#right");

    // Each chat keeps the scope it registered through so its own `on`
    // calls follow whatever bus it gets mounted with.
    let scope_a = shell.provider("chat-a");
    let chat_a = ChatService::new(scope_a.clone());
    scope_a.register_instance(chat_a.clone());
    let scope_b = shell.provider("chat-b");
    let chat_b = ChatService::new(scope_b.clone());
    scope_b.register_instance(chat_b.clone());

    println!("{}", "mfshell demo".bold());
    shell
        .instantiate_at(&chat_id, left.clone(), InstantiateOptions::default())
        .await?;
    println!("  {} chat#0 at {left} (shared bus)", "mounted".green());
    let controls = shell
        .instantiate_at(&chat_id, right.clone(), InstantiateOptions::controlled())
        .await?;
    println!("  {} chat#1 at {right} (private bus)", "mounted".green());

    shell.emit_on_global_bus(ShellEvent::message(TOPIC, serde_json::json!("hello, page")));
    controls
        .events
        .emit(ShellEvent::message(TOPIC, serde_json::json!("hello, chat#1")));

    println!("  chat#0 heard {:?}", chat_a.inbox());
    println!("  chat#1 heard {:?}", chat_b.inbox());

    match serde_json::to_string_pretty(&shell.registry().snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => warn!(error = %e, "could not render registry snapshot"),
    }

    shell.unmount_from(&chat_id, &left).await?;
    shell.unmount_from(&chat_id, &right).await?;
    println!(
        "  {} both chats ({} available)",
        "unmounted".yellow(),
        shell.registry().available_count(&chat_id)
    );
    Ok(())
}
