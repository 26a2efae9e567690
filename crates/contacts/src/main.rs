//! `contacts` - CLI and web server for the contact manager
//!
//! This binary serves the web application and manages the contact store
//! from the terminal.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use contacts::cli::{output, Cli, Command, ConfigCommand, OutputFormat};
use contacts::config::StoreBackend;
use contacts::{init_logging, store, web, Config, ContactStore, Error};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Validation reports on a config that may not load
    if let Command::Config(ConfigCommand::Validate { file }) = &cli.command {
        let path = file
            .clone()
            .or_else(|| cli.config.clone())
            .unwrap_or_else(Config::default_config_path);
        return handle_validate(&path);
    }

    // Load configuration
    let mut config = Config::load_from(cli.config.clone())
        .context("could not load configuration")?;
    debug!(?config, "Configuration loaded");

    match cli.command {
        Command::Serve(cmd) => {
            if let Some(listen) = cmd.listen {
                config.server.listen = listen;
                config.validate()?;
            }
            let store = store::open(&config)?;
            web::serve(&config, store).await?;
        }
        Command::List(cmd) => {
            let store = store::open(&config)?;
            handle_list(store.as_ref(), cmd.query.as_deref(), cmd.format).await?;
        }
        Command::Show(cmd) => {
            let store = store::open(&config)?;
            let contact = store
                .get(cmd.id)
                .await?
                .ok_or_else(|| Error::not_found(cmd.id))?;
            match cmd.format {
                OutputFormat::Plain => println!("{}", output::contact_details(&contact)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&contact)?),
            }
        }
        Command::New => {
            let store = store::open(&config)?;
            let contact = store.create().await?;
            info!(id = %contact.id, "Created contact");
            println!("{}", contact.id);
        }
        Command::Delete(cmd) => {
            if cmd.yes {
                let store = store::open(&config)?;
                store.delete(cmd.id).await?;
                info!(id = %cmd.id, "Deleted contact");
                println!("Deleted contact {}.", cmd.id);
            } else {
                println!("This will permanently delete contact {}.", cmd.id);
                println!("Use --yes to confirm.");
            }
        }
        Command::Status(cmd) => {
            let store = store::open(&config)?;
            handle_status(&config, store.as_ref(), cmd.json).await?;
        }
        Command::Config(cmd) => handle_config(&config, cmd)?,
    }

    Ok(())
}

async fn handle_list(
    store: &dyn ContactStore,
    query: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let contacts = store.search(query).await?;
    match format {
        OutputFormat::Plain => {
            if contacts.is_empty() {
                println!("No contacts");
            }
            for contact in &contacts {
                println!("{}", output::contact_line(contact));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&contacts)?),
    }
    Ok(())
}

async fn handle_status(
    config: &Config,
    store: &dyn ContactStore,
    json: bool,
) -> anyhow::Result<()> {
    let stats = store.stats().await?;
    let database = match config.storage.backend {
        StoreBackend::Sqlite => Some(config.database_path()),
        StoreBackend::Memory => None,
    };

    if json {
        let status = serde_json::json!({
            "backend": config.storage.backend,
            "database_path": database,
            "contacts": stats.total,
            "favorites": stats.favorites,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("contacts status");
        println!("---------------");
        println!("Backend:       {}", config.storage.backend);
        if let Some(path) = &database {
            println!("Database:      {}", path.display());
        }
        println!("Contacts:      {}", stats.total);
        println!("Favorites:     {}", stats.favorites);
    }
    Ok(())
}

fn handle_validate(path: &std::path::Path) -> anyhow::Result<()> {
    println!("Validating configuration: {}", path.display());
    match Config::load_from(Some(path.to_path_buf())) {
        Ok(_) => println!("Configuration is valid."),
        Err(e) => println!("Configuration error: {e}"),
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Listen:             {}", config.server.listen);
                println!("  Title:              {}", config.server.title);
                println!();
                println!("[Storage]");
                println!("  Backend:            {}", config.storage.backend);
                println!("  Database path:      {}", config.database_path().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            handle_validate(&file.unwrap_or_else(Config::default_config_path))?;
        }
    }
    Ok(())
}
