use chatty_tree::cli::Command;
use chatty_tree::config::{Configuration, SqliteStorage, StorageConfig, init_logger, verbose};
use chatty_tree::storage::new_storage;
use eyre::{Context, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Command::new();
    if cmd.version() {
        cmd.print_version();
        return Ok(());
    }

    let Some(action) = cmd.action() else {
        return Command::print_help();
    };

    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let config = cmd.get_config()?;
    init_logger(&config.log)?;
    Configuration::init(config.clone())?;
    verbose!("[+] Logger initialized");

    verbose!("[+] Initializing storage...");
    let storage_config = match &config.storage {
        StorageConfig::Sqlite(sqlite) => {
            let path = sqlite
                .database_path()
                .wrap_err("resolving database path")?;
            init_data_dir(&path)?;
            StorageConfig::Sqlite(SqliteStorage { path: Some(path) })
        }
    };
    let storage = new_storage(&storage_config)
        .await
        .wrap_err("initializing storage")?;
    verbose!("[+] Storage initialized");

    if let Err(err) = action.run(&storage, &config.export).await {
        log::error!("{:#}", err);
        return Err(err);
    }
    Ok(())
}

fn init_data_dir(path: &str) -> Result<()> {
    if let Some(dir) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(dir).wrap_err(format!("creating directory {}", dir.display()))?;
    }
    Ok(())
}
