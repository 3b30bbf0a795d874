use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;

pub mod models;
pub use models::*;

static DOTENV_LOADED: OnceCell<()> = OnceCell::new();

/// Loads .env exactly once, regardless of how many crates call into here.
pub fn ensure_dotenv_loaded() {
    DOTENV_LOADED.get_or_init(|| {
        let _ = dotenv::dotenv();
    });
}

/// Loads the application configuration.
///
/// Sources, in increasing priority:
/// 1. `config/default.{toml,yaml,json}` at the workspace root (optional)
/// 2. `config/{RUN_ENV}.{toml,yaml,json}` (optional, RUN_ENV defaults to "debug")
/// 3. Environment variables prefixed with `PBK`, `__` as separator
///    (e.g. `PBK_SERVER__PORT=8080`, `PBK_DATABASE__URL=sqlite://panelbook.db`)
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "PBK".to_string());

    let workspace_root = env::var("CARGO_MANIFEST_DIR")
        .map(|dir| {
            let manifest_dir = PathBuf::from(dir);
            manifest_dir
                .ancestors()
                .nth(2) // go from crates/panelbook_config to workspace root
                .map(|p| p.to_path_buf())
                .unwrap_or(manifest_dir)
        })
        .unwrap_or_else(|_| PathBuf::from("."));

    let default_path = workspace_root.join("config/default");
    let env_path = workspace_root.join(format!("config/{}", run_env));

    let builder = Config::builder()
        .add_source(File::with_name(default_path.to_string_lossy().as_ref()).required(false))
        .add_source(File::with_name(env_path.to_string_lossy().as_ref()).required(false))
        .add_source(Environment::with_prefix(&prefix).separator("__"));

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    Ok(raw_config)
}
