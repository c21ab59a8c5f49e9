use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use tracing::debug;
use vstore_provision::{
    BackendConfig, BootstrapOutcome, RepositoryMode, StoreProvider, VersionStoreConfig,
};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init(args) => cmd_init(args),
        Command::Config(args) => cmd_config(args),
    }
}

fn load_config(path: Option<&Path>, kind: Option<String>) -> anyhow::Result<VersionStoreConfig> {
    let mut config = match path {
        Some(path) => VersionStoreConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => VersionStoreConfig::default(),
    };
    if let Some(kind) = kind {
        config.backend.kind = Some(kind);
    }
    debug!(?config, "effective configuration");
    Ok(config)
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref(), args.kind)?;
    if let Some(branch) = args.branch {
        config.default_branch = branch;
    }

    let provider = StoreProvider::new(config);
    let store = provider
        .get()
        .with_context(|| format!("provisioning {} version store", provider.config().kind_label()))?;

    match provider.bootstrap_outcome() {
        Some(BootstrapOutcome::Created(hash)) => println!(
            "{} Created branch {} at {}",
            "✓".green().bold(),
            provider.config().default_branch.yellow(),
            hash.short_hex().dimmed()
        ),
        _ => println!(
            "{} {} version store ready",
            "✓".green().bold(),
            store.backend().bold()
        ),
    }

    for reference in store.named_refs()? {
        let reference = reference?;
        println!(
            "  {} {}",
            reference.hash.short_hex().dimmed(),
            reference.value.canonical_name().yellow()
        );
    }

    if let Some(note) = persistence_note(provider.config()) {
        println!("{} {}", "!".yellow().bold(), note);
    }
    Ok(())
}

/// Why nothing `init` created outlives the process, if that is the case.
fn persistence_note(config: &VersionStoreConfig) -> Option<&'static str> {
    match config.backend_config().ok()? {
        BackendConfig::RemoteTiered(_) => Some(
            "remote-tiered ran against the bundled in-process table engine; nothing was persisted",
        ),
        BackendConfig::LocalGraph(local) => match RepositoryMode::from_settings(&local).ok()? {
            RepositoryMode::Ephemeral => {
                Some("local-graph ran with an in-memory repository; nothing was persisted")
            }
            RepositoryMode::OnDisk(_) => None,
        },
        BackendConfig::InMemory => Some("in-memory store; nothing was persisted"),
    }
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref(), args.kind)?;
    if args.dump {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    match config.backend_config()? {
        BackendConfig::RemoteTiered(remote) => {
            println!("Backend: {}", "remote-tiered".cyan().bold());
            println!("  Region: {}", remote.region);
            println!(
                "  Endpoint: {}",
                remote.endpoint.as_deref().unwrap_or("default")
            );
            println!("  Table prefix: {:?}", remote.table_prefix);
            println!("  Initialize tables: {}", remote.initialize_database);
        }
        BackendConfig::LocalGraph(local) => {
            println!("Backend: {}", "local-graph".cyan().bold());
            println!("  Mode: {}", local.mode);
            if let Some(dir) = &local.directory {
                println!("  Directory: {}", dir.display());
            }
        }
        BackendConfig::InMemory => {
            println!("Backend: {}", "in-memory".cyan().bold());
        }
    }
    println!("Default branch: {}", config.default_branch.yellow());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_config_applies_kind_override() {
        let config = load_config(None, Some("local-graph".into())).unwrap();
        assert_eq!(config.backend.kind.as_deref(), Some("local-graph"));
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vstore.toml");
        std::fs::write(&path, "default_branch = \"trunk\"\n").unwrap();
        let config = load_config(Some(&path), None).unwrap();
        assert_eq!(config.default_branch, "trunk");
    }

    #[test]
    fn init_in_memory_succeeds() {
        cmd_init(InitArgs {
            config: None,
            kind: Some("in-memory".into()),
            branch: None,
        })
        .unwrap();
    }

    #[test]
    fn remote_tiered_init_says_nothing_persisted() {
        let config = load_config(None, Some("remote-tiered".into())).unwrap();
        let note = persistence_note(&config).unwrap();
        assert!(note.contains("in-process table engine"));
        assert!(note.contains("nothing was persisted"));
    }

    #[test]
    fn disk_repository_needs_no_note() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = load_config(None, Some("local-graph".into())).unwrap();
        assert!(persistence_note(&config).is_some());

        config.local.mode = "disk".into();
        config.local.directory = Some(dir.path().to_path_buf());
        assert_eq!(persistence_note(&config), None);
    }

    #[test]
    fn init_without_kind_fails() {
        let err = cmd_init(InitArgs {
            config: None,
            kind: None,
            branch: None,
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("version-store type is not set"));
    }

    #[test]
    fn config_rejects_unknown_kind() {
        assert!(cmd_config(ConfigArgs {
            config: None,
            kind: Some("tape".into()),
            dump: false,
        })
        .is_err());
    }
}
