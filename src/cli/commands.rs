use std::io::{Read, Write};

use tracing::info;

use crate::cli::args::{ConfigAction, ConfigArgs, ExecArgs, InitArgs, OutputFormat};
use crate::cli::output::{render_languages, render_outcome, resolved_language};
use crate::config::loader::get_config_path;
use crate::config::types::RunboxConfig;
use crate::error::{Result, RunboxError};
use crate::languages::LanguageRegistry;
use crate::orchestrator::Orchestrator;

/// Run one job and exit with its exit code
pub async fn exec(args: ExecArgs, config: RunboxConfig, format: OutputFormat) -> Result<()> {
    let code = read_source(args.file.as_deref())?;
    info!(language = %args.language, caller = %args.caller, bytes = code.len(), "Executing snippet");

    let orchestrator = Orchestrator::from_config(&config)?;
    let outcome = orchestrator.execute(&args.caller, &args.language, &code).await;

    let language = resolved_language(orchestrator.registry(), &args.language);
    let rendered = render_outcome(language, &outcome, format);
    print!("{}", rendered.stdout);
    eprint!("{}", rendered.stderr);
    std::io::stdout().flush()?;

    if rendered.exit_code != 0 {
        std::process::exit(rendered.exit_code);
    }
    Ok(())
}

/// List the languages the current configuration supports
pub async fn languages(config: RunboxConfig, format: OutputFormat) -> Result<()> {
    let registry = LanguageRegistry::with_overrides(config.languages)?;
    print!("{}", render_languages(&registry, format));
    Ok(())
}

pub async fn init(args: InitArgs) -> Result<()> {
    let config_path = get_config_path();

    if config_path.exists() && !args.force {
        println!("Configuration already exists at: {}", config_path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    // Create parent directories if needed
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Write default configuration
    let default_config = RunboxConfig::default();
    let toml_str =
        toml::to_string_pretty(&default_config).map_err(|e| RunboxError::Config(e.to_string()))?;

    std::fs::write(&config_path, toml_str)?;

    println!("Created configuration at: {}", config_path.display());
    println!("\nQuick start:");
    println!("  # Run a file");
    println!("  runbox exec python hello.py");
    println!();
    println!("  # Or pipe code in");
    println!("  echo 'puts 1 + 1' | runbox exec ruby");
    println!();
    println!("  # See what is available");
    println!("  runbox languages");

    Ok(())
}

pub async fn config(args: ConfigArgs, config: RunboxConfig) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let toml_str =
                toml::to_string_pretty(&config).map_err(|e| RunboxError::Config(e.to_string()))?;
            println!("{}", toml_str);
        }
        ConfigAction::Path => {
            println!("{}", get_config_path().display());
        }
    }
    Ok(())
}

fn read_source(file: Option<&std::path::Path>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut code = String::new();
            std::io::stdin().read_to_string(&mut code)?;
            Ok(code)
        }
    }
}
