use baler::config::Config;
use baler::core::path::config_file;
use baler::core::{BalerError, BalerResult};

pub fn show() -> BalerResult<()> {
    let config = Config::load()?;
    let content = serde_yaml::to_string(&config)
        .map_err(|e| BalerError::Config(format!("Failed to serialize config: {}", e)))?;

    println!("# {}", config_file()?.display());
    print!("{}", content);
    Ok(())
}

pub fn set_gem_dir(path: String) -> BalerResult<()> {
    let mut config = Config::load()?;
    config.gem_install_dir = Some(path);
    config.save()?;

    println!("✓ Dependency install directory set to: {}", config.gem_install_dir()?.display());
    Ok(())
}
