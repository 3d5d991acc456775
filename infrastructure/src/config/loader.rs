//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "signal-council";
const PROJECT_FILES: [&str; 2] = ["council.toml", ".council.toml"];
const ENV_PREFIX: &str = "COUNCIL_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `COUNCIL_*` environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./council.toml` or `./.council.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/signal-council/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path, Self::project_config_path().as_deref())
            .extract()
            .map_err(Box::new)
    }

    fn figment(config_path: Option<&PathBuf>, project_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = project_path {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/signal-council/config.toml if set,
    /// otherwise the platform config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .filter(|p| p.is_absolute())
            .or_else(dirs::config_dir)
            .map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");

        println!("  [ENV  ] {}* (`__` separates sections)", ENV_PREFIX);

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISS " };
            println!("  [{}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./council.toml or ./.council.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.council.max_rounds, 3);
        assert!(config.workers.is_empty());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("signal-council"));
    }

    #[test]
    fn test_explicit_file_overrides_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("council.toml");
        let explicit = dir.path().join("explicit.toml");

        let mut f = std::fs::File::create(&project).unwrap();
        writeln!(f, "[council]\nmax_rounds = 5\nconfidence_threshold = 0.7").unwrap();
        let mut f = std::fs::File::create(&explicit).unwrap();
        writeln!(f, "[council]\nmax_rounds = 1").unwrap();

        let config: FileConfig = ConfigLoader::figment(Some(&explicit), Some(&project))
            .extract()
            .unwrap();

        assert_eq!(config.council.max_rounds, 1);
        assert!((config.council.confidence_threshold - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_worker_array_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("council.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "[[workers]]\ndomain = \"logs\"\ntools = [\"loki_query\"]\n\n[[workers]]\ndomain = \"sql\""
        )
        .unwrap();

        let config: FileConfig = ConfigLoader::figment(Some(&path), None).extract().unwrap();
        assert_eq!(config.workers.len(), 2);
        assert_eq!(config.workers[0].tools[0].name(), "loki_query");
    }
}
