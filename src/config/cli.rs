use crate::config::AppConfig;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "numbersvc")]
#[command(about = "Paginated phone number lookup service")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the listening port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the SQLite database path
    #[arg(long)]
    pub database: Option<String>,

    /// Append phone numbers from this file (one per line) before serving
    #[arg(long)]
    pub seed: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Command-line values win over the configuration file.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(database) = &self.database {
            config.database.path = database.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_file_values() {
        let args = CliArgs::parse_from(["numbersvc", "--port", "9999", "--database", "other.db"]);
        let mut config = AppConfig::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.database.path, "other.db");
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let args = CliArgs::parse_from(["numbersvc", "-c", "numbersvc.toml", "-v"]);
        let mut config = AppConfig::default();
        args.apply_overrides(&mut config);

        assert_eq!(args.config.as_deref(), Some("numbersvc.toml"));
        assert!(args.verbose);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, "sample.db");
    }
}
