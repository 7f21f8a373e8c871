// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::config::BackdropConfig;
use crate::theme::Theme;

#[derive(Parser, Debug, Clone)]
#[command(name = "tree-backdrop")]
#[command(about = "Procedural ambient tree backdrop", long_about = None)]
pub struct Cli {
    /// JSON config file; missing sections use defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Initial theme (anything but "dark" is light)
    #[arg(long)]
    pub theme: Option<String>,

    /// Seed for tree and leaf placement
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of falling leaves
    #[arg(long)]
    pub leaves: Option<usize>,

    /// Disable drag-to-rotate
    #[arg(long = "no-drag", default_value = "false")]
    pub no_drag: bool,

    /// Render this many frames offscreen at 60 Hz and exit
    #[arg(long, value_name = "FRAMES")]
    pub headless: Option<u64>,

    /// Print the effective config as JSON and exit
    #[arg(long = "print-config", default_value = "false")]
    pub print_config: bool,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded config
    pub fn apply(&self, config: &mut BackdropConfig) {
        if let Some(theme) = &self.theme {
            config.theme = Theme::parse(theme);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(leaves) = self.leaves {
            config.leaves.count = leaves;
        }
        if self.no_drag {
            config.interaction.enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_config_values() {
        let cli = Cli::parse_from(["tree-backdrop", "--theme", "dark", "--seed", "3", "--leaves", "10", "--no-drag"]);
        let mut config = BackdropConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.leaves.count, 10);
        assert!(!config.interaction.enabled);
    }

    #[test]
    fn no_flags_keep_config() {
        let cli = Cli::parse_from(["tree-backdrop"]);
        let mut config = BackdropConfig::default();
        cli.apply(&mut config);
        assert_eq!(config, BackdropConfig::default());
        assert_eq!(cli.headless, None);
    }

    #[test]
    fn headless_takes_frame_count() {
        let cli = Cli::parse_from(["tree-backdrop", "--headless", "120"]);
        assert_eq!(cli.headless, Some(120));
    }
}
