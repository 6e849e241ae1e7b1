use std::path::PathBuf;

use clap::Parser;

/// ai-chat-settings: edit the AI chat step of a workflow in the terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "ai-chat-settings")]
#[command(author = "RidgetopAI")]
#[command(version)]
#[command(about = "Terminal editor for AI chat step settings", long_about = None)]
pub struct Cli {
    /// Initial configuration as JSON. Read from stdin when omitted.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Where the committed configuration is written. Stdout when omitted.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Advanced edit: also offer the AI response switch
    #[arg(long, default_value_t = false)]
    pub advanced: bool,

    /// JSON array of extra interpolation variables ({key, label, icon})
    #[arg(long, value_name = "FILE")]
    pub picker_menu: Option<PathBuf>,

    /// Directory holding settings.toml and theme.toml
    #[arg(long, value_name = "DIR", env = "AI_CHAT_SETTINGS_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides settings.toml.
    #[arg(long, env = "AI_CHAT_SETTINGS_LOG")]
    pub log_level: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
