//! Command-line arguments

use clap::{Parser, Subcommand};
use datadash_core::views::{SortKey, TypeFilter};
use std::path::PathBuf;

/// Terminal client for the dataset dashboard
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "dashboard_cli")]
#[command(version)]
#[command(about = "List, inspect, upload and delete datasets on a dashboard backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Backend base URL (overrides config file and DATADASH_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Sign in with this email before running the command
    #[arg(long, global = true, env = "DASHBOARD_EMAIL")]
    pub email: Option<String>,

    #[arg(long, global = true, env = "DASHBOARD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List your datasets
    List(ListArgs),

    /// Show columns and a data preview for one dataset
    Show(ShowArgs),

    /// Upload a CSV or Excel file
    Upload(UploadArgs),

    /// Delete a dataset
    Delete(DeleteArgs),

    /// Print a download link for a dataset
    Download(IdArgs),

    /// Sign in and print the signed-in user
    Login {
        /// Keep the session beyond the browser default
        #[arg(long)]
        remember_me: bool,
    },

    /// Create an account
    Register(RegisterArgs),

    /// End the current session
    Logout,

    /// Show your profile and preferences
    Profile,
}

#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ListArgs {
    /// Case-insensitive substring of the dataset name
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// all, csv or excel
    #[arg(short = 't', long = "type")]
    pub file_type: Option<TypeFilter>,

    /// recent, oldest, name, size or rows
    #[arg(long)]
    pub sort: Option<SortKey>,

    /// Ignore the cached list and refetch
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ShowArgs {
    pub id: i64,

    /// Number of preview rows
    #[arg(short, long)]
    pub rows: Option<usize>,
}

#[derive(Parser, Debug, Clone, PartialEq)]
pub struct UploadArgs {
    #[arg(value_name = "FILE")]
    pub path: PathBuf,
}

#[derive(Parser, Debug, Clone, PartialEq)]
pub struct DeleteArgs {
    pub id: i64,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser, Debug, Clone, PartialEq)]
pub struct IdArgs {
    pub id: i64,
}

#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,

    /// Repeat the password
    #[arg(long, env = "DASHBOARD_CONFIRM_PASSWORD", hide_env_values = true)]
    pub confirm_password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_with_filters() {
        let cli = Cli::try_parse_from([
            "dashboard_cli",
            "list",
            "--search",
            "sales",
            "--type",
            "excel",
            "--sort",
            "size",
        ])
        .unwrap();
        match cli.command {
            Command::List(args) => {
                assert_eq!(args.search, "sales");
                assert_eq!(args.file_type, Some(TypeFilter::Excel));
                assert_eq!(args.sort, Some(SortKey::Size));
                assert!(!args.refresh);
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_parse_delete_with_global_url() {
        let cli = Cli::try_parse_from([
            "dashboard_cli",
            "delete",
            "42",
            "--yes",
            "--api-url",
            "http://dash.local/api",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://dash.local/api"));
        assert_eq!(
            cli.command,
            Command::Delete(DeleteArgs { id: 42, yes: true })
        );
    }

    #[test]
    fn test_rejects_unknown_sort() {
        assert!(Cli::try_parse_from(["dashboard_cli", "list", "--sort", "color"]).is_err());
    }
}
