use crate::common::CommonParams;
use crate::deploy::{DeployArgs, handle_deploy_command};
use crate::pr_checklist::{PrChecklistArgs, handle_pr_checklist_command};
use crate::{log_debug, ui};
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, crate_version};

const LOG_FILE: &str = "deploy-complexity-debug.log";

/// CLI structure defining the available commands and global arguments
#[derive(Parser)]
#[command(
    author,
    version = crate_version!(),
    about = "deploy-complexity: summarize deploys and annotate pull requests with checklists",
    long_about = "Summarizes what a deploy ships (pull requests, migrations, dependency changes) and adds review checklists to pull requests based on the files they change.",
    disable_version_flag = true,
    styles = get_styles(),
)]
pub struct Cli {
    /// Subcommands available for the CLI
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log debug messages to a file
    #[arg(
        short = 'l',
        long = "log",
        global = true,
        help = "Log debug messages to a file"
    )]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(
        long = "log-file",
        global = true,
        help = "Specify a custom log file path"
    )]
    pub log_file: Option<String>,

    /// Suppress non-essential output (spinners, notices)
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress non-essential output"
    )]
    pub quiet: bool,

    /// Display the version
    #[arg(
        short = 'v',
        long = "version",
        global = true,
        help = "Display the version"
    )]
    pub version: bool,
}

/// Enumeration of available subcommands
#[derive(Subcommand)]
#[command(subcommand_negates_reqs = true)]
#[command(subcommand_precedence_over_arg = true)]
pub enum Commands {
    /// Summarize deploys
    #[command(
        about = "Summarize the changes in a deploy",
        long_about = "Summarize a deploy: pull requests, migrations, dependency changes and diff statistics between two revisions.\n\nWith no revisions, shows what promoting staging to production and master to staging would ship. With one revision, diffs it against the latest deploy tag. With --deploys, walks the history of deploy tags."
    )]
    Deploy {
        #[command(flatten)]
        common: CommonParams,

        #[command(flatten)]
        args: DeployArgs,
    },

    /// Add checklists to a pull request
    #[command(
        name = "pr-checklist",
        about = "Add relevant checklists to the open pull request for a branch",
        long_about = "Finds the open pull request for a branch, matches the files it changes against the checklist rules, appends any checklists not already present to the pull request body and leaves one comment explaining why."
    )]
    PrChecklist {
        #[command(flatten)]
        common: CommonParams,

        #[command(flatten)]
        args: PrChecklistArgs,
    },
}

/// Define custom styles for Clap
fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Main function to parse arguments and handle the command
pub async fn main() -> anyhow::Result<()> {
    let cli = parse_args();

    if cli.version {
        ui::print_version(crate_version!());
        return Ok(());
    }

    if cli.log {
        crate::logger::enable_logging();
        let log_file = cli.log_file.as_deref().unwrap_or(LOG_FILE);
        crate::logger::set_log_file(log_file)?;

        // Personal config only; the repository is not known yet
        if let Ok(config) = crate::config::Config::load(None) {
            crate::logger::set_verbose_logging(config.logging.verbose);
            if config.logging.verbose {
                log_debug!("Verbose logging enabled - will show HTTP client logs");
            }
        }
    } else {
        crate::logger::disable_logging();
    }

    if cli.quiet {
        crate::ui::set_quiet_mode(true);
    }

    if let Some(command) = cli.command {
        handle_command(command).await
    } else {
        let _ = Cli::parse_from(["deploy-complexity", "--help"]);
        Ok(())
    }
}

/// Dispatch a parsed subcommand
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Deploy { common, args } => {
            log_debug!("Handling 'deploy' command with args: {:?}", args);
            handle_deploy_command(common, args)
        }
        Commands::PrChecklist { common, args } => {
            log_debug!(
                "Handling 'pr-checklist' command for branch {:?} (dry run: {})",
                args.branch,
                args.dry_run
            );
            handle_pr_checklist_command(common, args).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pr_checklist() {
        let cli = Cli::try_parse_from([
            "deploy-complexity",
            "pr-checklist",
            "-b",
            "origin/feature",
            "-n",
            "-c",
            "checklists.toml",
            "--git-dir",
            "/tmp/repo",
        ])
        .expect("valid arguments");
        let Some(Commands::PrChecklist { common, args }) = cli.command else {
            panic!("expected pr-checklist");
        };
        assert_eq!(args.branch.as_deref(), Some("origin/feature"));
        assert!(args.dry_run);
        assert_eq!(
            args.custom_checklist.as_deref(),
            Some(std::path::Path::new("checklists.toml"))
        );
        assert_eq!(
            common.git_dir.as_deref(),
            Some(std::path::Path::new("/tmp/repo"))
        );
    }

    #[test]
    fn test_parse_deploy() {
        let cli = Cli::try_parse_from([
            "deploy-complexity",
            "deploy",
            "--dirstat",
            "-b",
            "staging",
            "base",
            "to",
        ])
        .expect("valid arguments");
        let Some(Commands::Deploy { args, .. }) = cli.command else {
            panic!("expected deploy");
        };
        assert!(args.dirstat);
        assert_eq!(args.branch.as_deref(), Some("staging"));
        assert_eq!(args.revisions, vec!["base", "to"]);
        assert_eq!(args.deploys, None);

        let cli = Cli::try_parse_from(["deploy-complexity", "deploy", "-d", "5"])
            .expect("valid arguments");
        let Some(Commands::Deploy { args, .. }) = cli.command else {
            panic!("expected deploy");
        };
        assert_eq!(args.deploys, Some(Some(5)));
    }
}
