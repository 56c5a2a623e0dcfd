//! hoadon-console
//!
//! Command-line entry to the invoice console.
//!
//! # Usage
//!
//! ```bash
//! HOADON_USERNAME=admin HOADON_PASSWORD=... hoadon-console stats momo
//! hoadon-console export doi-ung ./doi-ung.xlsx
//! hoadon-console summary month
//! hoadon-console users
//! hoadon-console theme dark
//! ```
//!
//! # Environment Variables
//!
//! * `HOADON_API_BASE_URL` - Backend root URL (default: http://localhost:8002)
//! * `HOADON_REQUEST_TIMEOUT_SECS` - Per-call timeout (default: 30)
//! * `HOADON_BULK_TIMEOUT_SECS` - Batch save timeout (default: 60)
//! * `HOADON_PAGE_SIZE` - Batches per page (default: 10)
//! * `HOADON_LOG_LEVEL` - trace, debug, info, warn, error (default: info)
//! * `HOADON_LOG_JSON` - JSON log lines (default: false)
//! * `HOADON_PREFERENCES_PATH` - Preferences file (default: hoadon-preferences.json)
//! * `HOADON_USERNAME`, `HOADON_PASSWORD` - Credentials for signing in

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use core_kernel::temporal::to_display_timezone;
use domain_invoice::{DashboardStats, InvoiceRecord};
use domain_report::Granularity;
use interface_dashboard::{
    init_tracing, Console, DashboardConfig, DashboardError, InvoiceDashboard, PreferencesStore, Theme,
};

#[derive(Debug, Parser)]
#[command(name = "hoadon-console", version, about = "Batch invoice console")]
struct Cli {
    /// Defaults to `stats card`
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Totals for one invoice family
    Stats {
        #[arg(value_enum, default_value_t = Family::Card)]
        family: Family,
    },
    /// Download the spreadsheet of one invoice family
    Export {
        #[arg(value_enum)]
        family: Family,
        /// Target file; the backend's file name when omitted
        path: Option<PathBuf>,
    },
    /// Summary report for the current month
    Summary {
        /// hour, day, week, month or year
        granularity: Option<Granularity>,
    },
    /// List console accounts
    Users,
    /// Set the theme, or toggle it when none is given
    Theme {
        #[arg(value_enum)]
        theme: Option<ThemeChoice>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Family {
    Card,
    Momo,
    #[value(name = "doi-ung", alias = "offset")]
    Offset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThemeChoice {
    Light,
    Dark,
}

impl From<ThemeChoice> for Theme {
    fn from(choice: ThemeChoice) -> Self {
        match choice {
            ThemeChoice::Light => Theme::Light,
            ThemeChoice::Dark => Theme::Dark,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let config = DashboardConfig::from_env().context("loading configuration")?;
    init_tracing(&config)?;

    let command = cli.command.unwrap_or(Command::Stats { family: Family::Card });

    if let Command::Theme { theme } = command {
        let store = PreferencesStore::new(&config.preferences_path);
        let theme = match theme {
            Some(choice) => Theme::from(choice),
            None => store.load()?.theme.toggled(),
        };
        store.set_theme(theme)?;
        println!("theme: {}", theme);
        return Ok(());
    }

    let today = to_display_timezone(Utc::now()).date();
    let mut console = Console::new(&config, today)?;

    let (Some(username), Some(password)) = (config.username.as_deref(), config.password.as_deref()) else {
        bail!("HOADON_USERNAME and HOADON_PASSWORD are required");
    };
    if let Err(e) = console.sign_in(username, password).await {
        let e = console.report(e);
        bail!(e.user_message().join("\n"));
    }

    if let Err(e) = run(&mut console, command).await {
        let e = console.report(e);
        for line in e.user_message() {
            eprintln!("{}", line);
        }
        if console.shell.location() == domain_access::LOGIN_PATH {
            eprintln!("-> {}", domain_access::LOGIN_PATH);
        }
        std::process::exit(1);
    }

    console.sign_out().await.ok();
    Ok(())
}

async fn run(console: &mut Console, command: Command) -> Result<(), DashboardError> {
    match command {
        Command::Stats { family } => match family {
            Family::Card => print_stats(&mut console.card).await,
            Family::Momo => print_stats(&mut console.momo).await,
            Family::Offset => print_stats(&mut console.offset).await,
        },
        Command::Export { family, path } => {
            let file = match family {
                Family::Card => console.card.export().await?,
                Family::Momo => console.momo.export().await?,
                Family::Offset => console.offset.export().await?,
            };
            let path = path.unwrap_or_else(|| PathBuf::from(&file.filename));
            std::fs::write(&path, &file.bytes).map_err(|source| DashboardError::Export {
                path: path.clone(),
                source,
            })?;
            println!("{} ({} bytes)", path.display(), file.bytes.len());
            Ok(())
        }
        Command::Summary { granularity } => {
            if let Some(granularity) = granularity {
                console.reports.set_granularity(granularity);
            }
            let report = console.reports.load_summary().await?;
            for row in &report.rows {
                println!("{}\t{}\t{}\t{}", row.period, row.total_invoices, row.total_amount, row.total_fee);
            }
            println!("total\t{}\t{}\t{}", report.totals.invoices, report.totals.amount, report.totals.fee);
            Ok(())
        }
        Command::Users => {
            for user in console.users.load().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    user.id.value(),
                    user.username,
                    user.role.as_deref().unwrap_or("-"),
                    if user.is_active { "active" } else { "inactive" }
                );
            }
            Ok(())
        }
        // handled before signing in
        Command::Theme { .. } => Ok(()),
    }
}

async fn print_stats<R: InvoiceRecord>(dashboard: &mut InvoiceDashboard<R>) -> Result<(), DashboardError> {
    dashboard.refresh().await?;
    let DashboardStats {
        total_records,
        total_batches,
        total_amount,
        total_fee,
    } = *dashboard.stats();
    println!("{}", R::FAMILY.label());
    println!("records: {}  batches: {}", total_records, total_batches);
    println!("amount:  {}", total_amount);
    println!("fee:     {}", total_fee);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("hoadon-console").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        let error = parse(&["bogus"]).unwrap_err();
        assert_eq!(error.kind(), clap::error::ErrorKind::InvalidSubcommand);
        assert_ne!(error.exit_code(), 0);
    }

    #[test]
    fn test_unknown_family_is_rejected() {
        assert!(parse(&["stats", "visa"]).is_err());
        assert!(parse(&["export"]).is_err());
    }

    #[test]
    fn test_stats_defaults_to_card() {
        assert_eq!(parse(&["stats"]).unwrap().command, Some(Command::Stats { family: Family::Card }));
        assert_eq!(parse(&[]).unwrap().command, None);
    }

    #[test]
    fn test_offset_family_accepts_both_names() {
        for name in ["doi-ung", "offset"] {
            assert_eq!(
                parse(&["export", name, "out.xlsx"]).unwrap().command,
                Some(Command::Export {
                    family: Family::Offset,
                    path: Some(PathBuf::from("out.xlsx")),
                })
            );
        }
    }

    #[test]
    fn test_summary_granularity_is_parsed() {
        assert_eq!(
            parse(&["summary", "month"]).unwrap().command,
            Some(Command::Summary {
                granularity: Some(Granularity::Month),
            })
        );
        assert!(parse(&["summary", "fortnight"]).is_err());
    }

    #[test]
    fn test_theme_choice() {
        assert_eq!(
            parse(&["theme", "dark"]).unwrap().command,
            Some(Command::Theme {
                theme: Some(ThemeChoice::Dark),
            })
        );
        assert_eq!(Theme::from(ThemeChoice::Light), Theme::Light);
    }
}
