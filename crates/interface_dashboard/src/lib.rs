//! Invoice Console
//!
//! The application layer of the hóa đơn console: one dashboard per invoice
//! family, the application shell with its route guard and login redirect,
//! report and account screens, configuration, preferences and logging setup.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_dashboard::{Console, DashboardConfig};
//!
//! let config = DashboardConfig::from_env()?;
//! let mut console = Console::new(&config, today)?;
//! console.sign_in("admin", "secret").await?;
//! console.momo.refresh().await?;
//! ```

pub mod config;
pub mod error;
pub mod telemetry;
pub mod preferences;
pub mod shell;
pub mod dashboard;
pub mod reports;
pub mod users;
pub mod app;

pub use config::DashboardConfig;
pub use error::DashboardError;
pub use telemetry::init_tracing;
pub use preferences::{Preferences, PreferencesStore, Theme};
pub use shell::{AppShell, ACCESS_DENIED_PATH, HOME_PATH};
pub use dashboard::{BatchSummary, CardDashboard, InvoiceDashboard, MomoDashboard, OffsetDashboard};
pub use reports::ReportScreen;
pub use users::UserScreen;
pub use app::Console;
