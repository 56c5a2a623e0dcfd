//! Wiring
//!
//! Builds every screen on one shared backend client.

use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use domain_access::AccessPort;
use infra_http::{ApiClient, HttpAccessAdapter, HttpInvoiceAdapter, HttpReportAdapter, SessionEvent};

use crate::config::DashboardConfig;
use crate::dashboard::{CardDashboard, MomoDashboard, OffsetDashboard};
use crate::error::DashboardError;
use crate::preferences::PreferencesStore;
use crate::reports::ReportScreen;
use crate::shell::AppShell;
use crate::users::UserScreen;

pub struct Console {
    pub client: ApiClient,
    pub shell: AppShell,
    pub card: CardDashboard,
    pub momo: MomoDashboard,
    pub offset: OffsetDashboard,
    pub reports: ReportScreen,
    pub users: UserScreen,
    pub preferences: PreferencesStore,
    events: broadcast::Receiver<SessionEvent>,
}

impl Console {
    pub fn new(config: &DashboardConfig, today: NaiveDate) -> Result<Self, DashboardError> {
        let client = ApiClient::new(config.http_config())?;
        let access: Arc<dyn AccessPort> = Arc::new(HttpAccessAdapter::new(client.clone()));
        let bulk_timeout = config.bulk_timeout();

        Ok(Self {
            events: client.subscribe(),
            shell: AppShell::new(access.clone()),
            card: CardDashboard::new(
                Arc::new(HttpInvoiceAdapter::new(client.clone())),
                config.page_size,
                bulk_timeout,
            ),
            momo: MomoDashboard::new(
                Arc::new(HttpInvoiceAdapter::new(client.clone())),
                config.page_size,
                bulk_timeout,
            ),
            offset: OffsetDashboard::new(
                Arc::new(HttpInvoiceAdapter::new(client.clone())),
                config.page_size,
                bulk_timeout,
            ),
            reports: ReportScreen::new(Arc::new(HttpReportAdapter::new(client.clone())), today)?,
            users: UserScreen::new(access),
            preferences: PreferencesStore::new(&config.preferences_path),
            client,
        })
    }

    /// Signs in and loads the session identity
    pub async fn sign_in(&mut self, username: &str, password: &str) -> Result<(), DashboardError> {
        self.client.login(username, password).await?;
        self.sync_session();
        self.shell.refresh_identity().await?;
        info!(location = %self.shell.location(), "Console ready");
        Ok(())
    }

    pub async fn sign_out(&mut self) -> Result<(), DashboardError> {
        self.client.logout().await?;
        self.sync_session();
        Ok(())
    }

    /// Applies session events raised by the client since the last call
    pub fn sync_session(&mut self) -> usize {
        self.shell.drain_events(&mut self.events)
    }

    /// Routes a failure through the shell
    pub fn report(&mut self, error: DashboardError) -> DashboardError {
        self.sync_session();
        self.shell.report(error)
    }
}
