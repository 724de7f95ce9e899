//! CLI commands

use anyhow::Result;
use clap::Subcommand;
use okshouse_admin_core::{Admin, Navigator, SessionManager, session::TokioRuntime};
use okshouse_admin_http::AdminClient;
use std::rc::Rc;
use std::time::Duration;
use tracing::info;

use crate::config::CliConfig;
use crate::store::{FileCookieJar, FileStore};

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with a registered phone number
    Login {
        /// Phone number, e.g. 010-1234-5678
        phone: String,
    },

    /// Restore the stored session, refreshing or re-logging in as needed
    Status,

    /// Show the admin owning the stored token
    Whoami,

    /// Exchange the refresh credential for a new access token
    Refresh,

    /// End the session and forget the stored phone number
    Logout,

    /// Keep the session alive, refreshing the token before it expires
    Watch {
        /// Stop after this many seconds instead of waiting for Ctrl-C
        #[arg(long)]
        duration: Option<u64>,
    },
}

/// Stands in for page navigation: the session ended
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str) {
        info!("Session ended, returning to {path}");
    }
}

/// Session manager over the file-backed stores in the data directory
pub fn open_session(config: &CliConfig) -> Result<SessionManager> {
    let client = AdminClient::builder()
        .base_url(&config.api_base_url)
        .timeout(Duration::from_secs(30))
        .build()?;

    let manager = SessionManager::builder()
        .config(config.session.clone())
        .api(Rc::new(client))
        .storage(Rc::new(FileStore::new(config.storage_path())))
        .cookies(Rc::new(FileCookieJar::open(config.cookie_path())))
        .navigator(Rc::new(TerminalNavigator))
        .runtime(Rc::new(TokioRuntime))
        .build()?;

    Ok(manager)
}

impl Commands {
    /// Commands that run until interrupted
    pub fn is_long_running(&self) -> bool {
        matches!(self, Self::Watch { .. })
    }

    pub async fn execute(self, session: &SessionManager) -> Result<()> {
        match self {
            Self::Login { phone } => {
                let admin = session.verify_phone_and_login(&phone).await?;
                println!("Logged in as {}", describe(&admin));
            }
            Self::Status => match session.check_auth_status().await {
                Ok(admin) => println!("Authenticated as {}", describe(&admin)),
                Err(err) => println!("Not authenticated: {err}"),
            },
            Self::Whoami => {
                let admin = session.get_current_admin_info().await?;
                println!("{}", describe(&admin));
            }
            Self::Refresh => {
                let admin = session.refresh_access_token().await?;
                println!("Token refreshed for {}", describe(&admin));
            }
            Self::Logout => {
                session.logout().await;
                println!("Logged out");
            }
            Self::Watch { duration } => {
                let admin = session.check_auth_status().await?;
                println!(
                    "Watching session of {} (checking every {}s)",
                    describe(&admin),
                    session.config().monitor_interval_secs
                );
                wait(session, duration).await?;
                println!("Stopped watching");
            }
        }
        Ok(())
    }
}

async fn wait(session: &SessionManager, duration: Option<u64>) -> Result<()> {
    let deadline = async {
        match duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    let mut lost = session.state().subscribe_authenticated();

    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        () = deadline => {}
        // The monitor logs out when a refresh fails for good
        _ = lost.wait_for(|authenticated| !authenticated) => {
            anyhow::bail!("Session lost");
        }
    }
    Ok(())
}

fn describe(admin: &Admin) -> String {
    match &admin.phone {
        Some(phone) => format!("{} (#{}, {phone})", admin.name, admin.admin_id),
        None => format!("{} (#{})", admin.name, admin.admin_id),
    }
}
