//! Balance dashboard state

use crate::balance::client::{BalanceSource, HttpBalanceClient};
use crate::error::ClientResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use storefront_core::{AccountBalance, BalanceConfig, BalanceInquiry, BalanceRow};
use tokio::sync::RwLock;
use tracing::{error, info};

/// One balance type rendered as a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceTable {
    /// Balance type, e.g. `Cash`
    pub balance_type: String,
    /// Account status
    pub status: String,
    /// Registration status code
    pub registration_status_code: String,
    /// Metric rows in display order
    pub rows: Vec<BalanceRow>,
}

impl From<&AccountBalance> for BalanceTable {
    fn from(balance: &AccountBalance) -> Self {
        Self {
            balance_type: balance.balance_type.clone(),
            status: balance.status.clone(),
            registration_status_code: balance.registration_status_code.clone(),
            rows: balance.rows(),
        }
    }
}

/// What the dashboard shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BalanceView {
    /// Nothing fetched yet
    Loading,
    /// Latest inquiry
    Ready {
        /// Raw inquiry
        inquiry: BalanceInquiry,
        /// One table per balance type
        tables: Vec<BalanceTable>,
        /// When the inquiry arrived
        fetched_at: DateTime<Utc>,
    },
    /// Last inquiry failed
    Failed {
        /// Error text
        error: String,
        /// Data from an earlier successful inquiry
        inquiry: Option<BalanceInquiry>,
    },
}

#[derive(Debug, Default)]
struct BoardState {
    inquiry: Option<(BalanceInquiry, DateTime<Utc>)>,
    error: Option<String>,
}

/// Holds the latest balance inquiry
pub struct BalanceBoard {
    source: Arc<dyn BalanceSource>,
    state: RwLock<BoardState>,
}

impl std::fmt::Debug for BalanceBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BalanceBoard").finish_non_exhaustive()
    }
}

impl BalanceBoard {
    /// Create a board over any balance source
    pub fn new(source: Arc<dyn BalanceSource>) -> Self {
        Self {
            source,
            state: RwLock::new(BoardState::default()),
        }
    }

    /// Create a board talking HTTP to the configured Balance Inquiry API
    pub fn from_config(config: &BalanceConfig) -> ClientResult<Self> {
        Ok(Self::new(Arc::new(HttpBalanceClient::from_config(config)?)))
    }

    /// Fetch balances; on failure earlier data is kept and the error recorded
    pub async fn refresh(&self) -> ClientResult<()> {
        self.state.write().await.error = None;

        match self.source.fetch_balance().await {
            Ok(inquiry) => {
                info!(accounts = inquiry.account_infos.len(), "Balance fetched");
                self.state.write().await.inquiry = Some((inquiry, Utc::now()));
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "Balance inquiry failed");
                self.state.write().await.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Current dashboard view
    pub async fn view(&self) -> BalanceView {
        let state = self.state.read().await;
        match (&state.error, &state.inquiry) {
            (Some(error), inquiry) => BalanceView::Failed {
                error: error.clone(),
                inquiry: inquiry.as_ref().map(|(inquiry, _)| inquiry.clone()),
            },
            (None, Some((inquiry, fetched_at))) => BalanceView::Ready {
                tables: inquiry.account_infos.iter().map(BalanceTable::from).collect(),
                inquiry: inquiry.clone(),
                fetched_at: *fetched_at,
            },
            (None, None) => BalanceView::Loading,
        }
    }
}
