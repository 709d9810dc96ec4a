//! Balance inquiry payload returned by the payment provider

use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount in a given currency, both kept as the provider sends them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount as text, e.g. `"1500000.00"`
    pub value: String,
    /// ISO currency code
    pub currency: String,
}

/// Balance inquiry response body (the `data` member of the envelope)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceInquiry {
    /// Provider response code
    #[serde(default)]
    pub response_code: String,
    /// Provider response message
    #[serde(default)]
    pub response_message: String,
    /// Provider reference number
    #[serde(default)]
    pub reference_no: String,
    /// Our reference number
    #[serde(default)]
    pub partner_reference_no: String,
    /// Account number
    #[serde(default)]
    pub account_no: String,
    /// Account holder (restaurant) name
    #[serde(default)]
    pub name: String,
    /// Balances per balance type
    #[serde(default)]
    pub account_infos: Vec<AccountBalance>,
    /// Channel details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<AdditionalInfo>,
}

/// Device and channel that issued the inquiry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInfo {
    /// Device identifier
    #[serde(default)]
    pub device_id: String,
    /// Channel name
    #[serde(default)]
    pub channel: String,
}

/// Balances of one balance type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    /// Balance type, e.g. `"Cash"`
    #[serde(default)]
    pub balance_type: String,
    /// Total amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    /// Floating amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub float_amount: Option<Money>,
    /// Held amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_amount: Option<Money>,
    /// Available balance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_balance: Option<Money>,
    /// Ledger balance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_balance: Option<Money>,
    /// Current multilateral limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_multilateral_limit: Option<Money>,
    /// Registration status code
    #[serde(default)]
    pub registration_status_code: String,
    /// Account status
    #[serde(default)]
    pub status: String,
}

/// Named balance metric, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BalanceMetric {
    /// `amount`
    Amount,
    /// `floatAmount`
    FloatAmount,
    /// `holdAmount`
    HoldAmount,
    /// `availableBalance`
    AvailableBalance,
    /// `ledgerBalance`
    LedgerBalance,
    /// `currentMultilateralLimit`
    CurrentMultilateralLimit,
}

impl BalanceMetric {
    /// All metrics in display order
    pub const ALL: [Self; 6] = [
        Self::Amount,
        Self::FloatAmount,
        Self::HoldAmount,
        Self::AvailableBalance,
        Self::LedgerBalance,
        Self::CurrentMultilateralLimit,
    ];

    /// Human-readable label
    pub const fn label(self) -> &'static str {
        match self {
            Self::Amount => "Total Amount",
            Self::FloatAmount => "Floating Amount",
            Self::HoldAmount => "Held Amount",
            Self::AvailableBalance => "Available Balance",
            Self::LedgerBalance => "Ledger Balance",
            Self::CurrentMultilateralLimit => "Multilateral Limit",
        }
    }
}

impl fmt::Display for BalanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One rendered row of a balance table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRow {
    /// 1-based row number
    pub index: usize,
    /// Metric shown in this row
    pub metric: BalanceMetric,
    /// Metric label
    pub label: String,
    /// Amount as sent by the provider
    pub value: String,
    /// Currency code
    pub currency: String,
}

impl AccountBalance {
    /// Look up a metric
    pub const fn metric(&self, metric: BalanceMetric) -> Option<&Money> {
        match metric {
            BalanceMetric::Amount => self.amount.as_ref(),
            BalanceMetric::FloatAmount => self.float_amount.as_ref(),
            BalanceMetric::HoldAmount => self.hold_amount.as_ref(),
            BalanceMetric::AvailableBalance => self.available_balance.as_ref(),
            BalanceMetric::LedgerBalance => self.ledger_balance.as_ref(),
            BalanceMetric::CurrentMultilateralLimit => self.current_multilateral_limit.as_ref(),
        }
    }

    /// Table rows for the metrics present, numbered from 1
    pub fn rows(&self) -> Vec<BalanceRow> {
        BalanceMetric::ALL
            .into_iter()
            .filter_map(|metric| self.metric(metric).map(|money| (metric, money)))
            .enumerate()
            .map(|(i, (metric, money))| BalanceRow {
                index: i + 1,
                metric,
                label: metric.label().to_string(),
                value: money.value.clone(),
                currency: money.currency.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "responseCode": "2001100",
        "responseMessage": "Request has been processed successfully",
        "referenceNo": "2020102977770000000009",
        "partnerReferenceNo": "2020102900000000000001",
        "accountNo": "115471119",
        "name": "Warung Nieu",
        "accountInfos": [
            {
                "balanceType": "Cash",
                "amount": {"value": "200000.00", "currency": "IDR"},
                "floatAmount": {"value": "50000.00", "currency": "IDR"},
                "holdAmount": {"value": "20000.00", "currency": "IDR"},
                "availableBalance": {"value": "130000.00", "currency": "IDR"},
                "ledgerBalance": {"value": "30000.00", "currency": "IDR"},
                "currentMultilateralLimit": {"value": "10000.00", "currency": "IDR"},
                "registrationStatusCode": "0001",
                "status": "0001"
            }
        ],
        "additionalInfo": {"deviceId": "12345679237", "channel": "mobilephone"}
    }"#;

    #[test]
    fn test_inquiry_deserializes_camel_case() {
        let inquiry: BalanceInquiry = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(inquiry.name, "Warung Nieu");
        assert_eq!(inquiry.account_no, "115471119");
        assert_eq!(inquiry.account_infos.len(), 1);
        assert_eq!(
            inquiry.additional_info.as_ref().map(|info| info.channel.as_str()),
            Some("mobilephone")
        );
    }

    #[test]
    fn test_rows_follow_display_order() {
        let inquiry: BalanceInquiry = serde_json::from_str(SAMPLE).unwrap();
        let rows = inquiry.account_infos[0].rows();

        let labels: Vec<&str> = rows.iter().map(|row| row.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Total Amount",
                "Floating Amount",
                "Held Amount",
                "Available Balance",
                "Ledger Balance",
                "Multilateral Limit",
            ]
        );
        assert_eq!(rows[3].value, "130000.00");
        assert_eq!(rows[3].currency, "IDR");
        assert_eq!(rows[5].index, 6);
    }

    #[test]
    fn test_rows_skip_missing_metrics_and_renumber() {
        let balance = AccountBalance {
            balance_type: "Cash".to_string(),
            hold_amount: Some(Money {
                value: "1.00".to_string(),
                currency: "IDR".to_string(),
            }),
            ledger_balance: Some(Money {
                value: "2.00".to_string(),
                currency: "IDR".to_string(),
            }),
            ..AccountBalance::default()
        };

        let rows = balance.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].metric, BalanceMetric::HoldAmount);
        assert_eq!(rows[1].index, 2);
        assert_eq!(rows[1].label, "Ledger Balance");
    }
}
