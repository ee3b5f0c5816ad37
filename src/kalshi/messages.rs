//! Kalshi trade API request and response bodies

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::types::{ContractSide, OrderIntent, OrderStatus};

/// Body of `POST /portfolio/orders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub ticker: String,
    pub client_order_id: String,
    /// Always "buy"
    pub action: String,
    /// "yes" or "no"
    pub side: ContractSide,
    /// Always "limit"
    #[serde(rename = "type")]
    pub order_type: String,
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yes_price: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_price: Option<u32>,
    /// Resting orders only; rejected instead of crossing the spread
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub post_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<String>,
}

impl CreateOrderRequest {
    /// Limit buy at the intent's price
    ///
    /// Maker intents are sent post-only; taker intents are fill-or-kill so
    /// nothing is left resting.
    pub fn from_intent(intent: &OrderIntent, client_order_id: impl Into<String>) -> Self {
        let (yes_price, no_price) = match intent.side {
            ContractSide::Yes => (Some(intent.limit_price_cents), None),
            ContractSide::No => (None, Some(intent.limit_price_cents)),
        };
        let maker = intent.order_type.is_maker();

        Self {
            ticker: intent.ticker.clone(),
            client_order_id: client_order_id.into(),
            action: "buy".to_string(),
            side: intent.side,
            order_type: "limit".to_string(),
            count: intent.contract_count,
            yes_price,
            no_price,
            post_only: maker,
            time_in_force: if maker {
                None
            } else {
                Some("fill_or_kill".to_string())
            },
        }
    }
}

/// Order as reported by the exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KalshiOrder {
    pub order_id: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub event_ticker: Option<String>,
    /// "resting", "canceled", "executed" or "pending"
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub side: Option<ContractSide>,
    #[serde(default)]
    pub yes_price: Option<u32>,
    #[serde(default)]
    pub no_price: Option<u32>,
    #[serde(default)]
    pub fill_count: Option<u32>,
    #[serde(default)]
    pub remaining_count: Option<u32>,
}

impl KalshiOrder {
    pub fn filled(&self) -> u32 {
        self.fill_count.unwrap_or(0)
    }

    pub fn order_status(&self) -> OrderStatus {
        let remaining = self.remaining_count.unwrap_or(0);
        match self.status.as_str() {
            "canceled" | "cancelled" if self.filled() > 0 => OrderStatus::PartiallyFilled,
            "canceled" | "cancelled" => OrderStatus::Canceled,
            "executed" if remaining == 0 => OrderStatus::Filled,
            _ if self.filled() > 0 => OrderStatus::PartiallyFilled,
            _ => OrderStatus::Resting,
        }
    }

    /// Contracts still waiting to fill; a resting order always holds at least one
    pub fn resting_contracts(&self) -> u32 {
        self.remaining_count.unwrap_or(0).max(1)
    }

    /// Price paid per contract on the order's side
    pub fn side_price(&self) -> Option<u32> {
        match self.side {
            Some(ContractSide::No) => self.no_price,
            _ => self.yes_price,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderResponse {
    pub order: KalshiOrder,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<KalshiOrder>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Holding in one market; positive is YES, negative is NO
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarketPosition {
    pub ticker: String,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub market_exposure: Option<i64>,
    #[serde(default)]
    pub resting_orders_count: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionsResponse {
    #[serde(default)]
    pub market_positions: Vec<MarketPosition>,
    #[serde(default)]
    pub cursor: Option<String>,
}

impl PositionsResponse {
    /// Contracts held across every market, either side
    pub fn total_contracts(&self) -> u32 {
        let total: u64 = self
            .market_positions
            .iter()
            .map(|p| p.position.unsigned_abs())
            .sum();
        u32::try_from(total).unwrap_or(u32::MAX)
    }
}

/// One market's settled position; amounts in cents
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarketSettlement {
    pub ticker: String,
    #[serde(default)]
    pub market_result: Option<String>,
    #[serde(default)]
    pub yes_count: i64,
    #[serde(default)]
    pub no_count: i64,
    #[serde(default)]
    pub yes_total_cost: i64,
    #[serde(default)]
    pub no_total_cost: i64,
    #[serde(default)]
    pub revenue: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettlementsResponse {
    #[serde(default)]
    pub settlements: Vec<MarketSettlement>,
    #[serde(default)]
    pub cursor: Option<String>,
}

impl SettlementsResponse {
    /// Summed cost and revenue in dollars, `None` when nothing has settled
    pub fn totals(&self) -> Option<(Decimal, Decimal)> {
        if self.settlements.is_empty() {
            return None;
        }
        let cents = |v: i64| Decimal::from(v) / Decimal::ONE_HUNDRED;
        let cost: Decimal = self
            .settlements
            .iter()
            .map(|s| cents(s.yes_total_cost + s.no_total_cost))
            .sum();
        let revenue: Decimal = self.settlements.iter().map(|s| cents(s.revenue)).sum();
        Some((cost, revenue))
    }
}

/// Error body returned on non-success statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{OrderType, TeamSide};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn intent(side: ContractSide, order_type: OrderType) -> OrderIntent {
        OrderIntent {
            game_id: "KXNBAGAME-26FEB25BKNLAC".to_string(),
            ticker: "KXNBAGAME-26FEB25BKNLAC-LAC".to_string(),
            team: TeamSide::Home,
            side,
            limit_price_cents: 82,
            contract_count: 12,
            order_type,
        }
    }

    #[test]
    fn test_maker_order_body() {
        let req = CreateOrderRequest::from_intent(&intent(ContractSide::Yes, OrderType::Maker), "cid-1");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ticker": "KXNBAGAME-26FEB25BKNLAC-LAC",
                "client_order_id": "cid-1",
                "action": "buy",
                "side": "yes",
                "type": "limit",
                "count": 12,
                "yes_price": 82,
                "post_only": true
            })
        );
    }

    #[test]
    fn test_taker_no_order_body() {
        let req = CreateOrderRequest::from_intent(&intent(ContractSide::No, OrderType::Taker), "cid-2");
        assert_eq!(req.no_price, Some(82));
        assert_eq!(req.yes_price, None);
        assert!(!req.post_only);
        assert_eq!(req.time_in_force.as_deref(), Some("fill_or_kill"));
    }

    #[test]
    fn test_order_status_mapping() {
        let order: KalshiOrder = serde_json::from_value(serde_json::json!({
            "order_id": "o1",
            "ticker": "T",
            "status": "executed",
            "side": "yes",
            "yes_price": 80,
            "fill_count": 5,
            "remaining_count": 0
        }))
        .unwrap();
        assert_eq!(order.order_status(), OrderStatus::Filled);
        assert_eq!(order.side_price(), Some(80));

        let resting: KalshiOrder =
            serde_json::from_value(serde_json::json!({"order_id": "o2", "status": "resting"})).unwrap();
        assert_eq!(resting.order_status(), OrderStatus::Resting);
        assert_eq!(resting.filled(), 0);
    }

    #[test]
    fn test_positions_total_counts_both_sides() {
        let response: PositionsResponse = serde_json::from_value(serde_json::json!({
            "market_positions": [
                {"ticker": "A", "position": 10},
                {"ticker": "B", "position": -4}
            ]
        }))
        .unwrap();
        assert_eq!(response.total_contracts(), 14);
    }

    #[test]
    fn test_resting_contracts_never_zero() {
        let order: KalshiOrder = serde_json::from_value(serde_json::json!({
            "order_id": "o1",
            "status": "resting",
            "remaining_count": 18
        }))
        .unwrap();
        assert_eq!(order.resting_contracts(), 18);

        let bare: KalshiOrder =
            serde_json::from_value(serde_json::json!({"order_id": "o2", "status": "resting"})).unwrap();
        assert_eq!(bare.resting_contracts(), 1);
    }

    #[test]
    fn test_settlement_totals_in_dollars() {
        let response: SettlementsResponse = serde_json::from_value(serde_json::json!({
            "settlements": [
                {"ticker": "A", "market_result": "yes", "yes_count": 24, "yes_total_cost": 1920, "revenue": 2400},
                {"ticker": "B", "market_result": "no", "yes_count": 3, "yes_total_cost": 45, "revenue": 0}
            ]
        }))
        .unwrap();
        assert_eq!(response.totals(), Some((dec!(19.65), dec!(24))));

        let empty: SettlementsResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(empty.totals(), None);
    }
}
