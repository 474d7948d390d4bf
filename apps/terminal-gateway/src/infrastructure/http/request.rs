//! HTTP request DTOs.
//!
//! Every field is optional at the serde level so that a missing field is
//! reported as an `InvalidRequest` envelope rather than a bare extractor
//! rejection.

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::use_cases::ExecutionSettings;
use crate::domain::shared::{AccountLogin, SessionId, Symbol, Ticket, Timestamp};
use crate::domain::trading::{ExecutionTag, OrderIntent, OrderSide};
use crate::error::GatewayError;

fn required<T>(value: Option<T>, field: &str) -> Result<T, GatewayError> {
    value.ok_or_else(|| GatewayError::invalid_request(format!("{field} is required")))
}

fn optional_symbol(symbol: Option<String>) -> Option<Symbol> {
    symbol.map(Symbol::new).filter(|s| !s.is_empty())
}

/// Account login as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoginField {
    /// `123`
    Number(u64),
    /// `"123"`
    Text(String),
}

impl LoginField {
    fn parse(self) -> Result<AccountLogin, GatewayError> {
        match self {
            Self::Number(n) => Ok(AccountLogin::new(n)),
            Self::Text(s) => s.trim().parse().map(AccountLogin::new).map_err(|_| {
                GatewayError::invalid_request(format!("login '{s}' is not an account number"))
            }),
        }
    }
}

/// `POST /connect`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectRequest {
    /// Account login.
    pub login: Option<LoginField>,
    /// Account password.
    pub password: Option<String>,
    /// Trade server.
    pub server: Option<String>,
}

impl ConnectRequest {
    /// Login, password and server, all required.
    pub fn into_parts(self) -> Result<(AccountLogin, String, String), GatewayError> {
        let login = required(self.login, "login")?.parse()?;
        let password = required(self.password, "password")?;
        let server = required(self.server.filter(|s| !s.is_empty()), "server")?;
        Ok((login, password, server))
    }
}

/// `POST /disconnect`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisconnectRequest {
    /// Session to drop.
    pub connection_id: Option<String>,
}

impl DisconnectRequest {
    /// Session id, required.
    pub fn session_id(self) -> Result<SessionId, GatewayError> {
        required(self.connection_id, "connection_id").map(SessionId::new)
    }
}

/// `POST /trade`, `/trade/buy`, `/trade/sell`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeRequest {
    /// Session placing the order.
    pub connection_id: Option<String>,
    /// Instrument.
    pub symbol: Option<String>,
    /// `BUY` or `SELL`; taken from the path on `/trade/buy` and `/trade/sell`.
    pub side: Option<String>,
    /// Lots.
    pub volume: Option<Decimal>,
    /// Explicit price; the current quote is used when absent.
    pub price: Option<Decimal>,
    /// Stop-loss level.
    pub sl: Option<Decimal>,
    /// Take-profit level.
    pub tp: Option<Decimal>,
    /// Execution tag override.
    pub magic: Option<u64>,
    /// Order comment override.
    pub comment: Option<String>,
}

impl TradeRequest {
    /// Build an order intent, filling tag and comment from `settings`.
    ///
    /// `side` overrides the body's `side` field.
    pub fn into_intent(
        self,
        side: Option<OrderSide>,
        settings: &ExecutionSettings,
    ) -> Result<OrderIntent, GatewayError> {
        let session_id = SessionId::new(required(self.connection_id, "connection_id")?);
        let symbol = Symbol::new(required(self.symbol, "symbol")?);
        let volume = required(self.volume, "volume")?;
        let side = match side {
            Some(side) => side,
            None => required(self.side, "side")?.parse::<OrderSide>()?,
        };

        Ok(OrderIntent {
            session_id,
            symbol,
            side,
            volume,
            limit_price: self.price,
            stop_loss: self.sl,
            take_profit: self.tp,
            tag: self.magic.map_or(settings.tag, ExecutionTag::new),
            comment: self.comment.unwrap_or_else(|| settings.comment.clone()),
        })
    }
}

/// `POST /position/close`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClosePositionRequest {
    /// Session owning the position.
    pub connection_id: Option<String>,
    /// Position ticket.
    pub ticket: Option<u64>,
}

impl ClosePositionRequest {
    /// Session id and ticket, both required.
    pub fn into_parts(self) -> Result<(SessionId, Ticket), GatewayError> {
        let session_id = SessionId::new(required(self.connection_id, "connection_id")?);
        let ticket = Ticket::new(required(self.ticket, "ticket")?);
        Ok((session_id, ticket))
    }
}

/// `GET /account`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountQuery {
    /// Session to read.
    pub connection_id: Option<String>,
}

impl AccountQuery {
    /// Session id, required.
    pub fn session_id(self) -> Result<SessionId, GatewayError> {
        required(self.connection_id, "connection_id").map(SessionId::new)
    }
}

/// `GET /trades/open`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenTradesQuery {
    /// Session to read.
    pub connection_id: Option<String>,
    /// Restrict to one symbol.
    pub symbol: Option<String>,
}

impl OpenTradesQuery {
    /// Session id and optional symbol.
    pub fn into_parts(self) -> Result<(SessionId, Option<Symbol>), GatewayError> {
        let session_id = SessionId::new(required(self.connection_id, "connection_id")?);
        Ok((session_id, optional_symbol(self.symbol)))
    }
}

/// `GET /trades/closed`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClosedTradesQuery {
    /// Session to read.
    pub connection_id: Option<String>,
    /// Restrict to one symbol.
    pub symbol: Option<String>,
    /// Window start, RFC 3339 or `YYYY-MM-DD`.
    pub from: Option<String>,
    /// Window end, RFC 3339 or `YYYY-MM-DD`.
    pub to: Option<String>,
}

/// Parsed closed-deals query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedTradesFilter {
    /// Session to read.
    pub session_id: SessionId,
    /// Restrict to one symbol.
    pub symbol: Option<Symbol>,
    /// Window start.
    pub from: Option<Timestamp>,
    /// Window end.
    pub to: Option<Timestamp>,
}

impl ClosedTradesQuery {
    /// Validate and parse the query.
    pub fn into_filter(self) -> Result<ClosedTradesFilter, GatewayError> {
        Ok(ClosedTradesFilter {
            session_id: SessionId::new(required(self.connection_id, "connection_id")?),
            symbol: optional_symbol(self.symbol),
            from: self.from.as_deref().map(|s| parse_bound(s, "from")).transpose()?,
            to: self.to.as_deref().map(|s| parse_bound(s, "to")).transpose()?,
        })
    }
}

fn parse_bound(value: &str, field: &str) -> Result<Timestamp, GatewayError> {
    if let Ok(ts) = Timestamp::parse(value) {
        return Ok(ts);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Timestamp::new(Utc.from_utc_datetime(&dt)))
        .ok_or_else(|| GatewayError::invalid_request(format!("{field} '{value}' is not a date")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trading::IntentError;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    fn trade(json: serde_json::Value) -> TradeRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn connect_accepts_numeric_string_login() {
        let request: ConnectRequest = serde_json::from_value(serde_json::json!({
            "login": "123", "password": "x", "server": "Demo"
        }))
        .unwrap();

        let (login, password, server) = request.into_parts().unwrap();
        assert_eq!(login, AccountLogin::new(123));
        assert_eq!(password, "x");
        assert_eq!(server, "Demo");
    }

    #[test_case(serde_json::json!({"password": "x", "server": "Demo"}), "login" ; "missing login")]
    #[test_case(serde_json::json!({"login": 1, "server": "Demo"}), "password" ; "missing password")]
    #[test_case(serde_json::json!({"login": 1, "password": "x"}), "server" ; "missing server")]
    #[test_case(serde_json::json!({"login": "abc", "password": "x", "server": "Demo"}), "login" ; "non numeric login")]
    fn connect_missing_fields(json: serde_json::Value, field: &str) {
        let request: ConnectRequest = serde_json::from_value(json).unwrap();
        match request.into_parts() {
            Err(GatewayError::InvalidRequest { message }) => assert!(message.contains(field)),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn trade_defaults_tag_and_comment_from_settings() {
        let settings = ExecutionSettings::default();
        let intent = trade(serde_json::json!({
            "connection_id": "123_Demo", "symbol": "EURUSD", "volume": 0.1
        }))
        .into_intent(Some(OrderSide::Buy), &settings)
        .unwrap();

        assert_eq!(intent.tag, settings.tag);
        assert_eq!(intent.comment, "SIGNALIST Bot");
        assert_eq!(intent.volume, dec!(0.1));
        assert!(intent.is_market());
    }

    #[test]
    fn trade_overrides() {
        let intent = trade(serde_json::json!({
            "connection_id": "123_Demo", "symbol": "EURUSD", "side": "sell", "volume": "1",
            "price": 1.2, "sl": 1.3, "tp": 1.1, "magic": 7, "comment": "manual"
        }))
        .into_intent(None, &ExecutionSettings::default())
        .unwrap();

        assert_eq!(intent.side, OrderSide::Sell);
        assert_eq!(intent.limit_price, Some(dec!(1.2)));
        assert_eq!(intent.tag, ExecutionTag::new(7));
        assert_eq!(intent.comment, "manual");
    }

    #[test]
    fn trade_unknown_side_is_invalid_intent() {
        let err = trade(serde_json::json!({
            "connection_id": "1_X", "symbol": "EURUSD", "side": "HOLD", "volume": 1
        }))
        .into_intent(None, &ExecutionSettings::default())
        .unwrap_err();

        assert!(matches!(
            err,
            GatewayError::InvalidOrderIntent(IntentError::UnknownSide { .. })
        ));
    }

    #[test]
    fn trade_missing_volume_is_invalid_request() {
        let err = trade(serde_json::json!({"connection_id": "1_X", "symbol": "EURUSD"}))
            .into_intent(Some(OrderSide::Buy), &ExecutionSettings::default())
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest { .. }));
    }

    #[test_case("2024-03-01T12:00:00Z", 1_709_294_400 ; "rfc3339")]
    #[test_case("2024-03-01", 1_709_251_200 ; "plain date")]
    fn bounds_parse(value: &str, seconds: i64) {
        assert_eq!(parse_bound(value, "from").unwrap().unix_seconds(), seconds);
    }

    #[test]
    fn bad_bound_is_invalid_request() {
        let query = ClosedTradesQuery {
            connection_id: Some("1_X".to_string()),
            from: Some("yesterday".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.into_filter(),
            Err(GatewayError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn empty_symbol_filter_is_ignored() {
        let query = OpenTradesQuery {
            connection_id: Some("1_X".to_string()),
            symbol: Some(String::new()),
        };
        assert_eq!(query.into_parts().unwrap().1, None);
    }
}
