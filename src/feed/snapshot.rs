//! Opportunity feed backed by a merged-games JSON snapshot on disk
//!
//! The collectors rewrite the file every few seconds with one record per
//! matched game. Each record carries both sides of the Kalshi market, so
//! it expands into a home and an away [`Opportunity`].

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::teams;
use crate::common::traits::{AdapterResult, OpportunityFeed};
use crate::common::types::{ContractSide, League, Opportunity, TeamSide};

/// One matched game as written by the collectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Market ticker; its last segment is the YES team
    pub ticker: String,
    #[serde(default)]
    pub event_ticker: Option<String>,
    pub league: League,
    pub home_team: String,
    pub away_team: String,
    pub period: u8,
    pub seconds_remaining: u32,
    #[serde(default)]
    pub home_score: u32,
    #[serde(default)]
    pub away_score: u32,
    /// ESPN home win probability, 0-1
    pub home_win_probability: Decimal,
    #[serde(default)]
    pub yes_bid: Option<u32>,
    #[serde(default)]
    pub yes_ask: Option<u32>,
    #[serde(default)]
    pub no_bid: Option<u32>,
    #[serde(default)]
    pub no_ask: Option<u32>,
}

impl SnapshotRecord {
    /// Home and away opportunities; sides without an ask are left out
    ///
    /// Returns nothing when the ticker's YES team matches neither club.
    pub fn opportunities(&self) -> Vec<Opportunity> {
        let home = teams::normalize(self.league, &self.home_team);
        let away = teams::normalize(self.league, &self.away_team);
        let yes_team = teams::normalize(self.league, &teams::yes_team_from_ticker(&self.ticker));

        let yes_is_home = if yes_team == home {
            true
        } else if yes_team == away {
            false
        } else {
            warn!(
                ticker = %self.ticker,
                %yes_team,
                %home,
                %away,
                "YES team matches neither side, dropping game"
            );
            return Vec::new();
        };

        let game_id = match self
            .event_ticker
            .as_deref()
            .or_else(|| teams::event_ticker(&self.ticker))
        {
            Some(id) => id.to_string(),
            None => {
                warn!(ticker = %self.ticker, "cannot derive event ticker, dropping game");
                return Vec::new();
            }
        };

        let yes = (self.yes_bid, self.yes_ask, ContractSide::Yes);
        let no = (self.no_bid, self.no_ask, ContractSide::No);
        let (home_quote, away_quote) = if yes_is_home { (yes, no) } else { (no, yes) };

        [(TeamSide::Home, home_quote), (TeamSide::Away, away_quote)]
            .into_iter()
            .filter_map(|(side, (bid, ask, contract))| {
                Some(Opportunity {
                    game_id: game_id.clone(),
                    ticker: self.ticker.clone(),
                    league: self.league,
                    team_home: home.clone(),
                    team_away: away.clone(),
                    period: self.period,
                    seconds_remaining: self.seconds_remaining,
                    home_score: self.home_score,
                    away_score: self.away_score,
                    espn_win_probability: self.home_win_probability,
                    kalshi_bid_cents: bid.unwrap_or(0),
                    kalshi_ask_cents: ask?,
                    kalshi_side: side,
                    contract,
                })
            })
            .collect()
    }
}

/// Parse a snapshot document into opportunities
pub fn parse_snapshot(json: &str) -> AdapterResult<Vec<Opportunity>> {
    let records: Vec<SnapshotRecord> = serde_json::from_str(json)?;
    Ok(records.iter().flat_map(SnapshotRecord::opportunities).collect())
}

/// Reads the snapshot file afresh on every tick
#[derive(Debug, Clone)]
pub struct SnapshotFeed {
    path: PathBuf,
}

impl SnapshotFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl OpportunityFeed for SnapshotFeed {
    async fn next_batch(&mut self) -> AdapterResult<Vec<Opportunity>> {
        let json = tokio::fs::read_to_string(&self.path).await?;
        let batch = parse_snapshot(&json)?;
        debug!(path = %self.path.display(), opportunities = batch.len(), "snapshot loaded");
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::AdapterError;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const SNAPSHOT: &str = r#"[
        {
            "ticker": "KXNBAGAME-26FEB25BRKLAC-BRK",
            "league": "nba",
            "home_team": "LAC",
            "away_team": "BKN",
            "period": 4,
            "seconds_remaining": 310,
            "home_score": 88,
            "away_score": 99,
            "home_win_probability": "0.08",
            "yes_bid": 86,
            "yes_ask": 88,
            "no_bid": 12,
            "no_ask": 14
        }
    ]"#;

    #[test]
    fn test_record_expands_into_both_sides() {
        let batch = parse_snapshot(SNAPSHOT).unwrap();
        assert_eq!(batch.len(), 2);

        let home = &batch[0];
        assert_eq!(home.game_id, "KXNBAGAME-26FEB25BRKLAC");
        assert_eq!(home.team_away, "BKN");
        assert_eq!(home.kalshi_side, TeamSide::Home);
        // YES is Brooklyn (BRK -> BKN), the away team
        assert_eq!(home.contract, ContractSide::No);
        assert_eq!((home.kalshi_bid_cents, home.kalshi_ask_cents), (12, 14));

        let away = &batch[1];
        assert_eq!(away.kalshi_side, TeamSide::Away);
        assert_eq!(away.contract, ContractSide::Yes);
        assert_eq!(away.kalshi_ask_cents, 88);
        assert_eq!(away.side_probability(), dec!(0.92));
        assert_eq!(away.side_lead(), 11);
    }

    #[test]
    fn test_missing_ask_drops_side() {
        let json = SNAPSHOT.replace("\"no_ask\": 14", "\"no_ask\": null");
        let batch = parse_snapshot(&json).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].kalshi_side, TeamSide::Away);
    }

    #[test]
    fn test_unmatched_yes_team_dropped() {
        let json = SNAPSHOT.replace("BRKLAC-BRK", "BRKLAC-NYK");
        assert!(parse_snapshot(&json).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_adapter_error() {
        let mut feed = SnapshotFeed::new("does/not/exist.json");
        assert!(matches!(feed.next_batch().await, Err(AdapterError::Io(_))));
    }

    #[test]
    fn test_malformed_json_is_adapter_error() {
        assert!(matches!(parse_snapshot("{"), Err(AdapterError::JsonParse(_))));
    }
}
