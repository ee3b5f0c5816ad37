//! Common test utilities and fixtures

#![allow(dead_code)]

use courtside::common::types::{ContractSide, League, Opportunity, TeamSide};
use courtside::KalshiAuth;
use rust_decimal::Decimal;
use std::path::PathBuf;

pub const GAME_ID: &str = "KXNBAGAME-26MAR03DENPHX";
pub const TICKER: &str = "KXNBAGAME-26MAR03DENPHX-PHX";

/// Late fourth-quarter Phoenix home favourite
pub fn opportunity(ask: u32, home_probability: Decimal, seconds_remaining: u32) -> Opportunity {
    Opportunity {
        game_id: GAME_ID.to_string(),
        ticker: TICKER.to_string(),
        league: League::Nba,
        team_home: "PHX".to_string(),
        team_away: "DEN".to_string(),
        period: 4,
        seconds_remaining,
        home_score: 110,
        away_score: 98,
        espn_win_probability: home_probability,
        kalshi_bid_cents: ask.saturating_sub(2),
        kalshi_ask_cents: ask,
        kalshi_side: TeamSide::Home,
        contract: ContractSide::Yes,
    }
}

/// Credentials with a throwaway 1024-bit key
pub fn test_auth() -> KalshiAuth {
    let key = rsa::RsaPrivateKey::new(&mut rand::thread_rng(), 1024).expect("generate test key");
    KalshiAuth::from_key("test-key-id", key)
}

/// Two live games: Phoenix is a priced-in favourite with edge, the
/// Knicks game is a coin flip with nothing above the price floor
pub const MERGED_GAMES: &str = r#"[
    {
        "ticker": "KXNBAGAME-26MAR03DENPHX-PHO",
        "league": "nba",
        "home_team": "PHX",
        "away_team": "DEN",
        "period": 4,
        "seconds_remaining": 120,
        "home_score": 110,
        "away_score": 98,
        "home_win_probability": "0.90",
        "yes_bid": 78,
        "yes_ask": 80,
        "no_bid": 18,
        "no_ask": 20
    },
    {
        "ticker": "KXNBAGAME-26MAR03BOSNYK-NY",
        "league": "nba",
        "home_team": "NYK",
        "away_team": "BOS",
        "period": 3,
        "seconds_remaining": 1500,
        "home_score": 70,
        "away_score": 68,
        "home_win_probability": "0.55",
        "yes_bid": 57,
        "yes_ask": 60,
        "no_bid": 39,
        "no_ask": 42
    }
]"#;

/// Write `contents` to a fresh file under the system temp dir
pub fn write_snapshot(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("courtside-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("merged_games.json");
    std::fs::write(&path, contents).expect("write snapshot");
    path
}
