//! Snapshot file → engine → executor → ledger

mod common;

use common::{write_snapshot, MERGED_GAMES};
use courtside::config::TradingConfig;
use courtside::{
    AdapterError, BankrollLedger, DecisionEngine, DryRunExecutor, EngineError, ExecutionAdapter,
    OrderType, PaperExecutor, SnapshotFeed, TradingLoop,
};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use std::time::Duration;
use tokio::sync::watch;

const PHX_GAME: &str = "KXNBAGAME-26MAR03DENPHX";

fn trading_loop<A: ExecutionAdapter>(snapshot: &std::path::Path, adapter: A) -> TradingLoop<SnapshotFeed, A> {
    TradingLoop::new(
        SnapshotFeed::new(snapshot),
        adapter,
        DecisionEngine::new(TradingConfig::default()),
        BankrollLedger::new(dec!(288)),
        Duration::from_millis(20),
    )
}

#[test_log::test(tokio::test)]
async fn test_paper_tick_enters_favourite_and_books_fill() {
    let snapshot = write_snapshot("paper", MERGED_GAMES);
    let mut trading = trading_loop(&snapshot, PaperExecutor::new());

    let summary = trading.run_tick().await.unwrap();
    assert_eq!(summary.opportunities, 4);
    assert_eq!(summary.submitted, 1);
    // Knicks game is under the price floor on both sides
    assert_eq!(summary.rejected, 2);
    // Denver side of the Phoenix game sees the fresh fill
    assert_eq!(summary.position_ceiling, 1);
    assert_eq!(summary.filled_contracts, 24);

    let orders = trading.adapter().orders().await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].game_id, PHX_GAME);
    assert_eq!(orders[0].ticker, "KXNBAGAME-26MAR03DENPHX-PHO");
    assert_eq!(orders[0].limit_price_cents, 80);
    assert_eq!(orders[0].order_type, OrderType::Maker);

    assert_eq!(trading.ledger().deployed(), dec!(19.20));
    assert_eq!(trading.ledger().total_capital(), dec!(287.93));

    // Position is now held, so the game is skipped from here on
    let summary = trading.run_tick().await.unwrap();
    assert_eq!(summary.submitted, 0);
    assert_eq!(summary.already_entered, 1);
    assert_eq!(summary.position_ceiling, 1);
    assert_eq!(summary.settled, 0);
    assert_eq!(trading.adapter().orders().await.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_resting_maker_order_blocks_reentry() {
    let snapshot = write_snapshot("resting", MERGED_GAMES);
    let mut trading = trading_loop(&snapshot, PaperExecutor::resting());

    let summary = trading.run_tick().await.unwrap();
    assert_eq!(summary.submitted, 1);
    assert_eq!(summary.filled_contracts, 0);
    // The unfilled order already counts toward the game's exposure
    assert_eq!(summary.position_ceiling, 1);
    assert_eq!(trading.ledger().deployed(), dec!(19.20));
    assert_eq!(trading.ledger().total_capital(), dec!(288));

    for _ in 0..2 {
        let summary = trading.run_tick().await.unwrap();
        assert_eq!(summary.submitted, 0);
    }
    assert_eq!(trading.adapter().orders().await.len(), 1);
    assert_eq!(trading.adapter().get_position(PHX_GAME).await.unwrap(), 24);
}

#[test_log::test(tokio::test)]
async fn test_settled_game_releases_capital() {
    let snapshot = write_snapshot("settle", MERGED_GAMES);
    let mut trading = trading_loop(&snapshot, PaperExecutor::new());

    trading.run_tick().await.unwrap();
    assert_eq!(trading.ledger().deployed(), dec!(19.20));

    let settled = trading.adapter().settle(PHX_GAME, true).await.unwrap();
    assert_eq!(settled.cost, dec!(19.20));
    assert_eq!(settled.payout, dec!(24));

    let summary = trading.run_tick().await.unwrap();
    assert_eq!(summary.settled, 1);
    // The game's market was already entered this session
    assert_eq!(summary.submitted, 0);
    assert_eq!(summary.already_entered, 1);
    assert_eq!(trading.ledger().deployed(), dec!(0));
    assert_eq!(trading.ledger().total_capital(), dec!(292.73));
    assert_eq!(trading.ledger().realized_pnl(), dec!(4.73));
}

#[test_log::test(tokio::test)]
async fn test_dry_run_logs_intent_without_moving_money() {
    let snapshot = write_snapshot("dry-run", MERGED_GAMES);
    let mut trading = trading_loop(&snapshot, DryRunExecutor::new(PaperExecutor::new()));

    let summary = trading.run_tick().await.unwrap();
    assert_eq!(summary.submitted, 1);
    assert_eq!(summary.filled_contracts, 0);
    assert_eq!(trading.ledger().deployed(), dec!(0));
    assert_eq!(trading.ledger().total_capital(), dec!(288));

    let intents = trading.adapter().intents().await;
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].contract_count, 24);
    assert!(trading.adapter().inner().orders().await.is_empty());

    // The simulated entry counts toward the per-game ceiling
    let summary = trading.run_tick().await.unwrap();
    assert_eq!(summary.submitted, 0);
    assert_eq!(summary.already_entered, 1);
    assert_eq!(summary.position_ceiling, 1);
}

#[tokio::test]
async fn test_missing_snapshot_fails_tick() {
    let mut trading = trading_loop(
        std::path::Path::new("does/not/exist/merged_games.json"),
        PaperExecutor::new(),
    );
    let err = trading.run_tick().await.unwrap_err();
    assert!(matches!(err, EngineError::Adapter(AdapterError::Io(_))));
}

#[tokio::test]
async fn test_run_until_shutdown() {
    let snapshot = write_snapshot("run", MERGED_GAMES);
    let mut trading = trading_loop(&snapshot, PaperExecutor::new());

    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(async move {
        trading.run(rx).await.unwrap();
        trading
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.send(true).unwrap();

    let trading = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    // Several ticks ran but the game was entered once
    assert_eq!(trading.adapter().orders().await.len(), 1);
    assert_eq!(trading.ledger().deployed(), dec!(19.20));
}
