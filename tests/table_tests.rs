//! CSV round-trip and backup behavior of the tabular store.

use tokentab::extract::PoolMetrics;
use tokentab::table::{self, TokenTable};

#[test]
fn csv_round_trips_through_load_apply_save() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tokens.csv");
    std::fs::write(&input, "network,address,stale\nethereum,0xaaa,x\nbsc,0xbbb,y\n").unwrap();

    let mut table = TokenTable::load(&input).unwrap();
    table.apply_metrics(vec![
        PoolMetrics {
            fdv: "$1.2M".to_string(),
            liquidity: "$500K".to_string(),
            volume_24h: "$45.3K".to_string(),
        },
        PoolMetrics::zero(),
    ]);

    let result = table::derived_path(&input, "_result");
    table.save(&result).unwrap();

    let reloaded = TokenTable::load(&result).unwrap();
    assert_eq!(reloaded.len(), 2);
    let tasks = reloaded.tasks();
    assert_eq!(tasks[0].network, "ethereum");
    assert_eq!(tasks[1].address, "0xbbb");

    let content = std::fs::read_to_string(&result).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next().unwrap(), "network,address,FDV,Liquidity,24h Volume");
    assert_eq!(lines.next().unwrap(), "ethereum,0xaaa,$1.2M,$500K,$45.3K");
    assert_eq!(lines.next().unwrap(), "bsc,0xbbb,0,0,0");
}

#[test]
fn backup_copies_the_pristine_input_before_results_land() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tokens.csv");
    let original = "network,address\nethereum,0xaaa\n";
    std::fs::write(&input, original).unwrap();

    let backup_path = table::backup(&input).unwrap();
    assert_eq!(backup_path, dir.path().join("tokens_backup.csv"));
    assert_eq!(std::fs::read_to_string(&backup_path).unwrap(), original);

    // Writing results afterwards must not touch the backup.
    let mut table = TokenTable::load(&input).unwrap();
    table.apply_decimals(vec![6]);
    table.save(table::derived_path(&input, "_with_decimals")).unwrap();
    assert_eq!(std::fs::read_to_string(&backup_path).unwrap(), original);
}

#[test]
fn backup_fails_when_the_input_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(table::backup(dir.path().join("absent.csv")).is_err());
}
