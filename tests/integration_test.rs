use std::fs;
use std::path::PathBuf;
use anyhow::Result;
use log::debug;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use common_items::{
    build_report,
    load_items_data,
    save_items_data,
    scan_with_config,
    store,
    validate_items_data,
    CommonItemsData,
    ItemRegistry,
    ItemsScannerConfig,
    ScanDatabase,
    StoreOptions,
};

fn init() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

fn get_test_data_dir() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .expect("CARGO_MANIFEST_DIR not set");
    PathBuf::from(manifest_dir).join("test_data")
}

fn kit(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_construct_populate_and_persist() -> Result<()> {
    init();
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("common_items.json");

    let mut data = CommonItemsData::new();
    assert!(data.item_kits.is_empty());
    assert!(data.random_item_kit_groups.is_empty());

    data.item_kits.push(kit(&["Apple", "Knife"]));
    data.item_kits.push(kit(&["Bandage"]));
    data.random_item_kit_groups.push(vec![kit(&["Rope"]), kit(&["Flare", "Matches"])]);

    save_items_data(&data, &path, &StoreOptions::default())?;
    let loaded = load_items_data(&path)?;

    assert_eq!(loaded.item_kits, vec![kit(&["Apple", "Knife"]), kit(&["Bandage"])]);
    assert_eq!(loaded.random_item_kit_groups[0], vec![kit(&["Rope"]), kit(&["Flare", "Matches"])]);
    assert_eq!(loaded, data);
    Ok(())
}

#[test]
fn test_round_trip_preserves_nested_order() -> Result<()> {
    let mut data = CommonItemsData::new();
    data.item_kits.push(kit(&["Zucchini", "Apple", "Apple"]));
    data.random_item_kit_groups.push(vec![kit(&["B", "A"]), kit(&[])]);
    data.random_item_kit_groups.push(vec![]);

    for pretty in [true, false] {
        let json = store::to_json_string(&data, pretty)?;
        debug!("Serialized: {}", json);
        assert_eq!(store::from_json_str(&json)?, data);
    }
    Ok(())
}

#[test]
fn test_fixture_files_load() -> Result<()> {
    let kits_dir = get_test_data_dir().join("kits");

    let survivor = load_items_data(&kits_dir.join("survivor.json"))?;
    assert_eq!(survivor.item_kits, vec![kit(&["Apple", "Knife"]), kit(&["Bandage"])]);
    assert_eq!(survivor.random_item_kit_groups.len(), 2);
    assert_eq!(survivor.random_item_kit_groups[1], vec![kit(&["CanOpener", "TacticalBaconCan"])]);

    let legacy = load_items_data(&kits_dir.join("legacy.json"))?;
    assert_eq!(legacy.random_item_kit_groups[0][0], kit(&["Compass"]));

    assert!(load_items_data(&kits_dir.join("broken.json")).is_err());
    Ok(())
}

#[test]
fn test_registry_check_on_fixtures() -> Result<()> {
    init();
    let mut registry = ItemRegistry::new();
    registry.load_from_file(&get_test_data_dir().join("items.txt"))?;
    assert_eq!(registry.len(), 12);

    let legacy = load_items_data(&get_test_data_dir().join("kits").join("legacy.json"))?;
    assert!(validate_items_data(&legacy).is_clean());

    let missing = registry.check_items(&legacy)?;
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].item_name, "Map");
    assert_eq!(missing[0].reference_locations, vec!["random_item_kit_groups[0][1][0]".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_incremental_scan_with_saved_database() -> Result<()> {
    init();
    let temp_dir = tempdir()?;
    let kits_dir = temp_dir.path().join("kits");
    fs::create_dir(&kits_dir)?;
    let db_path = temp_dir.path().join("scan_db.json");

    let mut data = CommonItemsData::new();
    data.item_kits.push(kit(&["Apple"]));
    let options = StoreOptions::default();
    save_items_data(&data, &kits_dir.join("a.json"), &options)?;
    save_items_data(&data, &kits_dir.join("b.json"), &options)?;

    let config = ItemsScannerConfig {
        max_threads: 2,
        show_progress: false,
        ..Default::default()
    };

    let mut db = ScanDatabase::load_or_create(&db_path)?;
    let first = scan_with_config(&kits_dir, &config, Some(&mut db)).await?;
    assert_eq!(first.stats.processed, 2);
    db.save(&db_path)?;

    // Overwriting leaves b.json.bak.<timestamp> next to the file, which is not scanned
    data.item_kits.push(kit(&["Knife"]));
    let backup = save_items_data(&data, &kits_dir.join("b.json"), &options)?;
    assert!(backup.is_some());

    let mut db = ScanDatabase::load_or_create(&db_path)?;
    let second = scan_with_config(&kits_dir, &config, Some(&mut db)).await?;
    let backup = backup.expect("b.json should be backed up");
    assert!(common_items::utils::is_backup_file(&backup));
    assert!(backup.exists());
    assert_eq!(second.stats.total, 2);
    assert_eq!(second.stats.unchanged, 1);
    assert_eq!(second.stats.processed, 1);
    assert_eq!(second.results[0].name, "b");

    let report = build_report(&second);
    assert_eq!(report.unique_items.get("Knife"), Some(&1));
    Ok(())
}
