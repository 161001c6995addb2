//! Item kit configuration data for game mods
//!
//! [`CommonItemsData`] holds fixed item kits and groups of kits for random
//! selection. Around it sit JSON persistence ([`store`]), linting against
//! class-name rules and a known-items registry ([`validator`]), and a
//! parallel directory scanner with an incremental cache ([`scanner`],
//! [`database`]).

pub mod database;
pub mod items;
pub mod scanner;
pub mod store;
pub mod types;
pub mod utils;
pub mod validator;

pub use items::{CommonItemsData, ItemKit, ItemKitSet};

pub use types::{
    FileSummary,
    ItemsFileResult,
    ItemsScannerConfig,
    ScanOutcome,
    ScanReport,
    ScanStats,
    SkipReason,
};

pub use store::{
    load_items_data,
    load_or_default,
    save_items_data,
    StoreError,
    StoreOptions,
};

pub use validator::{
    validate_items_data,
    ItemRegistry,
    MissingItemInfo,
    ValidationReport,
};

pub use scanner::{
    build_report,
    scan,
    scan_with_config,
    unique_items,
    ItemsScanner,
};

pub use database::ScanDatabase;
