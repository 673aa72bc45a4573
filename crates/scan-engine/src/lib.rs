#![doc = include_str!("../README.md")]

pub mod api;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod lifecycle;
pub mod report;
pub mod rules;
pub mod upload;
pub mod util;

// 자주 쓰는 타입 재노출
pub use api::http::HttpScanApi;
pub use api::ScanApi;
pub use config::{ScanEngineConfig, ScanEngineConfigBuilder};
pub use discovery::FileMatcher;
pub use engine::{ScanEngine, ScanEngineBuilder, ScanOutcome};
pub use error::EngineError;
pub use report::{LABEL_COLUMN_WIDTH, ReportRow, ScanReport};
pub use rules::{HashConfig, HashableRule, ManifestPattern, ManifestRule};
pub use upload::{ManifestReceipt, UploadOutcome};
