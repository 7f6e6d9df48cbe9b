#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use scamlink::ScamlinkConfig;
use tempfile::TempDir;

pub const VICTIMS_CSV: &str = "\
report_id,phones,upi_ids,emails,platforms,scam_category,description
V-001,+91-98765-43210,,,,,\"caller said my parcel was stuck in customs\"
V-002,,refund.desk@okaxis,,WhatsApp,Refund fraud,
V-003,9876543210,,Support@Fake-Bank.example,whatsapp,,
V-004,,,,,,unrelated lottery message
";

pub const OFFICIAL_CSV: &str = "\
report_id,emails,websites,phones,description
O-001,support@fake-bank.example,,,
O-002,,https://www.nothing.example,,
O-003,,,98765 43210,\"parcel held at customs, fee demanded\"
";

/// Temp directory holding both CSVs plus a config pointing at them.
pub struct Fixture {
    pub dir: TempDir,
    pub config: ScamlinkConfig,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_csv(VICTIMS_CSV, OFFICIAL_CSV)
    }

    pub fn with_csv(victims: &str, official: &str) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let victims_path = write(dir.path(), "victim_reports.csv", victims);
        let official_path = write(dir.path(), "official_scam_records.csv", official);

        let mut config = ScamlinkConfig::default();
        config.inputs.victims = victims_path;
        config.inputs.official = official_path;
        Self { dir, config }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

pub fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

pub fn pairs(hits: &[scamlink::MatchHit]) -> Vec<(String, String)> {
    hits.iter()
        .map(|h| (h.left.to_string(), h.right.to_string()))
        .collect()
}
