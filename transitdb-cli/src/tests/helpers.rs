//! Test helpers for seeding on-disk stores and running the CLI in-process.

use super::*;
use tempfile::TempDir;
use transitdb_core::test_support::sample_feed;

/// A file store holding the sample feed under each given id.
pub(super) struct SeededStore {
    _dir: TempDir,
    locator: String,
}

impl SeededStore {
    pub(super) fn new(feed_ids: &[&str]) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let locator = dir
            .path()
            .join("feeds.db")
            .to_str()
            .expect("utf-8 temp path")
            .to_owned();
        let mut dao = Dao::open(&locator).expect("create store");
        for feed_id in feed_ids {
            dao.add_all(sample_feed(feed_id));
        }
        dao.commit().expect("seed store");
        Self { _dir: dir, locator }
    }

    pub(super) fn locator(&self) -> &str {
        &self.locator
    }
}

/// Run `transitdb <args>` and capture standard output.
pub(super) fn run_capture(args: &[&str]) -> Result<String, CliError> {
    let mut out = Vec::new();
    let argv = std::iter::once("transitdb").chain(args.iter().copied());
    run_from(argv, &mut out)?;
    Ok(String::from_utf8(out).expect("utf-8 output"))
}
