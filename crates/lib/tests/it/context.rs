//! Test context for full sync runs.
//!
//! A `SyncContext` owns a temporary directory standing in for the host: the
//! scratch root, the live database locations and the alias template all
//! live inside it, so runs never touch the real system.

use std::path::{Path, PathBuf};

use fas_client::{
    Config, SyncOptions, SyncReport, SyncRun,
    install::DbEncoder,
    record::{Category, RecordTable},
};
use tempfile::TempDir;

use crate::helpers::{CopyEncoder, StaticDirectory};

pub struct SyncContext {
    dir: TempDir,
    config: Config,
}

impl SyncContext {
    /// Create a host directory with `var/db`, `etc` and `tmp` subdirectories.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create test host dir");
        for sub in ["var/db", "etc/postfix", "tmp"] {
            std::fs::create_dir_all(dir.path().join(sub)).expect("Failed to create host subdir");
        }
        let root = dir.path().display();
        let config = Config::from_toml(&format!(
            r#"
            [global]
            url = "https://accounts.example.org/accounts/"
            login = "sync"
            password = "secret"
            temp = "{root}/tmp"

            [users]
            home = "/home/fedora"
            shell = "/bin/bash"

            [host]
            aliases_template = "{root}/etc/aliases.template"
            alias_domain = "fedoraproject.org"

            [paths]
            passwd_db = "{root}/var/db/passwd.db"
            shadow_db = "{root}/var/db/shadow.db"
            group_db = "{root}/var/db/group.db"
            aliases = "{root}/etc/aliases"
            relay_recipients = "{root}/etc/postfix/relay_recipients"
            authconfig = "{root}/etc/authconfig"
            "#
        ))
        .expect("Failed to build test config");
        Self { dir, config }
    }

    /// Write the alias template the config points at.
    pub fn with_template(self, text: &str) -> Self {
        std::fs::write(&self.config.host.aliases_template, text)
            .expect("Failed to write alias template");
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub async fn run(
        &self,
        directory: &StaticDirectory,
        options: &SyncOptions,
    ) -> fas_client::Result<SyncReport> {
        self.run_with(directory, &CopyEncoder, options).await
    }

    pub async fn run_with(
        &self,
        directory: &StaticDirectory,
        encoder: &dyn DbEncoder,
        options: &SyncOptions,
    ) -> fas_client::Result<SyncReport> {
        SyncRun::new(&self.config, directory, encoder)
            .run(options)
            .await
    }

    pub fn live_path(&self, category: Category) -> PathBuf {
        let paths = &self.config.paths;
        match category {
            Category::Passwd => paths.passwd_db.clone(),
            Category::Shadow => paths.shadow_db.clone(),
            Category::Group => paths.group_db.clone(),
        }
    }

    /// Parse an installed database written by `CopyEncoder`.
    pub fn installed_table(&self, category: Category) -> RecordTable {
        let text = std::fs::read_to_string(self.live_path(category))
            .expect("Failed to read installed database");
        RecordTable::parse(&text)
    }

    /// Names of entries left in the scratch root.
    pub fn scratch_leftovers(&self) -> Vec<String> {
        std::fs::read_dir(&self.config.global.temp)
            .expect("Failed to list scratch root")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect()
    }
}
