//! One complete sync run.
//!
//! The run is strictly ordered: the snapshot is fetched in full, every
//! artifact is compiled, then artifacts are written to a scratch directory,
//! encoded, and installed one by one. Any error before installation leaves
//! the live files untouched. Installation failures are collected per
//! artifact instead of stopping the run.

use std::{
    fs::Permissions,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    Config, Result,
    alias::{AliasArtifacts, AliasCompiler, AliasTemplate},
    directory::{DirectorySnapshot, DirectorySource, client::MATCH_ALL, fetch_snapshot},
    index::MembershipIndex,
    install::{
        Artifact, DbEncoder, InstallError, InstallReport, PRIVATE_MODE, PUBLIC_MODE, ScratchDir,
        install_all, install_bytes,
    },
    record::{Category, CompiledRecords, RecordCompiler},
};

pub const ALIASES_FILE: &str = "aliases";
pub const RELAY_RECIPIENTS_FILE: &str = "relay_recipient_maps";

/// What a run fetches and installs.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Pattern passed to both directory list calls.
    pub search: String,
    pub install_passwd: bool,
    pub install_shadow: bool,
    pub install_group: bool,
    /// Also compile and install the alias file and relay recipient map.
    pub aliases: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            search: MATCH_ALL.to_string(),
            install_passwd: true,
            install_shadow: true,
            install_group: true,
            aliases: false,
        }
    }
}

impl SyncOptions {
    pub fn installs(&self, category: Category) -> bool {
        match category {
            Category::Passwd => self.install_passwd,
            Category::Shadow => self.install_shadow,
            Category::Group => self.install_group,
        }
    }
}

/// Everything compiled from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifacts {
    /// Number of people authorized on this host.
    pub authorized: usize,
    pub records: CompiledRecords,
    pub aliases: Option<AliasArtifacts>,
}

/// Summary of a finished run.
#[derive(Debug)]
pub struct SyncReport {
    pub people: usize,
    pub groups: usize,
    pub authorized: usize,
    pub install: InstallReport,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.install.is_success()
    }
}

/// Compile every artifact from a snapshot.
///
/// The alias template is read only when alias artifacts are requested; a
/// missing template fails the whole compilation.
pub async fn compile(
    config: &Config,
    snapshot: &DirectorySnapshot,
    aliases: bool,
) -> Result<CompiledArtifacts> {
    let index = MembershipIndex::new(snapshot.memberships());
    let settings = config.account_settings();
    let records = RecordCompiler::new(snapshot, &index, &settings).compile_all()?;

    let aliases = if aliases {
        let template = AliasTemplate::load(&config.host.aliases_template).await?;
        let compiler = AliasCompiler::new(snapshot, &index, &template, &config.host.alias_domain)?;
        Some(compiler.compile())
    } else {
        None
    };
    Ok(CompiledArtifacts {
        authorized: index.valid_user_count(),
        records,
        aliases,
    })
}

fn category_mode(category: Category) -> u32 {
    if category.is_private() {
        PRIVATE_MODE
    } else {
        PUBLIC_MODE
    }
}

pub struct SyncRun<'a> {
    config: &'a Config,
    source: &'a dyn DirectorySource,
    encoder: &'a dyn DbEncoder,
}

impl<'a> SyncRun<'a> {
    pub fn new(
        config: &'a Config,
        source: &'a dyn DirectorySource,
        encoder: &'a dyn DbEncoder,
    ) -> Self {
        Self {
            config,
            source,
            encoder,
        }
    }

    /// Fetch, compile, encode and install.
    pub async fn run(&self, options: &SyncOptions) -> Result<SyncReport> {
        let snapshot = fetch_snapshot(self.source, &options.search).await?;
        let compiled = compile(self.config, &snapshot, options.aliases).await?;

        let scratch = ScratchDir::create(&self.config.global.temp)?;
        let mut report = InstallReport::default();
        let mut artifacts = Vec::new();

        for category in Category::ALL {
            let set = compiled.records.get(category);
            let mode = category_mode(category);
            let text = scratch
                .write(&format!("{category}.txt"), &set.to_text(), mode)
                .await?;
            let db = scratch.join(&format!("{category}.db"));
            if let Err(err) = encode_artifact(self.encoder, &text, &db, mode).await {
                report.record_failure(category.name(), err);
                continue;
            }
            if options.installs(category) {
                artifacts.push(Artifact {
                    label: category.name().to_string(),
                    source: db,
                    destination: self.destination(category).to_path_buf(),
                    mode,
                });
            } else {
                debug!(artifact = %category, "Skipping install");
            }
        }

        if let Some(aliases) = &compiled.aliases {
            let paths = &self.config.paths;
            for (name, contents, destination) in [
                (ALIASES_FILE, &aliases.aliases, &paths.aliases),
                (RELAY_RECIPIENTS_FILE, &aliases.relay_recipients, &paths.relay_recipients),
            ] {
                let source = scratch.write(name, contents, PUBLIC_MODE).await?;
                artifacts.push(Artifact {
                    label: name.to_string(),
                    source,
                    destination: destination.clone(),
                    mode: PUBLIC_MODE,
                });
            }
        }

        let report = tokio::task::spawn_blocking(move || {
            install_all(&artifacts, &mut report);
            report
        })
        .await
        .map_err(std::io::Error::other)?;
        let summary = SyncReport {
            people: snapshot.people().len(),
            groups: snapshot.groups().len(),
            authorized: compiled.authorized,
            install: report,
        };
        info!(
            installed = summary.install.installed.len(),
            failed = summary.install.failures.len(),
            "Sync run finished"
        );
        Ok(summary)
    }

    fn destination(&self, category: Category) -> &Path {
        let paths = &self.config.paths;
        match category {
            Category::Passwd => &paths.passwd_db,
            Category::Shadow => &paths.shadow_db,
            Category::Group => &paths.group_db,
        }
    }
}

/// Encode `text` into `db`, then give the database the mode of its text.
///
/// Encoders create files with their own default mode, so a credential
/// database is restricted again before anything else can read it.
async fn encode_artifact(
    encoder: &dyn DbEncoder,
    text: &Path,
    db: &Path,
    mode: u32,
) -> std::result::Result<(), InstallError> {
    encoder.encode(text, db).await?;
    tokio::fs::set_permissions(db, Permissions::from_mode(mode))
        .await
        .map_err(|source| InstallError::WriteFailed {
            path: db.to_path_buf(),
            source,
        })
}

/// Fetch and compile, writing the text artifacts to `dir` without encoding
/// or installing anything.
pub async fn compile_to_dir(
    config: &Config,
    source: &dyn DirectorySource,
    options: &SyncOptions,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let snapshot = fetch_snapshot(source, &options.search).await?;
    let compiled = compile(config, &snapshot, options.aliases).await?;

    let mut files = Vec::new();
    for category in Category::ALL {
        files.push((
            dir.join(format!("{category}.txt")),
            compiled.records.get(category).to_text(),
            category_mode(category),
        ));
    }
    if let Some(aliases) = compiled.aliases {
        files.push((dir.join(ALIASES_FILE), aliases.aliases, PUBLIC_MODE));
        files.push((
            dir.join(RELAY_RECIPIENTS_FILE),
            aliases.relay_recipients,
            PUBLIC_MODE,
        ));
    }

    tokio::fs::create_dir_all(dir).await?;
    let written = tokio::task::spawn_blocking(move || {
        files
            .into_iter()
            .map(|(path, contents, mode)| {
                install_bytes(contents.as_bytes(), &path, mode).map(|()| path)
            })
            .collect::<std::result::Result<Vec<_>, InstallError>>()
    })
    .await
    .map_err(std::io::Error::other)??;
    info!(dir = %dir.display(), files = written.len(), "Wrote compiled artifacts");
    Ok(written)
}
