//! Build, summary and list commands

use crate::cli::display::{table::AppInfo, TableRenderer};
use crate::domain::build::{BuildDescriptor, BuildOptions};
use crate::domain::environment::EnvironmentOptions;
use crate::infrastructure::kubernetes::resources::created_at_label;
use crate::infrastructure::output::FsManifestSink;
use crate::infrastructure::secrets::{
    DisabledDecryptor, EncjsonConfig, EncjsonDecryptor, SecretDecryptor,
};
use clap::{Args, Parser};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Arguments shared by every command that loads an environment.
#[derive(Args, Debug, Clone)]
pub struct EnvArgs {
    /// Environment name (directory below the environments root)
    #[arg(long = "env", short = 'e')]
    pub env_name: String,

    /// Target directory for generated manifests
    #[arg(long, short = 't')]
    pub target: Option<PathBuf>,

    /// Decrypt env.secured.json with encjson
    #[arg(long)]
    pub decrypt: bool,

    /// Release manifest pinning images (defaults to <env>/release.manifest.yml when present)
    #[arg(long, value_name = "PATH")]
    pub release_manifest: Option<PathBuf>,

    /// Replica profile to apply (falls back to REPLICA_PROFILE, then the file's default)
    #[arg(long)]
    pub profile: Option<String>,

    /// Replica profiles file (defaults to <env>/replica.profiles.yml when present)
    #[arg(long, value_name = "PATH")]
    pub profile_file: Option<PathBuf>,

    /// Applications forced to zero replicas
    #[arg(long, value_delimiter = ',', value_name = "APP,...")]
    pub downscale: Vec<String>,

    /// Root holding one directory per environment
    #[arg(long, env = "ENVIRONMENTS_DIR", hide_env_values = true)]
    pub environments_dir: Option<PathBuf>,

    /// Root for output when --target is not given
    #[arg(long, env = "TARGET_DIR", hide_env_values = true)]
    pub target_root: Option<PathBuf>,

    /// encjson executable
    #[arg(long, env = "ENCJSON_BIN")]
    pub encjson_bin: Option<String>,

    /// encjson key directory (defaults to $HOME/.encjson)
    #[arg(long, env = "ENCJSON_KEYDIR")]
    pub encjson_keydir: Option<PathBuf>,
}

impl EnvArgs {
    fn options(&self) -> BuildOptions {
        BuildOptions {
            environment: EnvironmentOptions {
                name: self.env_name.clone(),
                environments_dir: self.environments_dir.clone(),
                target_dir: self.target.clone(),
                target_root: self.target_root.clone(),
                decrypt_secured: self.decrypt,
            },
            release_manifest: self.release_manifest.clone(),
            profile: self.profile.clone(),
            profile_file: self.profile_file.clone(),
            downscale: self.downscale.clone(),
        }
    }

    fn decryptor(&self, process_env: &BTreeMap<String, String>) -> Box<dyn SecretDecryptor> {
        if self.decrypt {
            Box::new(EncjsonDecryptor::new(EncjsonConfig::new(
                self.encjson_bin.clone(),
                self.encjson_keydir.clone(),
                process_env.get("HOME").map(String::as_str),
            )))
        } else {
            Box::new(DisabledDecryptor)
        }
    }

    /// Loads the environment against a snapshot of the process environment.
    pub fn load(&self) -> anyhow::Result<BuildDescriptor> {
        let process_env: BTreeMap<String, String> = std::env::vars().collect();
        let decryptor = self.decryptor(&process_env);
        BuildDescriptor::load(&self.options(), process_env, decryptor.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to load environment '{}': {}", self.env_name, e))
    }
}

#[derive(Parser, Debug, Clone)]
pub struct BuildCommand {
    #[command(flatten)]
    pub env: EnvArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct SummaryCommand {
    #[command(flatten)]
    pub env: EnvArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    #[command(flatten)]
    pub env: EnvArgs,
}

impl BuildCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let descriptor = self.env.load()?;
        let target = descriptor.env().target_dir().to_path_buf();
        let created_at = created_at_label(chrono::Utc::now());

        let sink = FsManifestSink::new(&target);
        let written = descriptor
            .build(&sink, &created_at)
            .await
            .map_err(|e| anyhow::anyhow!("Build failed: {}", e))?;

        println!(
            "✓ {} manifest(s) for {} application(s) written to {}",
            written.len().to_string().green(),
            descriptor.apps().len(),
            target.display()
        );
        Ok(())
    }
}

impl SummaryCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let descriptor = self.env.load()?;
        let summary = descriptor
            .summary()
            .map_err(|e| anyhow::anyhow!("Failed to summarize resources: {}", e))?;

        let renderer = TableRenderer::new();
        println!("{}", renderer.render_summary(&summary));
        Ok(())
    }
}

impl ListCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let descriptor = self.env.load()?;

        let apps: Vec<AppInfo> = descriptor
            .apps()
            .iter()
            .map(|app| AppInfo {
                name: app.name.clone(),
                kind: app.kind.to_string(),
                replicas: app.replicas,
                containers: app.containers.iter().map(|c| c.name.clone()).collect(),
                images: app.containers.iter().map(|c| c.image.clone()).collect(),
            })
            .collect();

        let renderer = TableRenderer::new();
        println!(
            "{}",
            renderer.render_apps_list(descriptor.env().name(), descriptor.env().namespace(), &apps)
        );
        Ok(())
    }
}
