// CLI command definitions

use super::build::{BuildCommand, ListCommand, SummaryCommand};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "kube-build-app",
    version,
    about = "Builds Kubernetes manifests from application descriptors",
    long_about = "Reads the application descriptors of one environment and writes the Kubernetes manifests (workloads, services, ingresses, routes, config maps) to its target directory"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate every manifest of an environment
    Build(BuildCommand),

    /// Show CPU and memory requests/limits of all containers
    Summary(SummaryCommand),

    /// List applications after overrides
    List(ListCommand),
}
