//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// imh - resolve modules of a multi-module build from their build outputs
#[derive(Parser)]
#[command(name = "imh")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the root descriptor of the module tree
    Root(RootArgs),

    /// List the modules of the tree
    Modules(ModulesArgs),

    /// Find the workspace artifact for a coordinate
    Find(FindArgs),

    /// Print where the local repository keeps an artifact
    Path(PathArgs),
}

/// Options describing the build session.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Descriptor to start from (defaults to the nearest pom.xml)
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Top-level directory of the module tree
    #[arg(long)]
    pub root_dir: Option<PathBuf>,

    /// Define a user property
    #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_property)]
    pub define: Vec<(String, String)>,

    /// Profiles to activate
    #[arg(short = 'P', long = "activate-profiles", value_delimiter = ',')]
    pub profiles: Vec<String>,
}

#[derive(Args)]
pub struct RootArgs {
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args)]
pub struct ModulesArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct FindArgs {
    /// Artifact coordinate (groupId:artifactId[:extension[:classifier]]:version)
    pub coordinate: String,

    #[command(flatten)]
    pub session: SessionArgs,

    /// List the versions the workspace offers instead
    #[arg(long)]
    pub versions: bool,
}

#[derive(Args)]
pub struct PathArgs {
    /// Artifact coordinate (groupId:artifactId[:extension[:classifier]]:version)
    pub coordinate: String,

    #[command(flatten)]
    pub session: SessionArgs,

    /// Shared local repository (defaults to ~/.m2/repository)
    #[arg(long)]
    pub repo: Option<PathBuf>,

    /// Overlay repository directory
    #[arg(long)]
    pub overlay: Option<PathBuf>,

    /// Print the absolute path
    #[arg(long)]
    pub absolute: bool,
}

/// `key=value`; a bare `key` means `key=true`.
fn parse_property(s: &str) -> Result<(String, String), String> {
    let (key, value) = s.split_once('=').unwrap_or((s, "true"));
    if key.is_empty() {
        return Err(format!("invalid property `{}`: empty key", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_property() {
        assert_eq!(
            parse_property("imh.repository=/tmp/repo"),
            Ok(("imh.repository".to_string(), "/tmp/repo".to_string()))
        );
        assert_eq!(
            parse_property("imh.workspace"),
            Ok(("imh.workspace".to_string(), "true".to_string()))
        );
        assert!(parse_property("=x").is_err());
    }

    #[test]
    fn test_define_is_repeatable() {
        let cli = Cli::parse_from(["imh", "root", "-Da=1", "-D", "b=2", "-P", "x,y"]);
        let Commands::Root(args) = cli.command else {
            panic!("expected root command");
        };
        assert_eq!(args.session.define.len(), 2);
        assert_eq!(args.session.profiles, vec!["x", "y"]);
    }
}
