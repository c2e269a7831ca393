//! `imh find` command

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};

use crate::cli::FindArgs;
use crate::commands::build_session;
use imh::core::Coordinate;
use imh::model::PomParser;
use imh::ops::start_session;
use imh::repository::{LocalRepositoryManager, SimpleLocalRepositoryManager};
use imh::util::config::WORKSPACE_FLAG;
use imh::util::GlobalContext;

pub fn execute(args: FindArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let coord = Coordinate::parse(&args.coordinate)?;
    let session = build_session(&ctx, &args.session)?.with_property(WORKSPACE_FLAG, "true");

    let shared: Arc<dyn LocalRepositoryManager> =
        Arc::new(SimpleLocalRepositoryManager::new(ctx.local_repository()));
    let parser = PomParser::new();
    let reactor = start_session(&session, &parser, shared, &|dir: &Path| {
        Ok(Arc::new(SimpleLocalRepositoryManager::new(dir)) as Arc<dyn LocalRepositoryManager>)
    });

    if args.versions {
        let versions = reactor.find_versions(&coord);
        if versions.is_empty() {
            bail!("{} is not built in this workspace", coord.versionless_id());
        }
        for version in versions {
            println!("{}", version);
        }
        return Ok(());
    }

    match reactor.find_artifact(&coord) {
        Some(file) => {
            println!("{}", file.display());
            Ok(())
        }
        None => bail!("{} is not available in the workspace", coord.full_id()),
    }
}
