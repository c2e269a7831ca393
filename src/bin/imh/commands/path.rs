//! `imh path` command

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::PathArgs;
use crate::commands::build_session;
use imh::core::Coordinate;
use imh::model::PomParser;
use imh::ops::start_session;
use imh::repository::{LocalRepositoryManager, SimpleLocalRepositoryManager};
use imh::util::config::REPOSITORY_FLAG;
use imh::util::fs::{absolute_path, normalize_lexically, to_slash_string};
use imh::util::GlobalContext;

pub fn execute(args: PathArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let coord = Coordinate::parse(&args.coordinate)?;
    let mut session = build_session(&ctx, &args.session)?;
    if !session.user_properties.contains_key(REPOSITORY_FLAG) {
        session = session.with_property(REPOSITORY_FLAG, "true");
    }

    let shared_dir = match &args.repo {
        Some(repo) => absolute_path(&ctx.cwd().join(repo)),
        None => ctx.local_repository().to_path_buf(),
    };
    let overlay_override = args.overlay.as_ref().map(|dir| absolute_path(&ctx.cwd().join(dir)));

    let shared: Arc<dyn LocalRepositoryManager> = Arc::new(SimpleLocalRepositoryManager::new(&shared_dir));
    let parser = PomParser::new();
    let reactor = start_session(&session, &parser, shared, &|dir: &Path| {
        let dir = overlay_override.as_deref().unwrap_or(dir);
        Ok(Arc::new(SimpleLocalRepositoryManager::new(dir)) as Arc<dyn LocalRepositoryManager>)
    });

    let repo = reactor.local_repository();
    let path = repo.path_for_local_artifact(&coord);
    if args.absolute {
        println!("{}", normalize_lexically(&absolute_path(&repo.base_dir().join(&path))).display());
    } else {
        println!("{}", to_slash_string(&path));
    }
    Ok(())
}
