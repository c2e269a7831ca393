//! Command implementations

pub mod find;
pub mod modules;
pub mod path;
pub mod root;

use std::sync::Arc;

use anyhow::{bail, Result};

use crate::cli::SessionArgs;
use imh::core::Module;
use imh::model::PomParser;
use imh::ops::{BuildSession, ResolutionContext, RootLocator};
use imh::util::fs::absolute_path;
use imh::util::GlobalContext;

/// Build the session described by the command line.
pub fn build_session(ctx: &GlobalContext, args: &SessionArgs) -> Result<BuildSession> {
    let pom = match &args.file {
        Some(file) => absolute_path(&ctx.cwd().join(file)),
        None => match ctx.find_descriptor() {
            Some(pom) => pom,
            None => bail!(
                "could not find pom.xml in {} or any parent directory",
                ctx.cwd().display()
            ),
        },
    };
    if !pom.is_file() {
        bail!("descriptor not found: {}", pom.display());
    }

    let mut session = BuildSession::new(pom).started_at(std::time::SystemTime::now());
    if let Some(root_dir) = &args.root_dir {
        session = session.with_root_dir(absolute_path(&ctx.cwd().join(root_dir)));
    }
    for (key, value) in &args.define {
        session = session.with_property(key, value);
    }
    for profile in &args.profiles {
        session = session.with_profile(profile);
    }
    Ok(session)
}

/// Locate the root module or fail with a readable message.
pub fn require_root(session: &BuildSession) -> Result<Arc<Module>> {
    let parser = PomParser::new();
    let ctx = ResolutionContext::new();
    match RootLocator::new(&parser).root_module(&ctx, session) {
        Some(root) => Ok(root),
        None => bail!("no root project found for {}", session.pom.display()),
    }
}
