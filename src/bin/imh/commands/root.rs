//! `imh root` command

use anyhow::Result;

use crate::cli::RootArgs;
use crate::commands::{build_session, require_root};
use imh::util::GlobalContext;

pub fn execute(args: RootArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let session = build_session(&ctx, &args.session)?;
    let root = require_root(&session)?;

    println!("{}", root.descriptor().display());
    Ok(())
}
