//! `imh modules` command

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::cli::ModulesArgs;
use crate::commands::{build_session, require_root};
use imh::core::Module;
use imh::util::GlobalContext;

#[derive(Serialize)]
struct ModuleRow {
    id: String,
    packaging: String,
    base_dir: PathBuf,
    descriptor: PathBuf,
    execution_root: bool,
}

impl From<&Arc<Module>> for ModuleRow {
    fn from(module: &Arc<Module>) -> Self {
        ModuleRow {
            id: module.id(),
            packaging: module.packaging().to_string(),
            base_dir: module.base_dir().to_path_buf(),
            descriptor: module.descriptor().to_path_buf(),
            execution_root: module.is_execution_root(),
        }
    }
}

pub fn execute(args: ModulesArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let session = build_session(&ctx, &args.session)?;
    let root = require_root(&session)?;

    let mut modules = vec![Arc::clone(&root)];
    modules.extend(root.descendants());
    let rows: Vec<ModuleRow> = modules.iter().map(ModuleRow::from).collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let width = rows.iter().map(|r| r.id.len()).max().unwrap_or(0);
    for row in &rows {
        println!(
            "{:<width$}  {:<8} {}",
            row.id,
            row.packaging,
            row.base_dir.display(),
            width = width
        );
    }
    Ok(())
}
