//! `ocbind symbols` commands

use anyhow::Result;

use super::Session;
use crate::cli::{RegistryArgs, SymbolsArgs, SymbolsCommands, SymbolsDiffArgs};
use ocbind::core::SymbolRegistry;
use ocbind::ops::symbols::{check, diff, registry_path};
use ocbind::util::diagnostic::{emit, Diagnostic};
use ocbind::util::hash;

pub fn execute(session: &Session, args: SymbolsArgs) -> Result<i32> {
    match args.command {
        SymbolsCommands::Check(args) => execute_check(session, args),
        SymbolsCommands::Diff(args) => execute_diff(session, args),
        SymbolsCommands::List(args) => execute_list(session, args),
    }
}

fn execute_check(session: &Session, args: RegistryArgs) -> Result<i32> {
    let config = session.config()?;
    let path = registry_path(&session.ctx, &config, args.path.as_deref());

    let registry = check(&path)?;
    eprintln!(
        "    Checked {} symbols in {} ({})",
        registry.len(),
        path.display(),
        hash::short(&registry.fingerprint())
    );

    Ok(0)
}

fn execute_diff(session: &Session, args: SymbolsDiffArgs) -> Result<i32> {
    let cwd = session.ctx.cwd();
    let drift = diff(&cwd.join(&args.old), &cwd.join(&args.new))?;

    print!("{}", drift);

    if drift.is_empty() {
        eprintln!("    No drift ({} symbols in common)", drift.unchanged);
        return Ok(0);
    }

    emit(
        &Diagnostic::warning(format!(
            "{} added, {} removed, {} unchanged",
            drift.added.len(),
            drift.removed.len(),
            drift.unchanged
        )),
        session.ctx.color(),
    );

    Ok(if args.exit_code { 1 } else { 0 })
}

fn execute_list(session: &Session, args: RegistryArgs) -> Result<i32> {
    let config = session.config()?;
    let path = registry_path(&session.ctx, &config, args.path.as_deref());

    let registry = SymbolRegistry::load(&path)?;
    for name in registry.names() {
        println!("{}", name);
    }
    eprintln!(
        "    {} symbols, fingerprint {}",
        registry.len(),
        registry.fingerprint()
    );

    Ok(0)
}
