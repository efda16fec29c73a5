//! `mkrules version` command

use anyhow::Result;

use crate::cli::{GlobalArgs, VersionArgs};
use mkrules::ops::describe;

pub fn execute(global: &GlobalArgs, args: VersionArgs) -> Result<()> {
    let ctx = super::context(global)?;
    let info = describe(ctx.cwd())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", info);
    }
    Ok(())
}
