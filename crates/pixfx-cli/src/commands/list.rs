//! List command
//!
//! Prints every registered filter with its parameters.

use crate::ListArgs;
use anyhow::Result;
use pixfx_ops::{ParamDescriptor, registry};
use serde::Serialize;

#[derive(Serialize)]
struct FilterInfo {
    name: &'static str,
    params: Vec<ParamDescriptor>,
}

fn collect(only: Option<&str>) -> Result<Vec<FilterInfo>> {
    let names: Vec<&'static str> = match only {
        Some(name) => vec![registry::create(name)?.name()],
        None => registry::names().collect(),
    };
    names
        .into_iter()
        .map(|name| {
            let filter = registry::create(name)?;
            Ok(FilterInfo {
                name,
                params: filter.params().iter().map(|p| p.descriptor()).collect(),
            })
        })
        .collect()
}

pub fn run(args: ListArgs) -> Result<()> {
    let filters = collect(args.filter.as_deref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&filters)?);
        return Ok(());
    }

    for info in &filters {
        println!("{}", info.name);
        for p in &info.params {
            println!("  {:<20} {:<8} {:<16} {}", p.name, p.kind.name(), p.value, p.description);
        }
    }
    Ok(())
}
