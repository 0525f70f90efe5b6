//! Apply command
//!
//! Runs one registered filter over an image, with parameters given on the
//! command line.

use crate::ApplyArgs;
use anyhow::{Context, Result, anyhow};
use pixfx_core::{ClipRegion, Rect};
use pixfx_ops::param::find_param;
use pixfx_ops::{ParamValue, registry};
#[allow(unused_imports)]
use tracing::{debug, info, trace};

pub fn run(args: ApplyArgs, verbose: u8) -> Result<()> {
    trace!(filter = %args.filter, input = %args.input.display(), "apply::run");

    let mut filter = registry::create(&args.filter)?;
    for p in &args.params {
        let (name, value) = super::split_assignment(p)?;
        filter
            .set_param_text(name, value)
            .with_context(|| format!("{}: parameter {}", filter.name(), name))?;
    }
    for p in &args.images {
        let (name, path) = super::split_assignment(p)?;
        let image = super::load_image(path.as_ref())?;
        let params = filter.params();
        let canonical = find_param(&params, name)
            .map(|p| p.name)
            .ok_or_else(|| anyhow!("{} has no parameter '{}'", filter.name(), name))?;
        filter.set_param(canonical, ParamValue::Image(Some(image)))?;
    }
    let clips = args
        .clips
        .iter()
        .map(|c| c.parse::<Rect>().with_context(|| format!("invalid clip '{}'", c)))
        .collect::<Result<Vec<_>>>()?;

    let image = super::load_image(&args.input)?;
    info!(filter = filter.name(), w = image.width(), h = image.height(), "Applying filter");
    if verbose > 0 {
        println!("Applying {} to {}", filter.name(), args.input.display());
    }

    let output = if clips.is_empty() {
        filter.process(&image)?
    } else {
        filter.process_clipped(&image, &ClipRegion::Rects(clips))?
    };

    super::save_image(&args.output, &output)?;

    if verbose > 0 {
        println!("Wrote {} ({}x{})", args.output.display(), output.width(), output.height());
    }
    Ok(())
}
