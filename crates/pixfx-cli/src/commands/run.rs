//! Run command
//!
//! Evaluates an XML pipeline and optionally writes its ReturnValue image.

use crate::RunArgs;
use anyhow::{Context, Result};
use pixfx_pipeline::{Context as PipelineContext, Pipeline};
#[allow(unused_imports)]
use tracing::{debug, info, trace};

pub fn run(args: RunArgs, verbose: u8) -> Result<()> {
    trace!(pipeline = %args.pipeline.display(), "run::run");

    let pipeline = Pipeline::load(&args.pipeline)
        .with_context(|| format!("Failed to load pipeline: {}", args.pipeline.display()))?;

    let mut ctx = PipelineContext::new();
    if let Some(path) = &args.snapshot {
        ctx.set_snapshot(super::load_image(path)?);
    }

    let result = pipeline
        .run_with(&mut ctx)
        .with_context(|| format!("Pipeline failed: {}", args.pipeline.display()))?;
    info!(return_value = %pipeline.return_value, w = result.width(), h = result.height(), "Pipeline finished");

    if let Some(output) = &args.output {
        super::save_image(output, &result)?;
    }

    if verbose > 0 {
        println!(
            "{}: {} filter(s), result '{}' {}x{}",
            args.pipeline.display(),
            pipeline.filters.len(),
            pipeline.return_value,
            result.width(),
            result.height()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixfx_core::{Color, ImageAdapter};

    #[test]
    fn test_run_with_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("screen.png");
        super::super::save_image(&snapshot, &ImageAdapter::filled(3, 3, Color::rgb(1.0, 0.0, 0.0))).unwrap();
        let doc = dir.path().join("pipeline.xml");
        std::fs::write(
            &doc,
            r#"<FilterPipeline>
                 <Filter name="Grayscale" alias="gray"><INPUT><SNAPSHOT/></INPUT></Filter>
                 <ReturnValue>gray</ReturnValue>
               </FilterPipeline>"#,
        )
        .unwrap();

        let output = dir.path().join("result.png");
        run(
            RunArgs {
                pipeline: doc.clone(),
                output: Some(output.clone()),
                snapshot: Some(snapshot),
            },
            0,
        )
        .unwrap();
        let out = super::super::load_image(&output).unwrap();
        assert_eq!(out.pixel(2, 2).to_argb8().r, 76);

        let err = run(
            RunArgs {
                pipeline: doc,
                output: None,
                snapshot: None,
            },
            0,
        );
        assert!(err.is_err());
    }
}
