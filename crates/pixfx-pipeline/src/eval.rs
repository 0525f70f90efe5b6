//! Pipeline evaluation.
//!
//! Filters run in document order; a nested filter runs before the filter
//! that consumes it. Each result with an `alias` is registered in the
//! [`Context`], where later filters and `<ReturnValue>` find it.

use std::collections::HashMap;

use pixfx_core::{ClipRegion, ImageAdapter};
use pixfx_ops::param::find_param;
use pixfx_ops::{Filter, ParamValue, registry};
#[allow(unused_imports)]
use tracing::{debug, info, trace};

use crate::document::{FilterNode, ImageSource, ParamSource, Pipeline};
use crate::{PipelineError, PipelineResult};

/// Evaluation state: the snapshot image and the alias table.
#[derive(Debug, Default)]
pub struct Context {
    snapshot: Option<ImageAdapter>,
    aliases: HashMap<String, ImageAdapter>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the image `<SNAPSHOT/>` resolves to.
    pub fn with_snapshot(mut self, image: ImageAdapter) -> Self {
        self.snapshot = Some(image);
        self
    }

    /// Sets or replaces the snapshot image.
    pub fn set_snapshot(&mut self, image: ImageAdapter) {
        self.snapshot = Some(image);
    }

    /// Image registered under `alias`.
    pub fn alias(&self, alias: &str) -> Option<&ImageAdapter> {
        self.aliases.get(alias)
    }

    /// Registered aliases, in no particular order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }

    fn register(&mut self, alias: &str, image: &ImageAdapter) -> PipelineResult<()> {
        if self.aliases.contains_key(alias) {
            return Err(PipelineError::DuplicateAlias(alias.to_string()));
        }
        debug!(alias, width = image.width(), height = image.height(), "register alias");
        self.aliases.insert(alias.to_string(), image.clone());
        Ok(())
    }
}

impl Pipeline {
    /// Runs the pipeline with a fresh context and returns the final image.
    pub fn run(&self) -> PipelineResult<ImageAdapter> {
        self.run_with(&mut Context::new())
    }

    /// Runs the pipeline in `ctx` and returns the image named by
    /// `<ReturnValue>`.
    pub fn run_with(&self, ctx: &mut Context) -> PipelineResult<ImageAdapter> {
        info!(filters = self.filters.len(), "running pipeline");
        for node in &self.filters {
            self.eval_node(node, ctx)?;
        }
        ctx.alias(&self.return_value)
            .cloned()
            .ok_or_else(|| PipelineError::UnknownAlias(self.return_value.clone()))
    }

    fn resolve_image(&self, src: &ImageSource, ctx: &mut Context) -> PipelineResult<ImageAdapter> {
        match src {
            ImageSource::File(path) => Ok(pixfx_io::read(self.resolve(path))?),
            ImageSource::Alias(alias) => ctx
                .alias(alias)
                .cloned()
                .ok_or_else(|| PipelineError::UnknownAlias(alias.clone())),
            ImageSource::Snapshot => ctx.snapshot.clone().ok_or(PipelineError::MissingSnapshot),
            ImageSource::Filter(node) => self.eval_node(node, ctx),
        }
    }

    fn configure(&self, node: &FilterNode, filter: &mut dyn Filter, ctx: &mut Context) -> PipelineResult<()> {
        let wrap = |e| PipelineError::filter(&node.name, e);
        for param in &node.params {
            match &param.value {
                ParamSource::Text(text) => filter.set_param_text(&param.name, text).map_err(wrap)?,
                ParamSource::Image(src) => {
                    let image = self.resolve_image(src, ctx)?;
                    let params = filter.params();
                    let canonical = find_param(&params, &param.name)
                        .map(|p| p.name)
                        .ok_or_else(|| wrap(pixfx_ops::OpsError::unknown_parameter(filter.name(), &param.name)))?;
                    filter
                        .set_param(canonical, ParamValue::Image(Some(image)))
                        .map_err(wrap)?;
                }
            }
        }
        Ok(())
    }

    fn eval_node(&self, node: &FilterNode, ctx: &mut Context) -> PipelineResult<ImageAdapter> {
        let wrap = |e| PipelineError::filter(&node.name, e);
        let mut filter = registry::create(&node.name).map_err(wrap)?;

        let source = match &node.input {
            Some(src) => self.resolve_image(src, ctx)?,
            None => return Err(PipelineError::MissingInput(node.name.clone())),
        };
        self.configure(node, filter.as_mut(), ctx)?;

        trace!(filter = %node.name, width = source.width(), height = source.height(), "evaluate");
        let result = if node.clips.is_empty() {
            filter.process(&source)
        } else {
            filter.process_clipped(&source, &ClipRegion::Rects(node.clips.clone()))
        }
        .map_err(wrap)?;

        for path in &node.outputs {
            let path = self.resolve(path);
            pixfx_io::write(&path, &result)?;
            debug!(filter = %node.name, path = %path.display(), "wrote output");
        }
        if let Some(alias) = &node.alias {
            ctx.register(alias, &result)?;
        }
        Ok(result)
    }
}
