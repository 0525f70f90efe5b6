//! # pixfx-pipeline
//!
//! Filter pipelines described in XML.
//!
//! A `<FilterPipeline>` lists `<Filter>` elements, each naming a filter from
//! [`pixfx_ops::registry`], its input image, its parameters and optional
//! outputs. Results are registered under aliases; `<ReturnValue>` names the
//! final image.
//!
//! # Example
//!
//! ```rust
//! use pixfx_core::{Color, ImageAdapter};
//! use pixfx_pipeline::{Context, Pipeline};
//!
//! let doc = r#"
//!   <FilterPipeline>
//!     <Filter name="Grayscale" alias="gray">
//!       <INPUT><SNAPSHOT/></INPUT>
//!     </Filter>
//!     <ReturnValue>gray</ReturnValue>
//!   </FilterPipeline>"#;
//!
//! let snapshot = ImageAdapter::filled(2, 2, Color::rgb(1.0, 0.0, 0.0));
//! let mut ctx = Context::new().with_snapshot(snapshot);
//! let out = Pipeline::parse(doc)?.run_with(&mut ctx)?;
//! assert_eq!(out.pixel(0, 0).to_argb8().g, 76);
//! # Ok::<(), pixfx_pipeline::PipelineError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod document;
pub mod eval;
pub mod xml;

pub use document::{FilterNode, ImageSource, ParamNode, ParamSource, Pipeline};
pub use error::{PipelineError, PipelineResult};
pub use eval::Context;
