//! Integration tests for pixfx crates.
//!
//! End-to-end checks that cross crate boundaries: PNG files through
//! filters, XML pipelines on disk, and filter properties that only hold
//! when core, math and ops agree.

#[cfg(test)]
mod tests {
    use pixfx_core::{Color, ImageAdapter, Rect};
    use pixfx_math::Matrix2x3;
    use pixfx_ops::{
        BlurFilter, ConvolutionFilter, Filter, FilterChain, GrayscaleFilter, HistogramStretchFilter,
        Kernel, KernelPreset, LogicalOperationFilter, SpatialTransformFilter, registry,
    };
    use pixfx_pipeline::{Context, Pipeline, PipelineError};
    use std::fs;
    use tempfile::tempdir;

    fn gradient(w: usize, h: usize) -> ImageAdapter {
        ImageAdapter::new(w, h).map_indexed(|x, y, _| {
            Color::from_argb8(255, (x * 255 / w.max(2).saturating_sub(1)) as u8, (y * 17) as u8, 90)
        })
    }

    fn same_bytes(a: &ImageAdapter, b: &ImageAdapter) -> bool {
        a.dimensions() == b.dimensions() && a.to_rgba8() == b.to_rgba8()
    }

    /// load -> filter -> save -> load
    #[test]
    fn test_png_through_filter() {
        let dir = tempdir().unwrap();
        let src_path = dir.path().join("src.png");
        let out_path = dir.path().join("gray.png");

        let src = gradient(16, 8);
        pixfx_io::write(&src_path, &src).expect("Failed to write PNG");
        let loaded = pixfx_io::read(&src_path).expect("Failed to read PNG");
        assert!(same_bytes(&src, &loaded));

        let gray = GrayscaleFilter.process(&loaded).unwrap();
        pixfx_io::write(&out_path, &gray).unwrap();
        let back = pixfx_io::read(&out_path).unwrap();
        assert!(same_bytes(&gray, &back));

        for (_, _, c) in back.pixels() {
            let px = c.to_argb8();
            assert_eq!(px.r, px.g);
            assert_eq!(px.g, px.b);
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let err = pixfx_io::write(dir.path().join("out.bmp"), &gradient(2, 2));
        assert!(err.is_err());
    }

    /// Relative FILE paths resolve against the pipeline document.
    #[test]
    fn test_pipeline_from_disk() {
        let dir = tempdir().unwrap();
        let input = ImageAdapter::filled(6, 4, Color::rgb(1.0, 0.0, 0.0));
        pixfx_io::write(dir.path().join("input.png"), &input).unwrap();

        let doc = r#"<?xml version="1.0"?>
<FilterPipeline>
  <Filter name="Grayscale" alias="gray">
    <INPUT><FILE>input.png</FILE></INPUT>
    <OUTPUT><FILE>gray.png</FILE></OUTPUT>
  </Filter>
  <Filter name="LogicalOperation" alias="inverted">
    <INPUT>
      <ALIAS>gray</ALIAS>
      <Parameter name="Operation">Not</Parameter>
      <Clip x="0" y="0" width="3" height="4"/>
    </INPUT>
    <OUTPUT><FILE>inverted.png</FILE></OUTPUT>
  </Filter>
  <ReturnValue>inverted</ReturnValue>
</FilterPipeline>"#;
        let doc_path = dir.path().join("pipeline.xml");
        fs::write(&doc_path, doc).unwrap();

        let pipeline = Pipeline::load(&doc_path).unwrap();
        assert_eq!(pipeline.filters.len(), 2);

        let mut ctx = Context::new();
        let result = pipeline.run_with(&mut ctx).unwrap();

        let gray = pixfx_io::read(dir.path().join("gray.png")).unwrap();
        assert_eq!(gray.pixel(0, 0).to_argb8().g, 76);

        let written = pixfx_io::read(dir.path().join("inverted.png")).unwrap();
        assert!(same_bytes(&written, &result));
        assert_eq!(result.pixel(1, 1).to_argb8().r, 255 - 76);
        assert_eq!(result.pixel(4, 1).to_argb8().r, 76);
        assert!(ctx.alias("gray").is_some());
    }

    #[test]
    fn test_pipeline_missing_file() {
        let dir = tempdir().unwrap();
        let doc_path = dir.path().join("pipeline.xml");
        fs::write(
            &doc_path,
            r#"<FilterPipeline>
                 <Filter name="Identity" alias="a"><INPUT><FILE>nope.png</FILE></INPUT></Filter>
                 <ReturnValue>a</ReturnValue>
               </FilterPipeline>"#,
        )
        .unwrap();
        let err = Pipeline::load(&doc_path).unwrap().run().unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[test]
    fn test_pipeline_document_missing() {
        let dir = tempdir().unwrap();
        assert!(Pipeline::load(dir.path().join("absent.xml")).is_err());
    }

    #[test]
    fn test_identity_matrix_is_identity() {
        let img = gradient(9, 7);
        let out = SpatialTransformFilter::new()
            .with_matrix(Matrix2x3::IDENTITY)
            .process(&img)
            .unwrap();
        assert!(same_bytes(&img, &out));
    }

    #[test]
    fn test_rotate_180_twice() {
        let img = gradient(8, 6);
        let rotate = SpatialTransformFilter::new()
            .with_rotation(180.0)
            .with_resize_output(true);
        let once = rotate.process(&img).unwrap();
        assert_eq!(once.pixel(0, 0), img.pixel(7, 5));
        let twice = rotate.process(&once).unwrap();
        assert!(same_bytes(&img, &twice));
    }

    #[test]
    fn test_blur_zero_radius() {
        let img = gradient(10, 10);
        let out = BlurFilter::new(0.0).unwrap().process(&img).unwrap();
        assert!(same_bytes(&img, &out));
    }

    #[test]
    fn test_single_tap_kernel() {
        let img = gradient(5, 5);
        let k = Kernel::new(1, 1, vec![1.0]).unwrap();
        let out = ConvolutionFilter::new(k).process(&img).unwrap();
        assert!(same_bytes(&img, &out));
    }

    #[test]
    fn test_smooth_uniform() {
        let img = ImageAdapter::filled(6, 6, Color::from_argb8(255, 40, 120, 200));
        let out = ConvolutionFilter::preset(KernelPreset::Smooth).process(&img).unwrap();
        assert!(same_bytes(&img, &out));
    }

    #[test]
    fn test_grayscale_red() {
        let img = ImageAdapter::filled(2, 2, Color::rgb(1.0, 0.0, 0.0));
        let px = GrayscaleFilter.process(&img).unwrap().pixel(1, 1).to_argb8();
        assert_eq!((px.r, px.g, px.b), (76, 76, 76));
    }

    #[test]
    fn test_not_twice() {
        let img = gradient(7, 3);
        let chain = FilterChain::new()
            .with(LogicalOperationFilter::not())
            .with(LogicalOperationFilter::not());
        assert!(same_bytes(&img, &chain.process(&img).unwrap()));
    }

    #[test]
    fn test_stretch_idempotent() {
        let img = ImageAdapter::new(4, 1).map_indexed(|x, _, _| {
            let v = 60 + x as u8 * 20;
            Color::from_argb8(255, v, v, v)
        });
        let once = HistogramStretchFilter.process(&img).unwrap();
        let twice = HistogramStretchFilter.process(&once).unwrap();
        assert_eq!(once.pixel(0, 0).to_argb8().r, 0);
        assert_eq!(once.pixel(3, 0).to_argb8().r, 255);
        assert!(same_bytes(&once, &twice));
    }

    #[test]
    fn test_registry_clip_outside_unchanged() {
        let img = gradient(8, 8);
        let mut blur = registry::create("blur").unwrap();
        blur.set_param_text("Radius", "2").unwrap();
        let clip = pixfx_core::ClipRegion::Rects(vec![Rect::new(2, 2, 4, 4)]);
        let out = blur.process_clipped(&img, &clip).unwrap();
        assert_eq!(out.pixel(0, 0), img.pixel(0, 0));
        assert_eq!(out.pixel(7, 7), img.pixel(7, 7));
    }

    #[test]
    fn test_every_filter_runs_on_default_params() {
        let img = gradient(16, 16);
        for name in registry::names() {
            let filter = registry::create(name).unwrap();
            let out = filter.process(&img);
            assert!(out.is_ok(), "{} failed: {:?}", name, out.err());
        }
    }
}
