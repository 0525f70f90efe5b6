//! Pipeline documents.
//!
//! ```xml
//! <FilterPipeline>
//!   <Filter name="Blur" alias="soft">
//!     <INPUT>
//!       <FILE>input.png</FILE>
//!       <Parameter name="Radius">2.5</Parameter>
//!       <Clip x="0" y="0" width="32" height="32"/>
//!     </INPUT>
//!     <OUTPUT><FILE>soft.png</FILE></OUTPUT>
//!   </Filter>
//!   <ReturnValue>soft</ReturnValue>
//! </FilterPipeline>
//! ```
//!
//! An image is named by `<FILE>`, `<ALIAS>`, `<SNAPSHOT/>` or a nested
//! `<Filter>`, both as the input of a filter and as the value of an
//! image-valued `<Parameter>`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use pixfx_core::Rect;

use crate::xml::{self, Element};
use crate::{PipelineError, PipelineResult};

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Image file, relative to the document directory unless absolute.
    File(PathBuf),
    /// Result of an earlier filter.
    Alias(String),
    /// The caller-registered snapshot.
    Snapshot,
    /// Result of a nested filter, evaluated first.
    Filter(Box<FilterNode>),
}

/// Value of a `<Parameter>`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamSource {
    /// Text parsed according to the parameter kind.
    Text(String),
    /// Image reference.
    Image(ImageSource),
}

/// A `<Parameter name="...">` element.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamNode {
    /// Parameter name as written.
    pub name: String,
    /// Value.
    pub value: ParamSource,
}

/// A `<Filter>` element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterNode {
    /// Registry name.
    pub name: String,
    /// Alias under which the result is registered.
    pub alias: Option<String>,
    /// Input image.
    pub input: Option<ImageSource>,
    /// Parameters in document order.
    pub params: Vec<ParamNode>,
    /// Clipping rectangles; empty means the whole image.
    pub clips: Vec<Rect>,
    /// Files the result is also written to.
    pub outputs: Vec<PathBuf>,
}

/// A parsed `<FilterPipeline>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    /// Top-level filters in document order.
    pub filters: Vec<FilterNode>,
    /// Alias of the final image.
    pub return_value: String,
    base_dir: Option<PathBuf>,
}

const ROOT: &str = "FilterPipeline";

fn image_source(el: &Element) -> PipelineResult<Option<ImageSource>> {
    Ok(match el.name.as_str() {
        "FILE" => {
            if el.text.is_empty() {
                return Err(PipelineError::malformed("<FILE> needs a path"));
            }
            Some(ImageSource::File(PathBuf::from(&el.text)))
        }
        "ALIAS" => {
            if el.text.is_empty() {
                return Err(PipelineError::malformed("<ALIAS> needs a name"));
            }
            Some(ImageSource::Alias(el.text.clone()))
        }
        "SNAPSHOT" => Some(ImageSource::Snapshot),
        "Filter" => Some(ImageSource::Filter(Box::new(FilterNode::from_element(el)?))),
        _ => None,
    })
}

fn clip_rect(el: &Element) -> PipelineResult<Rect> {
    let field = |name: &str| -> PipelineResult<usize> {
        let v = el
            .attr(name)
            .ok_or_else(|| PipelineError::malformed(format!("<Clip> is missing '{}'", name)))?;
        v.trim().parse().map_err(|_| {
            PipelineError::malformed(format!("<Clip> {}='{}' is not a non-negative integer", name, v))
        })
    };
    Ok(Rect::new(field("x")?, field("y")?, field("width")?, field("height")?))
}

impl ParamNode {
    fn from_element(el: &Element) -> PipelineResult<Self> {
        let name = el
            .attr("name")
            .ok_or_else(|| PipelineError::malformed("<Parameter> needs a name attribute"))?
            .to_string();
        let mut image = None;
        for child in &el.children {
            match image_source(child)? {
                Some(src) if image.is_none() => image = Some(src),
                Some(_) => {
                    return Err(PipelineError::malformed(format!(
                        "parameter '{}' names more than one image",
                        name
                    )));
                }
                None => {
                    return Err(PipelineError::malformed(format!(
                        "unexpected <{}> in parameter '{}'",
                        child.name, name
                    )));
                }
            }
        }
        let value = match image {
            Some(src) => ParamSource::Image(src),
            None => ParamSource::Text(el.text.clone()),
        };
        Ok(Self { name, value })
    }
}

impl FilterNode {
    /// Reads a `<Filter>` element.
    pub fn from_element(el: &Element) -> PipelineResult<Self> {
        let name = el
            .attr("name")
            .ok_or_else(|| PipelineError::malformed("<Filter> needs a name attribute"))?
            .to_string();
        let mut node = FilterNode {
            name,
            alias: el.attr("alias").map(str::to_string),
            ..Default::default()
        };

        for section in &el.children {
            match section.name.as_str() {
                "INPUT" => node.read_input(section)?,
                "OUTPUT" => {
                    for child in &section.children {
                        match image_source(child)? {
                            Some(ImageSource::File(path)) => node.outputs.push(path),
                            _ => {
                                return Err(PipelineError::malformed(format!(
                                    "filter '{}': <OUTPUT> only takes <FILE>",
                                    node.name
                                )));
                            }
                        }
                    }
                }
                other => {
                    return Err(PipelineError::malformed(format!(
                        "filter '{}': unexpected <{}>",
                        node.name, other
                    )));
                }
            }
        }
        Ok(node)
    }

    fn read_input(&mut self, input: &Element) -> PipelineResult<()> {
        for child in &input.children {
            match child.name.as_str() {
                "Parameter" => self.params.push(ParamNode::from_element(child)?),
                "Clip" => self.clips.push(clip_rect(child)?),
                _ => match image_source(child)? {
                    Some(src) if self.input.is_none() => self.input = Some(src),
                    Some(_) => {
                        return Err(PipelineError::malformed(format!(
                            "filter '{}' has more than one input image",
                            self.name
                        )));
                    }
                    None => {
                        return Err(PipelineError::malformed(format!(
                            "filter '{}': unexpected <{}> in <INPUT>",
                            self.name, child.name
                        )));
                    }
                },
            }
        }
        Ok(())
    }
}

impl Pipeline {
    /// Parses a document held in a string.
    pub fn parse(text: &str) -> PipelineResult<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Parses a document from a reader.
    pub fn from_reader<R: BufRead>(reader: R) -> PipelineResult<Self> {
        Self::from_element(&xml::parse(reader)?)
    }

    /// Loads a document; relative `<FILE>` paths resolve against its directory.
    pub fn load<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            PipelineError::Io(pixfx_io::IoError::File {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        let mut pipeline = Self::from_reader(BufReader::new(file))?;
        pipeline.base_dir = path.parent().map(Path::to_path_buf);
        Ok(pipeline)
    }

    /// Reads a `<FilterPipeline>` root element.
    pub fn from_element(root: &Element) -> PipelineResult<Self> {
        if root.name != ROOT {
            return Err(PipelineError::malformed(format!(
                "root element is <{}>, expected <{}>",
                root.name, ROOT
            )));
        }
        let mut filters = Vec::new();
        let mut return_value = None;
        for child in &root.children {
            match child.name.as_str() {
                "Filter" => filters.push(FilterNode::from_element(child)?),
                "ReturnValue" => return_value = Some(child.text.clone()),
                other => {
                    return Err(PipelineError::malformed(format!(
                        "unexpected <{}> in <{}>",
                        other, ROOT
                    )));
                }
            }
        }
        let return_value = return_value
            .filter(|s| !s.is_empty())
            .ok_or(PipelineError::MissingReturnValue)?;
        Ok(Self {
            filters,
            return_value,
            base_dir: None,
        })
    }

    /// Directory relative paths resolve against, if loaded from a file.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Sets the directory relative paths resolve against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Resolves a document path against [`Pipeline::base_dir`].
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
        <FilterPipeline>
          <Filter name="Blur" alias="soft">
            <INPUT>
              <FILE>in.png</FILE>
              <Parameter name="Radius">2.5</Parameter>
              <Clip x="1" y="2" width="3" height="4"/>
            </INPUT>
            <OUTPUT><FILE>soft.png</FILE></OUTPUT>
          </Filter>
          <Filter name="ChannelJoin" alias="joined">
            <INPUT>
              <Filter name="Grayscale">
                <INPUT><ALIAS>soft</ALIAS></INPUT>
              </Filter>
              <Parameter name="Red"><SNAPSHOT/></Parameter>
            </INPUT>
          </Filter>
          <ReturnValue>joined</ReturnValue>
        </FilterPipeline>"#;

    #[test]
    fn test_parse_document() {
        let p = Pipeline::parse(DOC).unwrap();
        assert_eq!(p.return_value, "joined");
        assert_eq!(p.filters.len(), 2);

        let blur = &p.filters[0];
        assert_eq!(blur.alias.as_deref(), Some("soft"));
        assert_eq!(blur.input, Some(ImageSource::File("in.png".into())));
        assert_eq!(blur.params[0].value, ParamSource::Text("2.5".into()));
        assert_eq!(blur.clips, vec![Rect::new(1, 2, 3, 4)]);
        assert_eq!(blur.outputs, vec![PathBuf::from("soft.png")]);

        let join = &p.filters[1];
        match &join.input {
            Some(ImageSource::Filter(inner)) => {
                assert_eq!(inner.name, "Grayscale");
                assert_eq!(inner.input, Some(ImageSource::Alias("soft".into())));
            }
            other => panic!("unexpected input {other:?}"),
        }
        assert_eq!(join.params[0].value, ParamSource::Image(ImageSource::Snapshot));
    }

    #[test]
    fn test_missing_return_value() {
        let err = Pipeline::parse("<FilterPipeline><ReturnValue> </ReturnValue></FilterPipeline>").unwrap_err();
        assert!(matches!(err, PipelineError::MissingReturnValue));
        let err = Pipeline::parse("<FilterPipeline/>").unwrap_err();
        assert!(matches!(err, PipelineError::MissingReturnValue));
    }

    #[test]
    fn test_structure_errors() {
        let bad = [
            "<Pipeline><ReturnValue>a</ReturnValue></Pipeline>",
            "<FilterPipeline><Filter><INPUT/></Filter><ReturnValue>a</ReturnValue></FilterPipeline>",
            r#"<FilterPipeline><Filter name="Blur"><INPUT><FILE>a</FILE><FILE>b</FILE></INPUT></Filter><ReturnValue>a</ReturnValue></FilterPipeline>"#,
            r#"<FilterPipeline><Filter name="Blur"><INPUT><Clip x="1" y="1" width="-2" height="2"/></INPUT></Filter><ReturnValue>a</ReturnValue></FilterPipeline>"#,
            r#"<FilterPipeline><Filter name="Blur"><OUTPUT><ALIAS>x</ALIAS></OUTPUT></Filter><ReturnValue>a</ReturnValue></FilterPipeline>"#,
        ];
        for doc in bad {
            assert!(matches!(Pipeline::parse(doc), Err(PipelineError::Malformed(_))), "{doc}");
        }
    }

    #[test]
    fn test_resolve_relative() {
        let p = Pipeline::parse(DOC).unwrap().with_base_dir("/data/run");
        assert_eq!(p.resolve(Path::new("in.png")), PathBuf::from("/data/run/in.png"));
        assert_eq!(p.resolve(Path::new("/abs/x.png")), PathBuf::from("/abs/x.png"));
    }

    #[test]
    fn test_load_sets_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.xml");
        std::fs::write(&path, DOC).unwrap();

        let p = Pipeline::load(&path).unwrap();
        assert_eq!(p.base_dir(), Some(dir.path()));
        assert_eq!(p.resolve(Path::new("in.png")), dir.path().join("in.png"));

        let err = Pipeline::load(dir.path().join("missing.xml")).unwrap_err();
        assert!(matches!(err, PipelineError::Io(pixfx_io::IoError::File { .. })));
    }
}
