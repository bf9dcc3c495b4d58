use super::normalize::normalize;
use crate::feed::FeedItem;
use thiserror::Error;

pub const DEFAULT_FORMAT: &str = "{{Title|normalize}}\n{{Link}}";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed action starting at byte {0}")]
    Unclosed(usize),

    #[error("empty action at byte {0}")]
    EmptyAction(usize),

    #[error("unknown field {0:?}")]
    UnknownField(String),

    #[error("unknown function {0:?}")]
    UnknownFunction(String),
}

/// Item attributes a template can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Guid,
    Title,
    Link,
    Description,
    Content,
    Author,
    Published,
    Updated,
    Categories,
}

impl Field {
    const ALL: [Field; 9] = [
        Field::Guid,
        Field::Title,
        Field::Link,
        Field::Description,
        Field::Content,
        Field::Author,
        Field::Published,
        Field::Updated,
        Field::Categories,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Guid => "GUID",
            Field::Title => "Title",
            Field::Link => "Link",
            Field::Description => "Description",
            Field::Content => "Content",
            Field::Author => "Author",
            Field::Published => "Published",
            Field::Updated => "Updated",
            Field::Categories => "Categories",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Absent values render as the empty string.
    fn value(self, item: &FeedItem) -> String {
        match self {
            Field::Guid => item.guid.clone(),
            Field::Title => item.title.clone().unwrap_or_default(),
            Field::Link => item.link.clone().unwrap_or_default(),
            Field::Description => item.description.clone().unwrap_or_default(),
            Field::Content => item.content.clone().unwrap_or_default(),
            Field::Author => item.author.clone().unwrap_or_default(),
            Field::Published => item.published.map(|t| t.to_rfc3339()).unwrap_or_default(),
            Field::Updated => item.updated.map(|t| t.to_rfc3339()).unwrap_or_default(),
            Field::Categories => item.categories.join(", "),
        }
    }
}

/// Named transformations usable after `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Normalize,
}

impl Func {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "normalize" => Some(Func::Normalize),
            _ => None,
        }
    }

    fn apply(self, value: &str) -> String {
        match self {
            Func::Normalize => normalize(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Action { field: Field, funcs: Vec<Func> },
}

/// A compiled post format.
///
/// Text outside `{{ }}` is copied verbatim. Inside, an action names a field
/// optionally followed by functions: `{{Title | normalize}}`. A leading dot
/// (`{{.Title}}`) is accepted and ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn compile(format: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = format;
        let mut offset = 0;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let body_start = open + 2;
            let close = rest[body_start..]
                .find("}}")
                .ok_or(TemplateError::Unclosed(offset + open))?;
            let body = &rest[body_start..body_start + close];
            segments.push(parse_action(body, offset + open)?);

            let consumed = body_start + close + 2;
            rest = &rest[consumed..];
            offset += consumed;
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { segments })
    }

    /// Render against one item. Field names were checked at compile time, so
    /// this cannot fail.
    pub fn render(&self, item: &FeedItem) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Action { field, funcs } => {
                    let value = funcs.iter().fold(field.value(item), |v, f| f.apply(&v));
                    out.push_str(&value);
                }
            }
        }
        out
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::compile(DEFAULT_FORMAT).expect("default format compiles")
    }
}

fn parse_action(body: &str, at: usize) -> Result<Segment, TemplateError> {
    let mut parts = body.split('|').map(str::trim);

    let name = parts.next().unwrap_or_default();
    let name = name.strip_prefix('.').unwrap_or(name);
    if name.is_empty() {
        return Err(TemplateError::EmptyAction(at));
    }
    let field = Field::parse(name).ok_or_else(|| TemplateError::UnknownField(name.to_string()))?;

    let funcs = parts
        .map(|f| {
            if f.is_empty() {
                return Err(TemplateError::EmptyAction(at));
            }
            Func::parse(f).ok_or_else(|| TemplateError::UnknownFunction(f.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Segment::Action { field, funcs })
}
