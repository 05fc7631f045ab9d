use crate::config::ConfigError;
use crate::metadata::TagMap;

/// A tag-backed placeholder in a filename template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Artist,
    Title,
    Album,
    Track,
    Year,
    Genre,
}

impl Placeholder {
    pub const ALL: [Placeholder; 6] = [
        Placeholder::Artist,
        Placeholder::Title,
        Placeholder::Album,
        Placeholder::Track,
        Placeholder::Year,
        Placeholder::Genre,
    ];

    /// Name as written in a template, without the `$`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Artist => "ARTIST",
            Self::Title => "TITLE",
            Self::Album => "ALBUM",
            Self::Track => "TRACK",
            Self::Year => "YEAR",
            Self::Genre => "GENRE",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Value for this placeholder, or `None` when the tag is missing.
    fn value(&self, tags: &TagMap) -> Option<String> {
        let value = match self {
            Self::Artist => tags.get("artist")?.clone(),
            Self::Title => tags.get("title")?.clone(),
            Self::Album => tags.get("album")?.clone(),
            Self::Genre => tags.get("genre")?.clone(),
            // "3/12" -> "03"
            Self::Track => {
                let track = tags.get("track")?;
                let number = track.split('/').next().unwrap_or_default().trim();
                match number.parse::<u32>() {
                    Ok(n) => format!("{:02}", n),
                    Err(_) => number.to_string(),
                }
            }
            Self::Year => tags.get("date")?.trim().chars().take(4).collect(),
        };
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Placeholder),
}

/// A parsed filename template such as `"$ARTIST - $TITLE"`.
///
/// A `$` followed by an uppercase word must name a known placeholder; any
/// other `$` is literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
    segments: Vec<Segment>,
}

impl FilenameTemplate {
    pub fn new(template: &str) -> Result<Self, ConfigError> {
        if template.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "naming template cannot be empty".to_string(),
            ));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(pos) = rest.find('$') {
            literal.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let name_len = after
                .find(|c: char| !c.is_ascii_uppercase())
                .unwrap_or(after.len());

            if name_len == 0 {
                literal.push('$');
                rest = after;
                continue;
            }

            let name = &after[..name_len];
            let placeholder = Placeholder::from_name(name).ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "unknown placeholder '${}' in naming template '{}'",
                    name, template
                ))
            })?;

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Field(placeholder));
            rest = &after[name_len..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Placeholders used by this template, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(p) => Some(*p),
            Segment::Literal(_) => None,
        })
    }

    /// Fill the template from `tags`.
    ///
    /// Returns `None` if any placeholder lacks a non-empty value, or if the
    /// rendered name is blank.
    pub fn render(&self, tags: &TagMap) -> Option<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(placeholder) => out.push_str(&placeholder.value(tags)?),
            }
        }

        let out = out.trim();
        if out.is_empty() {
            None
        } else {
            Some(out.to_string())
        }
    }
}
