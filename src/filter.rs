use regex::Regex;

/// Optional regex gate applied to rendered content.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pattern: Option<Regex>,
}

impl ContentFilter {
    /// Compile the pattern once. `None` or an empty pattern lets everything through.
    pub fn new(pattern: Option<&str>) -> Result<Self, regex::Error> {
        let pattern = match pattern {
            Some(p) if !p.is_empty() => Some(Regex::new(p)?),
            _ => None,
        };
        Ok(Self { pattern })
    }

    pub fn allows(&self, content: &str) -> bool {
        self.pattern.as_ref().is_none_or(|re| re.is_match(content))
    }

    pub fn is_active(&self) -> bool {
        self.pattern.is_some()
    }
}
