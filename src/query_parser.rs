use once_cell::sync::Lazy;
use regex::Regex;

/// `name:value` where value runs until the next whitespace (and may be empty).
static DIRECTIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9A-Za-z_]+):(\S*)").expect("directive pattern is valid"));

/// A `name:value` token embedded in an inline query, e.g. `page:2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub value: String,
}

impl Directive {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Text exactly as the user typed it.
    pub original_text: String,
    /// Text with every directive removed and whitespace collapsed.
    pub clean_text: String,
    /// Directives in the order they appear in the text. Empty when there are none.
    pub directives: Vec<Directive>,
}

impl ParsedQuery {
    pub fn has_directives(&self) -> bool {
        !self.directives.is_empty()
    }

    /// Last directive with the given name, if any.
    pub fn last_directive(&self, name: &str) -> Option<&Directive> {
        self.directives.iter().rev().find(|d| d.name == name)
    }

    pub fn directives_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Directive> {
        self.directives.iter().filter(move |d| d.name == name)
    }
}

/// Splits inline query text into the search text and its directives.
///
/// Never fails: any input, including the empty string, gives a valid `ParsedQuery`.
pub fn parse(text: &str) -> ParsedQuery {
    let directives = DIRECTIVE_RE
        .captures_iter(text)
        .map(|caps| Directive::new(&caps[1], &caps[2]))
        .collect::<Vec<_>>();

    let stripped = DIRECTIVE_RE.replace_all(text, " ");
    let clean_text = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    ParsedQuery {
        original_text: text.to_string(),
        clean_text,
        directives,
    }
}

#[test]
fn test_directive_pattern_is_ascii_identifier() {
    assert!(DIRECTIVE_RE.is_match("page:2"));
    assert!(DIRECTIVE_RE.is_match("_x:"));
    assert!(!DIRECTIVE_RE.is_match(":2"));
    assert!(!DIRECTIVE_RE.is_match("émoji :x"));
}
