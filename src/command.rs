use serde::{Deserialize, Serialize};

/// Represents all driver commands understood by the REPL and script runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    // Selection
    SelectCategory(i64),
    SelectSubcategory(i64),
    SelectChildCategory(i64),
    ResetSelection,

    // Filters
    SetFacet { key: String, value: String },
    UnsetFacet { key: String },
    ToggleFacet { key: String, value: String },
    PriceRange { min: Option<i64>, max: Option<i64> },
    ClearFilters,

    // Navigation
    Navigate(String),

    // Script assertions
    Assert(Assertion),

    // REPL
    ShowState,
    Quit,
}

/// State checks available to scripts (`assert:<property>:<expected>`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Assertion {
    /// Selection path as `cat,sub,child` with `-` for unset levels
    Path(String),
    /// The canonical URL
    Url(String),
    /// Active-filter badge count
    Count(usize),
    /// The listings query string
    Query(String),
    /// One facet's value; empty expected value means "key absent"
    Facet { key: String, value: String },
}

impl Command {
    /// Parse a command from its string representation
    pub fn from_string(s: &str) -> Result<Self, String> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "reset" => return Ok(Command::ResetSelection),
            "clear" => return Ok(Command::ClearFilters),
            "state" => return Ok(Command::ShowState),
            "quit" | "q" => return Ok(Command::Quit),
            _ => {}
        }

        if let Some(rest) = s.strip_prefix("category:").or_else(|| s.strip_prefix("cat:")) {
            return parse_id(rest).map(Command::SelectCategory);
        }
        if let Some(rest) = s
            .strip_prefix("subcategory:")
            .or_else(|| s.strip_prefix("sub:"))
        {
            return parse_id(rest).map(Command::SelectSubcategory);
        }
        if let Some(rest) = s.strip_prefix("child:") {
            return parse_id(rest).map(Command::SelectChildCategory);
        }
        if let Some(rest) = s.strip_prefix("facet:") {
            let (key, value) = split_pair(rest)?;
            return Ok(Command::SetFacet { key, value });
        }
        if let Some(rest) = s.strip_prefix("unset:") {
            if rest.is_empty() {
                return Err("unset: requires a facet key".to_string());
            }
            return Ok(Command::UnsetFacet {
                key: rest.to_string(),
            });
        }
        if let Some(rest) = s.strip_prefix("toggle:") {
            let (key, value) = split_pair(rest)?;
            return Ok(Command::ToggleFacet { key, value });
        }
        if let Some(rest) = s.strip_prefix("price:") {
            return parse_price_range(rest);
        }
        if let Some(rest) = s.strip_prefix("navigate:").or_else(|| s.strip_prefix("url:")) {
            return Ok(Command::Navigate(rest.to_string()));
        }
        if let Some(rest) = s.strip_prefix("assert:") {
            return parse_assertion(rest).map(Command::Assert);
        }

        Err(format!("Unknown command: {}", s))
    }

    /// Convert command to its script representation
    pub fn to_string(&self) -> String {
        match self {
            Command::SelectCategory(id) => format!("category:{}", id),
            Command::SelectSubcategory(id) => format!("subcategory:{}", id),
            Command::SelectChildCategory(id) => format!("child:{}", id),
            Command::ResetSelection => "reset".to_string(),

            Command::SetFacet { key, value } => format!("facet:{}={}", key, value),
            Command::UnsetFacet { key } => format!("unset:{}", key),
            Command::ToggleFacet { key, value } => format!("toggle:{}={}", key, value),
            Command::PriceRange { min, max } => format!(
                "price:{}..{}",
                min.map(|v| v.to_string()).unwrap_or_default(),
                max.map(|v| v.to_string()).unwrap_or_default()
            ),
            Command::ClearFilters => "clear".to_string(),

            Command::Navigate(url) => format!("navigate:{}", url),

            Command::Assert(assertion) => match assertion {
                Assertion::Path(expected) => format!("assert:path:{}", expected),
                Assertion::Url(expected) => format!("assert:url:{}", expected),
                Assertion::Count(expected) => format!("assert:count:{}", expected),
                Assertion::Query(expected) => format!("assert:query:{}", expected),
                Assertion::Facet { key, value } => format!("assert:facet:{}={}", key, value),
            },

            Command::ShowState => "state".to_string(),
            Command::Quit => "quit".to_string(),
        }
    }
}

fn parse_id(s: &str) -> Result<i64, String> {
    s.trim()
        .parse::<i64>()
        .map_err(|_| format!("Invalid id: {}", s))
}

fn split_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => {
            Ok((key.to_string(), value.to_string()))
        }
        _ => Err(format!("Expected key=value, got: {}", s)),
    }
}

/// `min..max` with either side optional: `100..500`, `100..`, `..500`
fn parse_price_range(s: &str) -> Result<Command, String> {
    let (min_str, max_str) = s
        .split_once("..")
        .ok_or_else(|| format!("Expected min..max, got: {}", s))?;

    let parse_end = |part: &str| -> Result<Option<i64>, String> {
        if part.is_empty() {
            Ok(None)
        } else {
            part.parse::<i64>()
                .map(Some)
                .map_err(|_| format!("Invalid price: {}", part))
        }
    };

    Ok(Command::PriceRange {
        min: parse_end(min_str)?,
        max: parse_end(max_str)?,
    })
}

fn parse_assertion(s: &str) -> Result<Assertion, String> {
    let (property, expected) = s
        .split_once(':')
        .ok_or_else(|| format!("Expected assert:<property>:<value>, got: {}", s))?;

    match property {
        "path" => Ok(Assertion::Path(expected.to_string())),
        "url" => Ok(Assertion::Url(expected.to_string())),
        "count" => expected
            .parse::<usize>()
            .map(Assertion::Count)
            .map_err(|_| format!("Invalid count: {}", expected)),
        "query" => Ok(Assertion::Query(expected.to_string())),
        "facet" => match expected.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok(Assertion::Facet {
                key: key.to_string(),
                value: value.to_string(),
            }),
            _ => Err(format!("Expected assert:facet:key=value, got: {}", expected)),
        },
        other => Err(format!("Unknown assertion property: {}", other)),
    }
}
