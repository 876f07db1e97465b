/// Request paths that bypass tenant resolution.
///
/// Patterns follow the usual servlet-style conventions:
/// - `/health/**` matches `/health` and everything below it
/// - `*` matches exactly one non-empty path segment
/// - anything else must match the whole path
#[derive(Debug, Clone, Default)]
pub struct PathExclusions {
    patterns: Vec<String>,
}

impl PathExclusions {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.trim().is_empty())
                .collect(),
        }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| matches(pattern, path))
    }
}

fn matches(pattern: &str, path: &str) -> bool {
    let path: Vec<&str> = path.split('/').collect();
    match pattern.strip_suffix("/**") {
        Some(prefix) => {
            let prefix: Vec<&str> = prefix.split('/').collect();
            path.len() >= prefix.len() && prefix.iter().zip(&path).all(|(p, s)| segment_matches(p, s))
        }
        None => {
            let pattern: Vec<&str> = pattern.split('/').collect();
            pattern.len() == path.len() && pattern.iter().zip(&path).all(|(p, s)| segment_matches(p, s))
        }
    }
}

fn segment_matches(pattern: &str, segment: &str) -> bool {
    pattern == segment || (pattern == "*" && !segment.is_empty())
}
