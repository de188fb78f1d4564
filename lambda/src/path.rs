//! Separating a gateway stage or configured base path from the application path.

/// Stage name API Gateway reports when requests are routed without a stage segment.
pub const DEFAULT_STAGE: &str = "$default";

/// A raw request path split into the part that belongs to the deployment and the part
/// the application routes on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// `"/stage"`, `"/base/path"`, or empty when nothing was stripped.
    pub prefix: String,
    /// The application-relative path. Never empty.
    pub path: String,
}

impl ResolvedPath {
    fn verbatim(raw: &str) -> Self {
        ResolvedPath {
            prefix: String::new(),
            path: raw.to_owned(),
        }
    }

    /// The base URL for `host` with the stripped prefix appended.
    pub fn base_url(&self, host: &str) -> String {
        format!("https://{}{}", host, self.prefix)
    }
}

/// Strips `/{stage}` from `raw` when the stage is the path's first segment.
///
/// Nothing is stripped for a missing or empty stage, for [`DEFAULT_STAGE`], or when the
/// stage only matches part of the first segment.
///
/// ```
/// use lambda_adapter::path::resolve_stage;
///
/// let resolved = resolve_stage("/prod/users/7", Some("prod"));
/// assert_eq!(resolved.prefix, "/prod");
/// assert_eq!(resolved.path, "/users/7");
///
/// let untouched = resolve_stage("/production/x", Some("prod"));
/// assert_eq!(untouched.path, "/production/x");
/// ```
pub fn resolve_stage(raw: &str, stage: Option<&str>) -> ResolvedPath {
    match stage {
        Some(stage) if !stage.is_empty() && stage != DEFAULT_STAGE => {
            strip_segment_prefix(raw, &format!("/{}", stage))
        }
        _ => ResolvedPath::verbatim(raw),
    }
}

/// Strips a configured base path (see [`normalize_base_path`]) from `raw`, with the
/// same whole-segment rule as [`resolve_stage`].
pub fn resolve_base_path(raw: &str, base: Option<&str>) -> ResolvedPath {
    match base.and_then(normalize_base_path) {
        Some(prefix) => strip_segment_prefix(raw, &prefix),
        None => ResolvedPath::verbatim(raw),
    }
}

/// Adds a missing leading slash and drops one trailing slash. Returns `None` when
/// nothing is left to strip.
pub fn normalize_base_path(base: &str) -> Option<String> {
    let base = base.trim();
    let base = base.strip_suffix('/').unwrap_or(base);
    let base = base.strip_prefix('/').unwrap_or(base);
    if base.is_empty() {
        None
    } else {
        Some(format!("/{}", base))
    }
}

// `prefix` starts with '/' and has no trailing slash.
fn strip_segment_prefix(raw: &str, prefix: &str) -> ResolvedPath {
    match raw.strip_prefix(prefix) {
        Some("") => ResolvedPath {
            prefix: prefix.to_owned(),
            path: String::from("/"),
        },
        Some(rest) if rest.starts_with('/') => ResolvedPath {
            prefix: prefix.to_owned(),
            path: rest.to_owned(),
        },
        _ => ResolvedPath::verbatim(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn stage_is_stripped() {
        let resolved = resolve_stage("/prod/users/7", Some("prod"));
        assert_eq!(resolved.prefix, "/prod");
        assert_eq!(resolved.path, "/users/7");
        assert_eq!(
            resolved.base_url("abc.execute-api.us-east-1.amazonaws.com"),
            "https://abc.execute-api.us-east-1.amazonaws.com/prod"
        );
    }

    #[test]
    fn bare_stage_becomes_root() {
        let resolved = resolve_stage("/prod", Some("prod"));
        assert_eq!(resolved.prefix, "/prod");
        assert_eq!(resolved.path, "/");
    }

    #[test]
    fn partial_segment_is_not_stripped() {
        let resolved = resolve_stage("/production/x", Some("prod"));
        assert_eq!(resolved.prefix, "");
        assert_eq!(resolved.path, "/production/x");
    }

    #[test]
    fn default_stage_is_never_stripped() {
        let resolved = resolve_stage("/$default/x", Some(DEFAULT_STAGE));
        assert_eq!(resolved.path, "/$default/x");
        assert_eq!(resolve_stage("/x", None).path, "/x");
        assert_eq!(resolve_stage("/x", Some("")).path, "/x");
    }

    #[test]
    fn stage_elsewhere_in_path_is_ignored() {
        let resolved = resolve_stage("/api/prod/x", Some("prod"));
        assert_eq!(resolved.path, "/api/prod/x");
        assert_eq!(resolved.base_url("h"), "https://h");
    }

    #[test]
    fn base_path_is_normalized() {
        assert_eq!(normalize_base_path("app").as_deref(), Some("/app"));
        assert_eq!(normalize_base_path("/app/").as_deref(), Some("/app"));
        assert_eq!(normalize_base_path("/a/b").as_deref(), Some("/a/b"));
        assert_eq!(normalize_base_path("/"), None);
        assert_eq!(normalize_base_path(""), None);
    }

    #[test]
    fn base_path_strips_whole_segments() {
        let resolved = resolve_base_path("/app/static/x.css", Some("app/"));
        assert_eq!(resolved.prefix, "/app");
        assert_eq!(resolved.path, "/static/x.css");

        let resolved = resolve_base_path("/apple/x", Some("/app"));
        assert_eq!(resolved.prefix, "");
        assert_eq!(resolved.path, "/apple/x");
    }

    #[test]
    fn empty_base_path_is_a_no_op() {
        assert_eq!(resolve_base_path("/x", Some("")).path, "/x");
        assert_eq!(resolve_base_path("/x", None).path, "/x");
    }

    proptest! {
        #[test]
        fn matching_stage_is_split_off(stage in "[a-z][a-z0-9]{0,7}", rest in "(/[a-z0-9]{0,5}){1,4}") {
            let raw = format!("/{}{}", stage, rest);
            let resolved = resolve_stage(&raw, Some(&stage));
            prop_assert_eq!(resolved.prefix, format!("/{}", stage));
            prop_assert_eq!(resolved.path, raw[stage.len() + 1..].to_owned());
        }

        #[test]
        fn non_matching_path_is_untouched(stage in "[a-z]{1,6}", raw in "(/[a-z0-9]{0,5}){0,4}") {
            let segment = format!("/{}", stage);
            prop_assume!(raw != segment && !raw.starts_with(&format!("{}/", segment)));
            let resolved = resolve_stage(&raw, Some(&stage));
            prop_assert_eq!(resolved.prefix, "");
            prop_assert_eq!(resolved.path, raw);
        }
    }
}
