//! Internal link checking.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use orgdocs_config::{ReportingSeverity, RouteResolver};

use crate::builder::BuildError;

/// A link whose target the build did not produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenLink {
    /// Where the link was found (e.g. `docs/intro.md:12` or `navbar`)
    pub source: String,
    /// The link as resolved
    pub target: String,
}

impl fmt::Display for BrokenLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// Knows every route a build produces and checks links against them.
#[derive(Debug, Default)]
pub struct LinkChecker {
    routes: HashSet<String>,
    site_base_url: String,
    static_dirs: Vec<PathBuf>,
}

impl LinkChecker {
    pub fn new(site_base_url: &str, static_dirs: Vec<PathBuf>) -> Self {
        Self {
            routes: HashSet::new(),
            site_base_url: site_base_url.to_string(),
            static_dirs,
        }
    }

    /// Record a route produced by the build.
    pub fn add_route(&mut self, route: &str) {
        self.routes.insert(RouteResolver::canonical(route));
    }

    /// Whether a resolved internal link points at a generated page or a static file.
    pub fn resolves(&self, target: &str) -> bool {
        let canonical = RouteResolver::canonical(target);
        if self.routes.contains(&canonical) {
            return true;
        }

        let Some(relative) = canonical.strip_prefix(self.site_base_url.as_str()) else {
            return false;
        };
        !relative.is_empty()
            && self
                .static_dirs
                .iter()
                .any(|dir| dir.join(relative).is_file())
    }
}

/// Report broken links according to a severity.
///
/// Returns the number of broken links that were reported without failing.
pub fn report(
    severity: ReportingSeverity,
    kind: &str,
    broken: Vec<BrokenLink>,
) -> Result<usize, BuildError> {
    if broken.is_empty() {
        return Ok(0);
    }

    match severity {
        ReportingSeverity::Throw => Err(BuildError::BrokenLinks {
            kind: kind.to_string(),
            links: broken,
        }),
        ReportingSeverity::Warn => {
            for link in &broken {
                tracing::warn!("Broken {}: {}", kind, link);
            }
            Ok(broken.len())
        }
        ReportingSeverity::Log => {
            for link in &broken {
                tracing::info!("Broken {}: {}", kind, link);
            }
            Ok(broken.len())
        }
        ReportingSeverity::Ignore => Ok(0),
    }
}
