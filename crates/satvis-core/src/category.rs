//! Backend data categories and their fixed routes.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP method accepted by the backend routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }

    /// Whether a JSON body is sent with this method.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the four fixed backend data domains.
///
/// The set is closed: anything else arriving as a raw tag is rejected with
/// [`CoreError::UnknownCategory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Status,
    Satellite,
    Trajectory,
    Analysis,
}

impl Category {
    /// All categories in refresh order (status, satellite, trajectory, analysis).
    pub const ALL: [Category; 4] = [
        Category::Status,
        Category::Satellite,
        Category::Trajectory,
        Category::Analysis,
    ];

    /// Tag used on the wire and in batch descriptors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Status => "status",
            Category::Satellite => "satellite",
            Category::Trajectory => "trajectory",
            Category::Analysis => "analysis",
        }
    }

    /// Route path relative to the backend base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Category::Status => "/api/status",
            Category::Satellite => "/api/satellite",
            Category::Trajectory => "/api/trajectory",
            Category::Analysis => "/api/analysis",
        }
    }

    /// Position of this category in [`Category::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Category::Status => 0,
            Category::Satellite => 1,
            Category::Trajectory => 2,
            Category::Analysis => 3,
        }
    }

    /// Whether the route accepts `method`.
    ///
    /// Status is read-only; the data routes also accept POST.
    pub fn allows(&self, method: HttpMethod) -> bool {
        match (self, method) {
            (_, HttpMethod::Get) => true,
            (Category::Status, _) => false,
            (_, HttpMethod::Post) => true,
            (_, HttpMethod::Put) => false,
        }
    }

    /// Check `method` against the route table.
    pub fn check_method(&self, method: HttpMethod) -> crate::Result<()> {
        if self.allows(method) {
            Ok(())
        } else {
            Err(CoreError::MethodNotAllowed {
                method: method.to_string(),
                path: self.path().to_string(),
            })
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status" => Ok(Category::Status),
            "satellite" => Ok(Category::Satellite),
            "trajectory" => Ok(Category::Trajectory),
            "analysis" => Ok(Category::Analysis),
            other => Err(CoreError::UnknownCategory(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip_tags() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
            assert_eq!(Category::ALL[category.index()], category);
        }
    }

    #[test]
    fn test_unknown_category_message() {
        let err = "bogus".parse::<Category>().unwrap_err();
        assert_eq!(err.to_string(), "unknown request type: bogus");
    }

    #[test]
    fn test_route_table() {
        assert_eq!(Category::Status.path(), "/api/status");
        assert_eq!(Category::Analysis.path(), "/api/analysis");

        assert!(Category::Status.allows(HttpMethod::Get));
        assert!(!Category::Status.allows(HttpMethod::Post));
        assert!(Category::Satellite.allows(HttpMethod::Post));
        assert!(Category::Trajectory.allows(HttpMethod::Post));
        assert!(!Category::Analysis.allows(HttpMethod::Put));
    }

    #[test]
    fn test_check_method_error() {
        let err = Category::Status.check_method(HttpMethod::Post).unwrap_err();
        assert_eq!(err.to_string(), "method POST not allowed on /api/status");
    }

    #[test]
    fn test_category_serde_lowercase() {
        let json = serde_json::to_string(&Category::Trajectory).unwrap();
        assert_eq!(json, r#""trajectory""#);
    }
}
