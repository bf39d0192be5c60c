//! Interpretation of store locator strings.

use std::{fmt, path::PathBuf, str::FromStr};

use rusqlite::{Connection, OpenFlags};

use super::DaoError;

/// Where a store lives.
///
/// Parsing tries three forms in order:
///
/// 1. An empty string opens a private in-memory store.
/// 2. A string containing `://` is a fully qualified locator. `sqlite://`
///    URLs name a file after the third slash (`sqlite:///feeds.db` is
///    relative, `sqlite:////var/feeds.db` absolute, `sqlite://` alone is in
///    memory). `file://` URIs are handed to SQLite verbatim.
/// 3. Anything else is a file path.
///
/// # Examples
/// ```
/// use std::path::PathBuf;
/// use transitdb_core::StoreLocator;
///
/// assert_eq!("".parse::<StoreLocator>().ok(), Some(StoreLocator::InMemory));
/// assert_eq!(
///     "sqlite:////tmp/feeds.db".parse::<StoreLocator>().ok(),
///     Some(StoreLocator::Path(PathBuf::from("/tmp/feeds.db"))),
/// );
/// assert!("postgresql://localhost/feeds".parse::<StoreLocator>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocator {
    /// Ephemeral store discarded when the session is dropped.
    InMemory,
    /// File-backed store. Missing parent directories are not created.
    Path(PathBuf),
    /// SQLite URI such as `file:///srv/feeds.db?mode=ro`.
    Uri(String),
}

const SCHEME_SEPARATOR: &str = "://";

impl StoreLocator {
    /// Interpret `locator`.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::UnsupportedScheme`] for schemes other than
    /// `sqlite` and `file`, and [`DaoError::MalformedLocator`] for a
    /// `sqlite://` locator without a usable path.
    pub fn parse(locator: &str) -> Result<Self, DaoError> {
        if locator.is_empty() {
            return Ok(Self::InMemory);
        }
        let Some((scheme, rest)) = locator.split_once(SCHEME_SEPARATOR) else {
            return Ok(Self::Path(PathBuf::from(locator)));
        };
        match scheme.to_ascii_lowercase().as_str() {
            "sqlite" => Self::parse_sqlite_url(locator, rest),
            "file" => Ok(Self::Uri(locator.to_owned())),
            _ => Err(DaoError::UnsupportedScheme {
                locator: locator.to_owned(),
                scheme: scheme.to_owned(),
            }),
        }
    }

    fn parse_sqlite_url(locator: &str, rest: &str) -> Result<Self, DaoError> {
        if rest.is_empty() || rest == "/:memory:" {
            return Ok(Self::InMemory);
        }
        match rest.strip_prefix('/') {
            Some("") => Err(DaoError::MalformedLocator {
                locator: locator.to_owned(),
                reason: "missing database path",
            }),
            Some(path) => Ok(Self::Path(PathBuf::from(path))),
            None => Err(DaoError::MalformedLocator {
                locator: locator.to_owned(),
                reason: "sqlite locators do not take a host; use sqlite:///path",
            }),
        }
    }

    /// Open a connection to the located store.
    pub(crate) fn connect(&self) -> Result<Connection, rusqlite::Error> {
        match self {
            Self::InMemory => Connection::open_in_memory(),
            Self::Path(path) => Connection::open(path),
            Self::Uri(uri) => {
                Connection::open_with_flags(uri, OpenFlags::default() | OpenFlags::SQLITE_OPEN_URI)
            }
        }
    }
}

impl FromStr for StoreLocator {
    type Err = DaoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for StoreLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMemory => f.write_str(":memory:"),
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Uri(uri) => f.write_str(uri),
        }
    }
}
