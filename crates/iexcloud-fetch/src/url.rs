//! Escaped request targets.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::InvalidUrlError;

/// Percent-encodes everything outside `A-Z a-z 0-9 - . _ ~`.
fn escape(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

const fn non_empty(value: &str, error: InvalidUrlError) -> Result<&str, InvalidUrlError> {
    if value.is_empty() {
        Err(error)
    } else {
        Ok(value)
    }
}

/// A named query parameter such as `foo=bar` or `symbols=AAPL,MSFT`.
///
/// The value is escaped at construction; list values are escaped element by
/// element and joined with an unescaped comma.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    key: String,
    value: String,
}

impl Param {
    /// Creates a parameter from a key and a single value.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidUrlError::EmptyParamKey`] or
    /// [`InvalidUrlError::EmptyParamValue`] if either part is empty.
    pub fn new(key: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self, InvalidUrlError> {
        let key = non_empty(key.as_ref(), InvalidUrlError::EmptyParamKey)?;
        let value = non_empty(value.as_ref(), InvalidUrlError::EmptyParamValue)?;
        Ok(Self {
            key: key.to_string(),
            value: escape(value),
        })
    }

    /// Creates a comma-delimited list parameter.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidUrlError::EmptyParamKey`] for an empty key,
    /// [`InvalidUrlError::EmptyParamListValue`] if any element is empty, and
    /// [`InvalidUrlError::EmptyParamValue`] if there are no elements at all.
    pub fn list<I, S>(key: impl AsRef<str>, values: I) -> Result<Self, InvalidUrlError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = non_empty(key.as_ref(), InvalidUrlError::EmptyParamKey)?;
        let escaped = values
            .into_iter()
            .map(|v| non_empty(v.as_ref(), InvalidUrlError::EmptyParamListValue).map(escape))
            .collect::<Result<Vec<_>, _>>()?;
        if escaped.is_empty() {
            return Err(InvalidUrlError::EmptyParamValue);
        }
        Ok(Self {
            key: key.to_string(),
            value: escaped.join(","),
        })
    }

    /// Returns the parameter key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the escaped parameter value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// A key-unique set of parameters, ordered by key.
///
/// Ordering by key makes the final URL independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builds a parameter set from key/value pairs.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvalidUrlError`] encountered.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, InvalidUrlError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::new();
        for (k, v) in pairs {
            params.insert(Param::new(k, v)?);
        }
        Ok(params)
    }

    /// Inserts a parameter. If the key is already present the existing value
    /// is kept and `false` is returned.
    pub fn insert(&mut self, param: Param) -> bool {
        match self.0.entry(param.key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(param.value);
                true
            }
        }
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(key, escaped value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A fully escaped request target that can be the subject of an HTTP GET.
///
/// Equality and hashing are defined over the final escaped string, which
/// makes `Url` suitable as the key for pooling and result lookup.
///
/// # Example
///
/// ```
/// use iexcloud_fetch::{Params, Url};
///
/// let params = Params::from_pairs([("foo2", "bar+"), ("foo1", "bar1")]).unwrap();
/// let url = Url::with_params("https://postman-echo.com/get", &params).unwrap();
/// assert_eq!(url.as_str(), "https://postman-echo.com/get?foo1=bar1&foo2=bar%2B");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Url(String);

impl Url {
    /// Creates a URL without query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidUrlError::EmptyUrl`] if `base` is empty.
    pub fn new(base: impl Into<String>) -> Result<Self, InvalidUrlError> {
        let base = base.into();
        if base.is_empty() {
            return Err(InvalidUrlError::EmptyUrl);
        }
        Ok(Self(base))
    }

    /// Creates a URL with query parameters appended after a `?`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidUrlError::EmptyUrl`] if `base` is empty.
    pub fn with_params(base: impl Into<String>, params: &Params) -> Result<Self, InvalidUrlError> {
        let mut url = Self::new(base)?;
        if !params.is_empty() {
            let query = params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&");
            url.0.push('?');
            url.0.push_str(&query);
        }
        Ok(url)
    }

    /// Returns the escaped URL string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Url {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Url {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Url {
    type Error = InvalidUrlError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A set of unique URLs.
pub type UrlSet = HashSet<Url>;

/// A map keyed by URL.
pub type UrlMap<T> = HashMap<Url, T>;
