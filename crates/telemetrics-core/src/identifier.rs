//! Metric identity: `(namespace, id, ordered dimension names)`.
//!
//! Identifiers are validated once, at construction, and are immutable
//! afterwards. Equality and hashing are exact (ordinal) over all three parts,
//! so `["a", "b"]` and `["b", "a"]` are different identities.

use std::fmt;

use crate::error::{Result, TelemetryError};

/// Namespace used when the caller does not supply one.
pub const DEFAULT_METRIC_NAMESPACE: &str = "default";

/// Maximum number of dimension names a metric may declare.
pub const MAX_DIMENSIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricIdentifier {
    namespace: String,
    id: String,
    dimension_names: Vec<String>,
}

impl MetricIdentifier {
    /// Identifier in the default namespace with no dimensions.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        Self::builder(id).build()
    }

    /// Fully specified identifier.
    pub fn with_namespace<I, S>(namespace: &str, id: impl Into<String>, dimension_names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder(id)
            .namespace(namespace)
            .dimensions(dimension_names)
            .build()
    }

    /// Positional form: `None` namespace means the default one, and dimension
    /// names are taken in order up to the first omitted slot.
    pub fn from_positional(namespace: Option<&str>, id: &str, dimension_names: &[Option<&str>]) -> Result<Self> {
        let mut builder = Self::builder(id);
        if let Some(ns) = namespace {
            builder = builder.namespace(ns);
        }
        builder
            .dimensions(dimension_names.iter().map_while(|d| *d))
            .build()
    }

    pub fn builder(id: impl Into<String>) -> MetricIdentifierBuilder {
        MetricIdentifierBuilder {
            namespace: None,
            id: id.into(),
            dimension_names: Vec::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dimension_names(&self) -> &[String] {
        &self.dimension_names
    }

    pub fn dimension_count(&self) -> usize {
        self.dimension_names.len()
    }
}

impl fmt::Display for MetricIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.id)?;
        if !self.dimension_names.is_empty() {
            write!(f, "({})", self.dimension_names.join(", "))?;
        }
        Ok(())
    }
}

/// Builder for [`MetricIdentifier`]. Validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct MetricIdentifierBuilder {
    namespace: Option<String>,
    id: String,
    dimension_names: Vec<String>,
}

impl MetricIdentifierBuilder {
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn dimension(mut self, name: impl Into<String>) -> Self {
        self.dimension_names.push(name.into());
        self
    }

    pub fn dimensions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimension_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<MetricIdentifier> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(TelemetryError::InvalidIdentifier("metric id must not be empty".into()));
        }

        let namespace = match self.namespace.as_deref().map(str::trim) {
            None => DEFAULT_METRIC_NAMESPACE.to_string(),
            Some("") => {
                return Err(TelemetryError::InvalidIdentifier(format!(
                    "metric {id}: namespace must not be empty"
                )))
            }
            Some(ns) => ns.to_string(),
        };

        if self.dimension_names.len() > MAX_DIMENSIONS {
            return Err(TelemetryError::InvalidIdentifier(format!(
                "metric {id}: {} dimensions given, at most {MAX_DIMENSIONS} are supported",
                self.dimension_names.len()
            )));
        }

        let mut dimension_names: Vec<String> = Vec::with_capacity(self.dimension_names.len());
        for (i, raw) in self.dimension_names.iter().enumerate() {
            let name = raw.trim();
            if name.is_empty() {
                return Err(TelemetryError::InvalidIdentifier(format!(
                    "metric {id}: dimension name #{} must not be empty",
                    i + 1
                )));
            }
            if dimension_names.iter().any(|d| d == name) {
                return Err(TelemetryError::InvalidIdentifier(format!(
                    "metric {id}: duplicate dimension name {name:?}"
                )));
            }
            dimension_names.push(name.to_string());
        }

        Ok(MetricIdentifier {
            namespace,
            id: id.to_string(),
            dimension_names,
        })
    }
}
