use std::fmt;
use std::str::FromStr;

use uguid::Guid;

use crate::{Error, Result};

/// The typed identifier part of a [`NodeId`].
///
/// OPC UA node identifiers come in four forms, distinguished by a one-letter
/// prefix in the text encoding: `i=` (numeric), `s=` (string), `g=` (GUID)
/// and `b=` (opaque, base64). String and ByteString payloads are kept
/// verbatim; GUIDs are canonicalized through [`uguid::Guid`] so that casing
/// differences do not break identity comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identifier {
    /// `i=` form, a 32-bit unsigned integer
    Numeric(u32),
    /// `s=` form, an arbitrary string (may contain `;` and `=`)
    String(String),
    /// `g=` form, a GUID
    Guid(Guid),
    /// `b=` form, base64 text kept as-is
    ByteString(String),
}

/// Unique identifier of an address-space node.
///
/// A `NodeId` pairs a namespace index with a typed [`Identifier`]. The text
/// encoding is `["ns=N;"](i=|s=|g=|b=)value`, where the namespace prefix is
/// omitted for namespace 0. Equality and hashing follow the canonical text
/// form: two `NodeId`s are the same node exactly when their canonical
/// encodings match.
///
/// # Examples
///
/// ```rust
/// use addrspace::nodeset::NodeId;
///
/// let root: NodeId = "i=84".parse()?;
/// assert_eq!(root.namespace, 0);
/// assert_eq!(root.to_string(), "i=84");
///
/// let custom: NodeId = "ns=2;s=My.Node".parse()?;
/// assert_eq!(custom.namespace, 2);
/// assert_eq!(custom.to_string(), "ns=2;s=My.Node");
/// # Ok::<(), addrspace::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    /// Namespace index into the NamespaceUris table (0 is the OPC UA namespace)
    pub namespace: u16,
    /// The typed identifier within that namespace
    pub identifier: Identifier,
}

impl NodeId {
    /// Creates a numeric NodeId in the given namespace.
    #[must_use]
    pub fn numeric(namespace: u16, value: u32) -> Self {
        NodeId {
            namespace,
            identifier: Identifier::Numeric(value),
        }
    }

    /// Creates a string NodeId in the given namespace.
    #[must_use]
    pub fn string(namespace: u16, value: impl Into<String>) -> Self {
        NodeId {
            namespace,
            identifier: Identifier::String(value.into()),
        }
    }

    /// Returns the numeric identifier value, if this is an `i=` NodeId.
    #[must_use]
    pub fn as_numeric(&self) -> Option<u32> {
        match self.identifier {
            Identifier::Numeric(v) => Some(v),
            _ => None,
        }
    }

    /// True for namespace-0 identifiers.
    #[must_use]
    pub fn is_ns0(&self) -> bool {
        self.namespace == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace != 0 {
            write!(f, "ns={};", self.namespace)?;
        }
        match &self.identifier {
            Identifier::Numeric(v) => write!(f, "i={v}"),
            Identifier::String(s) => write!(f, "s={s}"),
            Identifier::Guid(g) => write!(f, "g={g}"),
            Identifier::ByteString(b) => write!(f, "b={b}"),
        }
    }
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let (namespace, rest) = split_namespace(text)?;
        let (kind, value) = rest
            .split_once('=')
            .ok_or_else(|| malformed_error!("NodeId without identifier form: {}", text))?;
        let identifier = match kind {
            "i" => Identifier::Numeric(
                value
                    .parse::<u32>()
                    .map_err(|_| malformed_error!("Invalid numeric NodeId: {}", text))?,
            ),
            "s" => Identifier::String(value.to_string()),
            "g" => Identifier::Guid(
                Guid::try_parse(value)
                    .map_err(|_| malformed_error!("Invalid GUID NodeId: {}", text))?,
            ),
            "b" => Identifier::ByteString(value.to_string()),
            other => {
                return Err(malformed_error!(
                    "Unknown NodeId identifier form '{}': {}",
                    other,
                    text
                ))
            }
        };
        Ok(NodeId {
            namespace,
            identifier,
        })
    }
}

/// A qualified browse name: namespace index plus name.
///
/// The text encoding is `N:name`; the `0:` prefix may be omitted and is never
/// emitted. Names containing no `:`, or whose prefix is not numeric, belong
/// to namespace 0 in their entirety.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    /// Namespace index of the name
    pub namespace: u16,
    /// The name itself
    pub name: String,
}

impl QualifiedName {
    /// Creates a qualified name in the given namespace.
    #[must_use]
    pub fn new(namespace: u16, name: impl Into<String>) -> Self {
        QualifiedName {
            namespace,
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace != 0 {
            write!(f, "{}:{}", self.namespace, self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

impl FromStr for QualifiedName {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        if let Some((prefix, name)) = text.split_once(':') {
            if let Ok(namespace) = prefix.parse::<u16>() {
                return Ok(QualifiedName {
                    namespace,
                    name: name.to_string(),
                });
            }
        }
        Ok(QualifiedName {
            namespace: 0,
            name: text.to_string(),
        })
    }
}

/// Splits an optional `ns=N;` prefix off a NodeId text form.
fn split_namespace(text: &str) -> Result<(u16, &str)> {
    if let Some(rest) = text.strip_prefix("ns=") {
        let (idx, identifier) = rest
            .split_once(';')
            .ok_or_else(|| malformed_error!("NodeId namespace prefix without ';': {}", text))?;
        let namespace = idx
            .parse::<u16>()
            .map_err(|_| malformed_error!("Invalid namespace index in NodeId: {}", text))?;
        Ok((namespace, identifier))
    } else {
        Ok((0, text))
    }
}
