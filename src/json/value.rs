use indexmap::IndexMap;

/// Object representation: insertion-ordered, unique keys.
pub type Map = IndexMap<String, Json>;

/// A parsed JSON document.
///
/// # Examples
///
/// ```rust
/// use parsnip::Json;
/// let n = Json::Number(3.5);
/// assert_eq!(n.type_name(), "number");
/// assert_eq!(n.raw_number(), Some(3.5));
/// assert_eq!(n.raw_bool(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Json {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Json>),
    Object(Map),
}

impl Json {
    /// Builds an object from key/value pairs. A repeated key keeps its first
    /// position and takes the last value.
    pub fn object<K, I>(pairs: I) -> Json
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Json)>,
    {
        let mut map = Map::new();
        for (key, value) in pairs {
            map.insert(key.into(), value);
        }
        Json::Object(map)
    }

    pub fn array(items: impl IntoIterator<Item = Json>) -> Json {
        Json::Array(items.into_iter().collect())
    }

    /// Name of this value's tag, as used in conversion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Json::Null => "null",
            Json::Bool(_) => "bool",
            Json::Number(_) => "number",
            Json::String(_) => "string",
            Json::Array(_) => "array",
            Json::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Json::Null)
    }

    // ------------------------------------------------------------------------
    // Raw extraction: no coercion across tags
    // ------------------------------------------------------------------------

    pub fn raw_null(&self) -> Option<()> {
        match self {
            Json::Null => Some(()),
            _ => None,
        }
    }

    pub fn raw_bool(&self) -> Option<bool> {
        match self {
            Json::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn raw_number(&self) -> Option<f64> {
        match self {
            Json::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn raw_string(&self) -> Option<&str> {
        match self {
            Json::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn raw_array(&self) -> Option<&[Json]> {
        match self {
            Json::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn raw_object(&self) -> Option<&Map> {
        match self {
            Json::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl From<bool> for Json {
    fn from(value: bool) -> Self {
        Json::Bool(value)
    }
}

impl From<f64> for Json {
    fn from(value: f64) -> Self {
        Json::Number(value)
    }
}

impl From<&str> for Json {
    fn from(value: &str) -> Self {
        Json::String(value.to_string())
    }
}

impl From<String> for Json {
    fn from(value: String) -> Self {
        Json::String(value)
    }
}

impl From<Vec<Json>> for Json {
    fn from(items: Vec<Json>) -> Self {
        Json::Array(items)
    }
}

impl From<Map> for Json {
    fn from(map: Map) -> Self {
        Json::Object(map)
    }
}
