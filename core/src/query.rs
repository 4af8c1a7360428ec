//! Query-string encoding for typed request options.

/// Typed query options attached to a request.
///
/// Implementations return only the non-default fields, in a stable order,
/// with repeatable keys emitted once per element.
pub trait QueryOptions {
    fn query_pairs(&self) -> Vec<(String, String)>;
}

/// Form-url-encode `pairs` into a query string (no leading `?`).
pub fn encode_query<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key.as_ref(), value.as_ref());
    }
    serializer.finish()
}
