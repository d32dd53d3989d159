/// An attribute value in a generated HCL document.
///
/// `String` values are fully escaped, including template sequences, so a
/// literal `${` in user input never turns into an interpolation. Use
/// `Template` when the interpolation is intended (registration commands,
/// instance IP addresses) and `Expr` for bare traversals and raw tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Template(String),
    Number(i64),
    Bool(bool),
    List(Vec<Value>),
    Object(Vec<(String, Value)>),
    Expr(String),
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    pub fn template(value: impl Into<String>) -> Self {
        Value::Template(value.into())
    }

    pub fn expr(value: impl Into<String>) -> Self {
        Value::Expr(value.into())
    }

    /// `a.b.c` traversal built from its parts.
    pub fn traversal(parts: &[&str]) -> Self {
        Value::Expr(parts.join("."))
    }

    /// A tuple of bare references, the shape `depends_on` expects.
    pub fn references<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(items.into_iter().map(|s| Value::Expr(s.into())).collect())
    }

    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(
            items
                .into_iter()
                .map(|s| Value::String(s.into()))
                .collect(),
        )
    }

    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub(crate) fn render(&self, out: &mut String, indent: usize) {
        match self {
            Value::String(s) => {
                out.push('"');
                out.push_str(&escape_string(s));
                out.push('"');
            }
            Value::Template(s) => {
                out.push('"');
                out.push_str(&escape_template(s));
                out.push('"');
            }
            Value::Number(n) => out.push_str(&n.to_string()),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Expr(e) => out.push_str(e),
            Value::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.render(out, indent);
                }
                out.push(']');
            }
            Value::Object(entries) => {
                if entries.is_empty() {
                    out.push_str("{}");
                    return;
                }

                let width = entries
                    .iter()
                    .map(|(k, _)| object_key(k).len())
                    .max()
                    .unwrap_or(0);

                out.push_str("{\n");
                for (key, value) in entries {
                    push_indent(out, indent + 1);
                    let key = object_key(key);
                    out.push_str(&format!("{key:<width$} = "));
                    value.render(out, indent + 1);
                    out.push('\n');
                }
                push_indent(out, indent);
                out.push('}');
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

/// Quoted list of strings, e.g. `["sg-1", "sg-2"]`.
pub fn list_of_strings(items: &[String]) -> Value {
    Value::strings(items.iter().cloned())
}

pub(crate) fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

pub(crate) fn escape_string(input: &str) -> String {
    let escaped = escape_template(input);
    escaped.replace("${", "$${").replace("%{", "%%{")
}

fn escape_template(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn object_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        format!("\"{}\"", escape_string(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(value: &Value) -> String {
        let mut out = String::new();
        value.render(&mut out, 0);
        out
    }

    #[test]
    fn test_string_escapes_quotes_and_newlines() {
        let value = Value::string("say \"hi\"\nbye");
        assert_eq!(rendered(&value), r#""say \"hi\"\nbye""#);
    }

    #[test]
    fn test_string_escapes_interpolation() {
        let value = Value::string("${not_a_reference}");
        assert_eq!(rendered(&value), r#""$${not_a_reference}""#);
    }

    #[test]
    fn test_template_keeps_interpolation() {
        let value = Value::template("${aws_instance.server1.public_ip}");
        assert_eq!(rendered(&value), r#""${aws_instance.server1.public_ip}""#);
    }

    #[test]
    fn test_integer_literals_convert() {
        assert_eq!(Value::from(2), Value::Number(2));
        assert_eq!(Value::from(-1), Value::Number(-1));
        assert_eq!(Value::from(3u32), Value::Number(3));
        assert_eq!(rendered(&Value::from(1)), "1");
    }

    #[test]
    fn test_list_of_strings() {
        let value = list_of_strings(&["sg-1".to_string(), "sg-2".to_string()]);
        assert_eq!(rendered(&value), r#"["sg-1", "sg-2"]"#);
    }

    #[test]
    fn test_references_are_bare() {
        let value = Value::references(["rancher2_node_template.c1", "rancher2_cluster.c1"]);
        assert_eq!(
            rendered(&value),
            "[rancher2_node_template.c1, rancher2_cluster.c1]"
        );
    }

    #[test]
    fn test_traversal() {
        let value = Value::traversal(&["rancher2_cluster", "tfp-abc", "id"]);
        assert_eq!(rendered(&value), "rancher2_cluster.tfp-abc.id");
    }

    #[test]
    fn test_object_aligns_keys() {
        let value = Value::object([
            ("source", Value::string("rancher/rancher2")),
            ("version", Value::string("5.1.0")),
        ]);
        assert_eq!(
            rendered(&value),
            "{\n  source  = \"rancher/rancher2\"\n  version = \"5.1.0\"\n}"
        );
    }

    #[test]
    fn test_object_quotes_non_identifier_keys() {
        let value = Value::object([("kubernetes.io/role", Value::Bool(true))]);
        assert!(rendered(&value).contains("\"kubernetes.io/role\" = true"));
    }

    #[test]
    fn test_scalars() {
        assert_eq!(rendered(&Value::from(30i64)), "30");
        assert_eq!(rendered(&Value::from(false)), "false");
        assert_eq!(rendered(&Value::from(3u32)), "3");
    }
}
