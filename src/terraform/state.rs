use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use super::TerraformError;

#[derive(Clone, Deserialize)]
struct OutputValue {
    #[serde(default)]
    sensitive: bool,
    value: serde_json::Value,
}

/// Root module outputs as reported by `terraform output -json`.
#[derive(Clone, Default)]
pub struct Outputs {
    values: BTreeMap<String, OutputValue>,
}

impl fmt::Debug for Outputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, output) in &self.values {
            if output.sensitive {
                map.entry(name, &"[REDACTED]");
            } else {
                map.entry(name, &output.value);
            }
        }
        map.finish()
    }
}

impl Outputs {
    pub fn parse(json: &str) -> Result<Self, TerraformError> {
        let trimmed = json.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        let values = serde_json::from_str(trimmed)?;
        Ok(Self { values })
    }

    /// String value of `name`. Non-string values are rendered as JSON.
    pub fn get(&self, name: &str) -> Result<String, TerraformError> {
        let output = self
            .values
            .get(name)
            .ok_or_else(|| TerraformError::MissingOutput(name.to_string()))?;

        Ok(match &output.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = r#"{
  "rke2_server1_public_dns": {"sensitive": false, "type": "string", "value": "ec2-1-2-3-4.compute.amazonaws.com"},
  "rke2_server1_private_ip": {"sensitive": false, "type": "string", "value": "10.0.0.5"},
  "token": {"sensitive": true, "type": "string", "value": "secret"},
  "count": {"sensitive": false, "type": "number", "value": 3}
}"#;

    #[test]
    fn test_parse_outputs() {
        let outputs = Outputs::parse(OUTPUT).unwrap();
        assert_eq!(
            outputs.get("rke2_server1_private_ip").unwrap(),
            "10.0.0.5"
        );
        assert_eq!(outputs.get("count").unwrap(), "3");
        assert_eq!(outputs.values.len(), 4);
    }

    #[test]
    fn test_debug_redacts_sensitive_outputs() {
        let outputs = Outputs::parse(OUTPUT).unwrap();
        let debug = format!("{outputs:?}");

        assert!(!debug.contains("secret"));
        assert!(debug.contains(r#""token": "[REDACTED]""#));
        assert!(debug.contains("10.0.0.5"));
    }

    #[test]
    fn test_missing_output() {
        let outputs = Outputs::parse(OUTPUT).unwrap();
        let err = outputs.get("rke2_server2_public_dns").unwrap_err();
        assert_eq!(
            err.to_string(),
            "terraform output rke2_server2_public_dns not found"
        );
    }

    #[test]
    fn test_empty_output() {
        let outputs = Outputs::parse("\n").unwrap();
        assert!(outputs.values.is_empty());
        assert!(Outputs::parse("not json").is_err());
    }
}
