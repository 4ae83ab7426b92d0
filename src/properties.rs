use std::collections::HashMap;
use std::io::BufRead;

use anyhow::{anyhow, Context, Result};
use paste::paste;

/// A bag of string-valued options in the classic line-oriented workload-file
/// format: one `key=value` per line, `#` starts a comment line, blank lines
/// are ignored.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: HashMap<String, String>,
}

macro_rules! typed_getters {
    ($( {$type:ty, $name:ident}, )*) => {
        paste! {
            $(
                #[doc = "Look up `key` parsed as `" $name "`, or `default` when absent."]
                pub fn [<get_ $name>](&self, key: &str, default: $type) -> Result<$type> {
                    match self.get(key) {
                        Some(raw) => raw
                            .parse::<$type>()
                            .map_err(|e| anyhow!("property {key}={raw}: {e}")),
                        None => Ok(default),
                    }
                }
            )*
        }
    };
}

impl Properties {
    /// Create an empty property bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse properties from a reader, one `key=value` per line.
    pub fn load(reader: impl BufRead) -> Result<Self> {
        let mut props = Self::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("reading workload file at line {}", index + 1))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| anyhow!("malformed property at line {}: {line:?}", index + 1))?;
            props.set(key.trim(), value.trim());
        }
        Ok(props)
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up `key` as a raw string.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|value| value.as_str())
    }

    /// Look up `key` as a raw string, or `default` when absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    typed_getters! {
        {u64, u64},
        {usize, usize},
        {f64, f64},
        {bool, bool},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load() {
        let file = "\
# workload A: update heavy
recordcount=1000

readproportion=0.5
updateproportion = 0.5
requestdistribution=zipfian
";
        let props = Properties::load(file.as_bytes()).unwrap();
        assert_eq!(props.get("recordcount"), Some("1000"));
        assert_eq!(props.get("updateproportion"), Some("0.5"));
        assert_eq!(props.get("requestdistribution"), Some("zipfian"));
        assert_eq!(props.get("readmodifywriteproportion"), None);
    }

    #[test]
    fn test_malformed_line() {
        assert!(Properties::load("recordcount".as_bytes()).is_err());
    }

    #[test]
    fn test_typed_getters() {
        let mut props = Properties::new();
        props.set("recordcount", "1000");
        props.set("readproportion", "0.95");
        props.set("readallfields", "true");

        assert_eq!(props.get_u64("recordcount", 0).unwrap(), 1000);
        assert_eq!(props.get_u64("operationcount", 7).unwrap(), 7);
        assert_eq!(props.get_f64("readproportion", 0.0).unwrap(), 0.95);
        assert!(props.get_bool("readallfields", false).unwrap());

        props.set("recordcount", "many");
        assert!(props.get_u64("recordcount", 0).is_err());
    }
}
