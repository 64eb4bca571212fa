use std::collections::HashMap;
use time::OffsetDateTime;
use time::macros::format_description;

/// Template processor for resolving $VARIABLE references in configured paths
pub struct Tpl {
    variables: HashMap<String, String>,
}

impl Tpl {
    pub fn new() -> Self {
        Self {
            variables: HashMap::new(),
        }
    }

    /// Template with the standard NAME, VERSION, PLATFORM and DATE variables
    pub fn with_package(name: &str, version: &str) -> Self {
        let mut tpl = Self::new();
        tpl.register("NAME", name);
        tpl.register("VERSION", version);
        tpl.register("PLATFORM", crate::platform::Platform::current().as_str());
        tpl.register("DATE", today());
        tpl
    }

    /// Register a variable with its value
    pub fn register<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.variables.insert(key.into(), value.into());
    }

    /// Resolve all $VARIABLE references. Unknown variables are left as-is.
    pub fn parse(&self, input: &str) -> String {
        let mut result = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(pos) = rest.find('$') {
            result.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let len = after
                .find(|c: char| !(c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'))
                .unwrap_or(after.len());
            let key = &after[..len];

            match self.variables.get(key) {
                Some(value) if !key.is_empty() => result.push_str(value),
                _ => {
                    result.push('$');
                    result.push_str(key);
                }
            }
            rest = &after[len..];
        }

        result.push_str(rest);
        result
    }
}

impl Default for Tpl {
    fn default() -> Self {
        Self::new()
    }
}

fn today() -> String {
    OffsetDateTime::now_utc()
        .date()
        .format(format_description!("[year][month][day]"))
        .unwrap_or_default()
}
