/// `PythonOption` key/value table for one configuration scope.
///
/// Keys are unique; setting an existing key replaces its value in place so
/// declaration order is kept for iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    vars: Vec<(String, String)>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        let key = key.into();
        let value = value.into();

        match self
            .vars
            .iter_mut()
            .find(|(k, _)| *k == key)
        {
            Some((_, v)) => *v = value,
            None => self.vars.push((key, value)),
        }
        self
    }

    pub fn extend<I, K, V>(&mut self, iter: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in iter {
            self.set(k, v);
        }
        self
    }

    /// Removes `key`. A `PythonOption` line with no value does this.
    pub fn unset(&mut self, key: &str) -> Option<String> {
        let pos = self
            .vars
            .iter()
            .position(|(k, _)| k == key)?;
        Some(self.vars.remove(pos).1)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Applies `child` on top of `self`, key by key.
    pub fn overlay(&mut self, child: &Options) -> &mut Self {
        self.extend(child.iter().cloned())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, String)> {
        self.vars.iter()
    }

    pub fn into_vec(self) -> Vec<(String, String)> {
        self.vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_existing_key() {
        let mut opts = Options::new();
        opts.set("mode", "dev")
            .set("db", "sqlite")
            .set("mode", "prod");

        assert_eq!(opts.len(), 2);
        assert_eq!(opts.get("mode"), Some("prod"));
        assert_eq!(
            opts.into_vec()
                .into_iter()
                .map(|(k, _)| k)
                .collect::<Vec<_>>(),
            ["mode", "db"]
        );
    }

    #[test]
    fn overlay_keeps_parent_keys() {
        let mut parent = Options::new();
        parent.set("a", "1").set("b", "2");

        let mut child = Options::new();
        child.set("b", "20").set("c", "30");

        parent.overlay(&child);

        assert_eq!(parent.get("a"), Some("1"));
        assert_eq!(parent.get("b"), Some("20"));
        assert_eq!(parent.get("c"), Some("30"));
    }

    #[test]
    fn unset_removes_key() {
        let mut opts = Options::new();
        opts.set("a", "1");
        assert_eq!(opts.unset("a"), Some("1".to_string()));
        assert_eq!(opts.unset("a"), None);
        assert!(opts.is_empty());
    }
}
