//! Context threshold tables
//!
//! Per-context approve/reject thresholds are data, not code: the built-in
//! table can be replaced wholesale from YAML and each context is testable
//! on its own.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use imageguard_core::{Error, Result};

/// Fallback context applied to unrecognized keys; also the strictest
/// built-in gallery surface
pub const DEFAULT_CONTEXT: &str = "public_gallery";

/// Approve/reject threshold pair for one content context
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextThresholds {
    /// Risk at or below which content auto-approves
    pub auto_approve: f32,

    /// Risk at or above which content auto-rejects
    pub auto_reject: f32,
}

impl ContextThresholds {
    pub fn new(auto_approve: f32, auto_reject: f32) -> Self {
        Self {
            auto_approve,
            auto_reject,
        }
    }
}

/// The full set of context threshold tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextPolicySet {
    contexts: BTreeMap<String, ContextThresholds>,
}

impl ContextPolicySet {
    /// The built-in table
    pub fn builtin() -> Self {
        let mut contexts = BTreeMap::new();
        contexts.insert(
            "public_gallery".to_string(),
            ContextThresholds::new(20.0, 80.0),
        );
        contexts.insert(
            "private_gallery".to_string(),
            ContextThresholds::new(60.0, 95.0),
        );
        contexts.insert(
            "paysite_content".to_string(),
            ContextThresholds::new(40.0, 90.0),
        );
        contexts.insert("profile_pic".to_string(), ContextThresholds::new(15.0, 70.0));
        Self { contexts }
    }

    /// Load a policy set from YAML.
    ///
    /// The default context is injected from the built-in table when the
    /// document omits it, so an unrecognized request context always has a
    /// usable fallback entry.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut set: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::policy(format!("failed to parse context policy: {}", e)))?;

        if !set.contexts.contains_key(DEFAULT_CONTEXT) {
            set.contexts.insert(
                DEFAULT_CONTEXT.to_string(),
                Self::builtin().contexts[DEFAULT_CONTEXT],
            );
        }

        set.validate()?;
        Ok(set)
    }

    /// Load a policy set from a file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml(&content)?)
    }

    /// Check every context's threshold pair is coherent
    pub fn validate(&self) -> Result<()> {
        for (context, thresholds) in &self.contexts {
            if !thresholds.auto_approve.is_finite() || !thresholds.auto_reject.is_finite() {
                return Err(Error::policy(format!(
                    "context '{}' has non-finite thresholds",
                    context
                )));
            }
            if thresholds.auto_approve >= thresholds.auto_reject {
                return Err(Error::policy(format!(
                    "context '{}': auto_approve {} must be below auto_reject {}",
                    context, thresholds.auto_approve, thresholds.auto_reject
                )));
            }
        }
        Ok(())
    }

    /// Resolve a context key to its thresholds; unknown keys fall back to
    /// the default context. Returns the resolved key alongside the pair so
    /// decisions record which table actually applied.
    pub fn resolve(&self, context: &str) -> (&str, ContextThresholds) {
        match self.contexts.get_key_value(context) {
            Some((key, thresholds)) => (key.as_str(), *thresholds),
            None => {
                let thresholds = self
                    .contexts
                    .get(DEFAULT_CONTEXT)
                    .copied()
                    .unwrap_or_else(|| Self::builtin().contexts[DEFAULT_CONTEXT]);
                (DEFAULT_CONTEXT, thresholds)
            }
        }
    }

    /// Insert or replace a context entry
    pub fn insert(&mut self, context: impl Into<String>, thresholds: ContextThresholds) {
        self.contexts.insert(context.into(), thresholds);
    }

    /// All configured context names
    pub fn context_names(&self) -> impl Iterator<Item = &str> {
        self.contexts.keys().map(String::as_str)
    }
}

impl Default for ContextPolicySet {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_contexts() {
        let set = ContextPolicySet::builtin();

        let (_, public) = set.resolve("public_gallery");
        assert_eq!(public.auto_approve, 20.0);
        assert_eq!(public.auto_reject, 80.0);

        let (_, private) = set.resolve("private_gallery");
        assert_eq!(private.auto_approve, 60.0);
        assert_eq!(private.auto_reject, 95.0);

        let (_, paysite) = set.resolve("paysite_content");
        assert_eq!(paysite.auto_approve, 40.0);
        assert_eq!(paysite.auto_reject, 90.0);

        let (_, profile) = set.resolve("profile_pic");
        assert_eq!(profile.auto_approve, 15.0);
        assert_eq!(profile.auto_reject, 70.0);
    }

    #[test]
    fn test_unknown_context_falls_back_to_strictest_default() {
        let set = ContextPolicySet::builtin();

        let (resolved, thresholds) = set.resolve("marketplace_listing");

        assert_eq!(resolved, "public_gallery");
        assert_eq!(thresholds.auto_approve, 20.0);
    }

    #[test]
    fn test_yaml_round_trip() {
        let yaml = r#"
contexts:
  public_gallery:
    auto_approve: 10.0
    auto_reject: 60.0
  forum_avatar:
    auto_approve: 5.0
    auto_reject: 50.0
"#;

        let set = ContextPolicySet::from_yaml(yaml).unwrap();

        let (_, avatar) = set.resolve("forum_avatar");
        assert_eq!(avatar.auto_reject, 50.0);

        let (_, public) = set.resolve("public_gallery");
        assert_eq!(public.auto_approve, 10.0);
    }

    #[test]
    fn test_yaml_without_default_gets_builtin_entry() {
        let yaml = r#"
contexts:
  forum_avatar:
    auto_approve: 5.0
    auto_reject: 50.0
"#;

        let set = ContextPolicySet::from_yaml(yaml).unwrap();

        let (resolved, thresholds) = set.resolve("anything_else");
        assert_eq!(resolved, "public_gallery");
        assert_eq!(thresholds.auto_reject, 80.0);
    }

    #[test]
    fn test_invalid_threshold_order_rejected() {
        let yaml = r#"
contexts:
  public_gallery:
    auto_approve: 90.0
    auto_reject: 30.0
"#;

        assert!(ContextPolicySet::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "contexts:\n  paysite_content:\n    auto_approve: 30.0\n    auto_reject: 85.0\n"
        )
        .unwrap();

        let set = ContextPolicySet::from_file(file.path()).unwrap();

        let (_, paysite) = set.resolve("paysite_content");
        assert_eq!(paysite.auto_approve, 30.0);
        // default context injected
        let (resolved, _) = set.resolve("unknown");
        assert_eq!(resolved, "public_gallery");
    }

    #[test]
    fn test_insert_overrides() {
        let mut set = ContextPolicySet::builtin();
        set.insert("public_gallery", ContextThresholds::new(5.0, 40.0));

        let (_, thresholds) = set.resolve("public_gallery");
        assert_eq!(thresholds.auto_reject, 40.0);
    }
}
