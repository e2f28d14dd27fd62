//! Ordered catalog of known CI failure signatures.
//!
//! Order is part of the contract: when several rules match the same line,
//! the earliest one decides the reported cause. A catalog is validated on
//! construction and never changes afterwards.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::rule::{EvidenceSource, Rule};

/// Immutable, validated list of rules in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
}

impl RuleCatalog {
    /// Validate and wrap `rules`, keeping their order.
    pub fn new(rules: Vec<Rule>) -> Result<Self> {
        validate(&rules)?;
        Ok(Self { rules })
    }

    /// Parse a JSON array of rules.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Vec<Rule> = serde_json::from_str(json)?;
        Self::new(rules)
    }

    /// Load a JSON catalog file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        debug!(path = %path.display(), rules = catalog.len(), "loaded rule catalog");
        Ok(catalog)
    }

    /// Append `extra` after the existing rules, so they rank below them.
    pub fn extend(self, extra: Vec<Rule>) -> Result<Self> {
        let mut rules = self.rules;
        rules.extend(extra);
        Self::new(rules)
    }

    /// Rules in priority order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Signatures seen in the Rancher Drone pipelines.
    ///
    /// `go-test-failure` is the only non-terminal rule: `--- FAIL:` recurs
    /// once per failing test, and a more specific cause may appear later.
    /// Because it sits before the named flaky-test rules, a `--- FAIL:`
    /// line is always reported through it.
    pub fn builtin() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate(rules: &[Rule]) -> Result<()> {
    if rules.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut seen = HashSet::new();
    for rule in rules {
        if !seen.insert(rule.name.as_str()) {
            return Err(CatalogError::DuplicateName(rule.name.clone()));
        }
        for (field, fragment) in rule.matcher.required_fragments() {
            if fragment.is_empty() {
                return Err(CatalogError::EmptyFragment {
                    rule: rule.name.clone(),
                    field,
                });
            }
        }
    }
    Ok(())
}

const PYTEST_FAILURES: &str =
    "=================================== FAILURES ===================================";
const PYTEST_ERRORS: &str =
    "==================================== ERRORS ====================================";

fn builtin_rules() -> Vec<Rule> {
    vec![
        Rule::substring("go-undefined", "bad code", "undefined: "),
        Rule::substring("powershell-command", "powershell command", "The command 'powershell"),
        Rule::substring("gofmt", "gofmt", "File is not `gofmt`-ed (gofmt)"),
        Rule::substring(
            "github-clone",
            "github clone error",
            "fatal: unable to access 'https://github.com/rancher/rancher.git/': OpenSSL SSL_connect: Connection reset by peer in connection to github.com:443",
        ),
        Rule::substring("helm-mirror", "helm mirror unreachable", "Failed to connect to get.helm.sh"),
        Rule::substring("unmergeable", "unmergeable code", "not something we can merge"),
        Rule::substring("dirty-repo", "dirty repo", "Encountered dirty repo! Aborting."),
        Rule::substring("fossa", "fossa", "The scan has revealed issues. Number of issues found"),
        Rule::substring(
            "image-origins",
            "missing image origins",
            "not all images have a source code origin defined. Please provide origin URL's within rancher/pkg/image/origins.go for the following images",
        ),
        Rule::prefix_suffix(
            "provisioning-tests-run",
            "provisioning tests could not start rancher",
            "./scripts/provisioning-tests: line 13:",
            "run_rancher",
        ),
        Rule::substring("k3d-import", "k3d cluster import", "error creating and importing a k3d cluster:"),
        Rule::prefix_contains(
            "system-library-catalog",
            "system library catalog",
            "The command '/bin/sh -c mkdir -p /var/lib/rancher-data/local-catalogs/system-library &&",
            "returned a non-zero code: ",
        ),
        Rule::substring("zypper", "zypper", "The command '/bin/sh -c zypper"),
        Rule::substring("zypper-buildkit", "zypper", "ERROR: process \"/bin/sh -c zypper"),
        Rule::substring("go-test-failure", "go test failure", "--- FAIL:").non_terminal(),
        Rule::lookahead(
            "webhook-unavailable",
            "webhook failure",
            "rancher-webhook was not available after",
            "Stopping rancher server",
        )
        .evidence_from(EvidenceSource::MatchedLine),
        Rule::lookahead("pytest-failures", "pytest failure", PYTEST_FAILURES, ""),
        Rule::lookahead("pytest-errors", "pytest error", PYTEST_ERRORS, ""),
        Rule::substring("flaky-alert-access", "flaky test", "ERROR test_alert.py::test_alert_access"),
        Rule::substring(
            "flaky-etcd-scale-down",
            "flaky test",
            "FAIL: Test_Provisioning_MP_ThreeEtcdNodesScaledDownThenDelete",
        ),
        Rule::substring(
            "flaky-etcd-snapshot",
            "flaky test",
            "FAIL: Test_Operation_Custom_EtcdSnapshotOperationsOnNewNode",
        ),
        Rule::substring("windows-exited", "windows container exited", "throw \"EXITED\""),
    ]
}
