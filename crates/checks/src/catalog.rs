//! Message templates and suppression overrides, keyed by issue kind
//!
//! A broken or missing entry never stops a run: it is logged and degrades
//! to an empty message or the severity's default suppression.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::error;

use crate::LOG_TARGET;
use crate::issue::{Attributes, Issue, IssueKind, RenderedIssue};
use crate::template;

/// Suppression override as written in the configuration
///
/// Accepts both `FOO = 12` and `FOO = "12"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SuppressionSetting {
    Hours(i64),
    Text(String),
}

impl SuppressionSetting {
    fn hours(&self) -> Option<u32> {
        match self {
            SuppressionSetting::Hours(hours) => u32::try_from(*hours).ok(),
            SuppressionSetting::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    templates: BTreeMap<String, String>,
    suppression: BTreeMap<String, SuppressionSetting>,
}

impl MessageCatalog {
    pub fn new(
        templates: BTreeMap<String, String>,
        suppression: BTreeMap<String, SuppressionSetting>,
    ) -> Self {
        Self {
            templates,
            suppression,
        }
    }

    /// Issue kinds without a message template
    pub fn missing_templates(&self) -> Vec<IssueKind> {
        IssueKind::ALL
            .into_iter()
            .filter(|kind| !self.templates.contains_key(kind.as_str()))
            .collect()
    }

    /// The template of `kind`, logging its absence
    fn template(&self, kind: IssueKind) -> Option<&str> {
        let template = self.templates.get(kind.as_str());
        if template.is_none() {
            error!(
                target: LOG_TARGET,
                template = %kind,
                "Missing configuration value: msg.{kind}"
            );
        }
        template.map(String::as_str)
    }

    fn apply(&self, kind: IssueKind, template: &str, attrs: &Attributes) -> Option<String> {
        template::render(template, attrs)
            .inspect_err(|err| {
                error!(
                    target: LOG_TARGET,
                    template = %kind,
                    ?attrs,
                    %err,
                    "Unable to apply attributes to message template"
                );
            })
            .ok()
    }

    /// Description of the problem, empty if the template is unusable
    pub fn message(&self, issue: &Issue) -> String {
        self.template(issue.kind())
            .and_then(|template| self.apply(issue.kind(), template, issue.attrs()))
            .unwrap_or_default()
    }

    /// Key identifying the underlying condition across runs
    ///
    /// Derived from the message with volatile attributes zeroed, so that
    /// changing counts don't defeat suppression.
    pub fn suppression_key(&self, issue: &Issue) -> String {
        let template = self.templates.get(issue.kind().as_str());
        self.key_from(issue, template.map(String::as_str))
    }

    /// Unusable templates are reported when rendering the message, so
    /// this stays quiet
    fn key_from(&self, issue: &Issue, template: Option<&str>) -> String {
        let stable = issue.stable_attrs();
        let key = match template.and_then(|template| template::render(template, &stable).ok()) {
            Some(message) if !message.is_empty() => message,
            _ => {
                let mut fallback = issue.kind().as_str().to_owned();
                for (name, value) in &stable {
                    fallback.push_str(&format!(" {name}={value}"));
                }
                fallback
            }
        };
        key.replace(' ', "_")
    }

    /// Hours to hold back a repeat notification, zero meaning never
    pub fn suppression_hours(&self, issue: &Issue) -> u32 {
        let default = issue.runlevel().default_suppression_hours();

        let Some(setting) = self.suppression.get(issue.kind().as_str()) else {
            return default;
        };

        setting.hours().unwrap_or_else(|| {
            error!(
                target: LOG_TARGET,
                template = %issue.kind(),
                ?setting,
                "Non-numeric suppression time"
            );
            default
        })
    }

    pub fn render(&self, issue: Issue) -> RenderedIssue {
        let template = self.template(issue.kind());
        let message = template
            .and_then(|template| self.apply(issue.kind(), template, issue.attrs()))
            .unwrap_or_default();

        RenderedIssue {
            message,
            suppression_key: self.key_from(&issue, template),
            suppression_hours: self.suppression_hours(&issue),
            issue,
        }
    }
}

#[cfg(test)]
mod tests;
