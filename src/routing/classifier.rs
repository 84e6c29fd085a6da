//! Request classification.
//!
//! # Responsibilities
//! - Reject hosts outside the serving domain
//! - Run the rule chain and report which rule sent a request to the primary
//! - Produce the diagnostic status written to the access log
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Total: every input yields exactly one upstream and a non-empty status
//! - The domain gate is substring containment, not a suffix match

use std::fmt;

use crate::config::RouterConfig;
use crate::http::request::RequestView;
use crate::routing::rules::RuleChain;

/// Which upstream a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Primary,
    Default,
}

/// Why a request was routed the way it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason<'a> {
    /// Host does not contain the serving domain.
    OutsideDomain { domain: &'a str },
    RuleMatched { rule: &'static str },
    NoRuleMatched,
}

impl fmt::Display for Reason<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::OutsideDomain { domain } => {
                write!(f, "Request failed to match rule for 'contains {domain}'")
            }
            Reason::RuleMatched { rule } => write!(f, "Request matched rule for '{rule}'"),
            Reason::NoRuleMatched => f.write_str("Request matched no rules"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<'a> {
    pub upstream: Upstream,
    pub reason: Reason<'a>,
}

impl Classification<'_> {
    /// Status line for the access log.
    pub fn status(&self) -> String {
        self.reason.to_string()
    }
}

/// Decides between the primary and default upstream.
#[derive(Debug)]
pub struct Classifier {
    domain: String,
    rules: RuleChain,
}

impl Classifier {
    pub fn new(domain: impl Into<String>, rules: RuleChain) -> Self {
        Self {
            domain: domain.into(),
            rules,
        }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(config.host_domain.clone(), RuleChain::wfc())
    }

    pub fn classify(&self, req: &RequestView<'_>) -> Classification<'_> {
        if !req.host().contains(self.domain.as_str()) {
            return Classification {
                upstream: Upstream::Default,
                reason: Reason::OutsideDomain {
                    domain: &self.domain,
                },
            };
        }

        match self.rules.first_match(req) {
            Some(rule) => Classification {
                upstream: Upstream::Primary,
                reason: Reason::RuleMatched { rule },
            },
            None => Classification {
                upstream: Upstream::Default,
                reason: Reason::NoRuleMatched,
            },
        }
    }
}
