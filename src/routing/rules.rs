//! Routing rules.
//!
//! # Responsibilities
//! - Test a request's host or target against one routing condition
//! - Report a human-readable rule name for the access log
//!
//! # Design Decisions
//! - Rules are pure and stateless; none look at method, headers or body
//! - Host comparisons are case-sensitive over the raw host
//! - Path/target comparisons are exact unless the rule says prefix

use once_cell::sync::Lazy;
use regex::Regex;

use crate::http::request::RequestView;

static SAKE_HOST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-z\-]+\.)?sake\.gs\.").unwrap());
static GAMESTATS_HOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z\-]+\.)?gamestats2?\.gs\.").unwrap());
static RACE_HOST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-z\-]+\.)?race\.gs\.").unwrap());
static STAGE1_TARGET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/w[0-9]$").unwrap());

/// A named predicate over a request.
pub trait Rule: Send + Sync + std::fmt::Debug {
    /// Name reported when this rule matches.
    fn name(&self) -> &'static str;

    /// Returns true if the request satisfies this rule.
    fn matches(&self, req: &RequestView<'_>) -> bool;
}

/// The condition a [`NamedRule`] checks.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Host matches the pattern (anchored by the pattern itself).
    HostPattern(&'static Regex),
    HostPrefix(&'static str),
    /// Target (path plus query) equals one of the values.
    TargetOneOf(&'static [&'static str]),
    TargetPrefix(&'static str),
    TargetPattern(&'static Regex),
    PathEquals(&'static str),
    PathPrefix(&'static str),
}

impl Condition {
    pub fn matches(&self, req: &RequestView<'_>) -> bool {
        match self {
            Condition::HostPattern(re) => re.is_match(req.host()),
            Condition::HostPrefix(prefix) => req.host().starts_with(prefix),
            Condition::TargetOneOf(targets) => targets.contains(&req.target()),
            Condition::TargetPrefix(prefix) => req.target().starts_with(prefix),
            Condition::TargetPattern(re) => re.is_match(req.target()),
            Condition::PathEquals(path) => req.path() == *path,
            Condition::PathPrefix(prefix) => req.path().starts_with(prefix),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NamedRule {
    name: &'static str,
    condition: Condition,
}

impl NamedRule {
    pub fn new(name: &'static str, condition: Condition) -> Self {
        Self { name, condition }
    }
}

impl Rule for NamedRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn matches(&self, req: &RequestView<'_>) -> bool {
        self.condition.matches(req)
    }
}

/// Ordered rules, evaluated front to back; the first match wins.
#[derive(Debug)]
pub struct RuleChain {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleChain {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Rules for traffic served by the WFC backend.
    ///
    /// Keep in sync with the host/path dispatch in wfc-server's `nas/main.go`.
    pub fn wfc() -> Self {
        let rule = |name: &'static str, condition: Condition| {
            Box::new(NamedRule::new(name, condition)) as Box<dyn Rule>
        };

        Self::new(vec![
            rule("*.sake.gs.* or sake.gs.*", Condition::HostPattern(&SAKE_HOST)),
            rule(
                "*.gamestats(2).gs.* or gamestats(2).gs.*",
                Condition::HostPattern(&GAMESTATS_HOST),
            ),
            rule("*.race.gs.* or race.gs.*", Condition::HostPattern(&RACE_HOST)),
            rule("conntest", Condition::HostPrefix("conntest.")),
            rule("dwc auth", Condition::TargetOneOf(&["/ac", "/pr", "/download"])),
            rule("nastest.jsp", Condition::PathEquals("/nastest.jsp")),
            rule("payload", Condition::TargetPrefix("/payload")),
            rule("stage1", Condition::TargetPattern(&STAGE1_TARGET)),
            rule("api", Condition::PathPrefix("/api")),
        ])
    }

    /// Name of the first rule that matches, if any.
    pub fn first_match(&self, req: &RequestView<'_>) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(req))
            .map(|rule| rule.name())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(host: &str, target: &str) -> Option<&'static str> {
        RuleChain::wfc().first_match(&RequestView::new(host, target))
    }

    #[test]
    fn test_rule_order() {
        let names: Vec<_> = RuleChain::wfc().names().collect();
        assert_eq!(
            names,
            [
                "*.sake.gs.* or sake.gs.*",
                "*.gamestats(2).gs.* or gamestats(2).gs.*",
                "*.race.gs.* or race.gs.*",
                "conntest",
                "dwc auth",
                "nastest.jsp",
                "payload",
                "stage1",
                "api",
            ]
        );
    }

    #[test]
    fn test_sake_host() {
        let rule = Condition::HostPattern(&SAKE_HOST);
        assert!(rule.matches(&RequestView::new("sake.gs.example.com", "/")));
        assert!(rule.matches(&RequestView::new("mariokartwii.sake.gs.example.com", "/")));
        assert!(rule.matches(&RequestView::new("mario-kart.sake.gs.example.com", "/")));

        // Anchored at the start and case-sensitive.
        assert!(!rule.matches(&RequestView::new("a.b.sake.gs.example.com", "/")));
        assert!(!rule.matches(&RequestView::new("Game.sake.gs.example.com", "/")));
        assert!(!rule.matches(&RequestView::new("SAKE.gs.example.com", "/")));
        assert!(!rule.matches(&RequestView::new("game1.sake.gs.example.com", "/")));
    }

    #[test]
    fn test_gamestats_host() {
        let rule = Condition::HostPattern(&GAMESTATS_HOST);
        assert!(rule.matches(&RequestView::new("gamestats.gs.example.com", "/")));
        assert!(rule.matches(&RequestView::new("gamestats2.gs.example.com", "/")));
        assert!(rule.matches(&RequestView::new("mkw.gamestats2.gs.example.com", "/")));
        assert!(!rule.matches(&RequestView::new("gamestats3.gs.example.com", "/")));
    }

    #[test]
    fn test_race_host() {
        let rule = Condition::HostPattern(&RACE_HOST);
        assert!(rule.matches(&RequestView::new("race.gs.example.com", "/")));
        assert!(rule.matches(&RequestView::new("mariokartwii.race.gs.example.com", "/")));
        assert!(!rule.matches(&RequestView::new("racer.gs.example.com", "/")));
    }

    #[test]
    fn test_conntest_host() {
        let rule = Condition::HostPrefix("conntest.");
        assert!(rule.matches(&RequestView::new("conntest.example.com", "/")));
        assert!(!rule.matches(&RequestView::new("www.conntest.example.com", "/")));
        assert!(!rule.matches(&RequestView::new("conntest", "/")));
    }

    #[test]
    fn test_dwc_auth_is_exact() {
        for target in ["/ac", "/pr", "/download"] {
            assert_eq!(first("nas.example.com", target), Some("dwc auth"));
        }
        assert_eq!(first("nas.example.com", "/ac?x=1"), None);
        assert_eq!(first("nas.example.com", "/acc"), None);
        assert_eq!(first("nas.example.com", "/download/"), None);
    }

    #[test]
    fn test_nastest() {
        assert_eq!(first("nas.example.com", "/nastest.jsp"), Some("nastest.jsp"));
        assert_eq!(first("nas.example.com", "/nastest.jsp?q=1"), Some("nastest.jsp"));
        assert_eq!(first("nas.example.com", "/nastest.jspx"), None);
        assert_eq!(first("nas.example.com", "/nastest%2Ejsp"), Some("nastest.jsp"));
    }

    #[test]
    fn test_payload_prefix() {
        assert_eq!(first("nas.example.com", "/payload"), Some("payload"));
        assert_eq!(first("nas.example.com", "/payload?g=RMCPD00"), Some("payload"));
        assert_eq!(first("nas.example.com", "/payloads/x"), Some("payload"));
        assert_eq!(first("nas.example.com", "/x/payload"), None);
    }

    #[test]
    fn test_stage1() {
        assert_eq!(first("nas.example.com", "/w5"), Some("stage1"));
        assert_eq!(first("nas.example.com", "/w0"), Some("stage1"));
        assert_eq!(first("nas.example.com", "/w"), None);
        assert_eq!(first("nas.example.com", "/w12"), None);
        assert_eq!(first("nas.example.com", "/www5"), None);
        assert_eq!(first("nas.example.com", "/w5?x"), None);
    }

    #[test]
    fn test_api_prefix() {
        assert_eq!(first("nas.example.com", "/api"), Some("api"));
        assert_eq!(first("nas.example.com", "/api/groups?id=1"), Some("api"));
        assert_eq!(first("nas.example.com", "/apis"), Some("api"));
        assert_eq!(first("nas.example.com", "/v1/api"), None);
        assert_eq!(first("nas.example.com", "/%61pi/x"), Some("api"));
    }

    #[test]
    fn test_target_rules_see_raw_escapes() {
        assert_eq!(first("nas.example.com", "/%61c"), None);
        assert_eq!(first("nas.example.com", "/%70ayload"), None);
        assert_eq!(first("nas.example.com", "/w%35"), None);
    }

    #[test]
    fn test_first_match_wins() {
        // Host and path rules both apply; the host rule comes first.
        assert_eq!(
            first("foo.sake.gs.example.com", "/api/x"),
            Some("*.sake.gs.* or sake.gs.*")
        );
        assert_eq!(first("conntest.example.com", "/ac"), Some("conntest"));
    }

    #[test]
    fn test_degenerate_input() {
        assert_eq!(first("", ""), None);
        assert_eq!(first("", "?"), None);
        assert_eq!(first("\u{0}", "*"), None);
    }

    #[test]
    fn test_custom_chain() {
        let chain = RuleChain::new(vec![Box::new(NamedRule::new(
            "static",
            Condition::PathPrefix("/static"),
        ))]);
        assert_eq!(chain.names().count(), 1);
        assert_eq!(
            chain.first_match(&RequestView::new("x", "/static/a.css")),
            Some("static")
        );
        assert_eq!(
            RuleChain::new(Vec::new()).first_match(&RequestView::new("x", "/")),
            None
        );
    }
}
