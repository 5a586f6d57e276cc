//! Verb override rules for HTML forms.
//!
//! Browsers can only submit forms as GET or POST, so the donation management
//! pages POST to dedicated paths and these rules decide which verb the
//! submission stands for. The decision is made before routing.

use axum::http::Method;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerbCondition {
    Always,
    /// The urlencoded body carries `method=<value>` (case-insensitive).
    FormMethod(&'static str),
}

#[derive(Debug, Clone)]
pub struct VerbRule {
    pattern: &'static str,
    condition: VerbCondition,
    verb: Method,
}

impl VerbRule {
    pub fn new(pattern: &'static str, condition: VerbCondition, verb: Method) -> Self {
        Self {
            pattern,
            condition,
            verb,
        }
    }

    /// Segment-wise prefix match; `{name}` matches any single segment.
    pub fn matches(&self, path: &str) -> bool {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        self.pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .all(|expected| match segments.next() {
                Some(actual) => is_param(expected) || expected == actual,
                None => false,
            })
    }

    pub fn reads_form(&self) -> bool {
        matches!(self.condition, VerbCondition::FormMethod(_))
    }

    fn apply(&self, form_method: Option<&str>) -> Option<Method> {
        match self.condition {
            VerbCondition::Always => Some(self.verb.clone()),
            VerbCondition::FormMethod(expected) => form_method
                .filter(|m| m.eq_ignore_ascii_case(expected))
                .map(|_| self.verb.clone()),
        }
    }
}

fn is_param(segment: &str) -> bool {
    segment.starts_with('{') && segment.ends_with('}')
}

#[derive(Debug, Clone)]
pub struct VerbRules {
    rules: Vec<VerbRule>,
}

impl VerbRules {
    pub fn new(rules: Vec<VerbRule>) -> Self {
        Self { rules }
    }

    /// Overrides used by the donation management forms.
    pub fn donations() -> Self {
        Self::new(vec![
            VerbRule::new(
                "/donations/{id}/update",
                VerbCondition::FormMethod("patch"),
                Method::PATCH,
            ),
            VerbRule::new("/donations/{id}/approve", VerbCondition::Always, Method::PATCH),
            VerbRule::new("/donations/{id}/reject", VerbCondition::Always, Method::PATCH),
            VerbRule::new("/donations/{id}/delete", VerbCondition::Always, Method::DELETE),
        ])
    }

    pub fn find(&self, method: &Method, path: &str) -> Option<&VerbRule> {
        if *method != Method::POST {
            return None;
        }
        self.rules.iter().find(|rule| rule.matches(path))
    }

    /// The logical verb for a request, or `None` when it keeps its own.
    pub fn resolve(&self, method: &Method, path: &str, form_method: Option<&str>) -> Option<Method> {
        self.find(method, path)
            .and_then(|rule| rule.apply(form_method))
    }
}
