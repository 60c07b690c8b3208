use std::collections::HashMap;

use indexmap::IndexMap;

use crate::constants::{
    ATTR_CLASS, ATTR_FILE, ATTR_LINE, ATTR_NAME, ATTR_TESTS, ATTR_TIME, TAG_REPORT, TAG_TEST_CASE,
    TAG_TEST_SUITE,
};
use crate::xml::Element;

/// Outcome marker carried by a test case. A case with no marker is a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    Error,
    Failure,
    Skipped,
    Warning,
}

impl CaseStatus {
    const ALL: [CaseStatus; 4] = [
        CaseStatus::Error,
        CaseStatus::Failure,
        CaseStatus::Skipped,
        CaseStatus::Warning,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            CaseStatus::Error => "error",
            CaseStatus::Failure => "failure",
            CaseStatus::Skipped => "skipped",
            CaseStatus::Warning => "warning",
        }
    }

    /// Name of the aggregate counter this status contributes to.
    pub fn counter(self) -> &'static str {
        match self {
            CaseStatus::Error => "errors",
            CaseStatus::Failure => "failures",
            CaseStatus::Skipped => "skipped",
            CaseStatus::Warning => "warnings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SuiteId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CaseId(usize);

#[derive(Debug, Clone, Copy)]
enum Target {
    Root,
    Suite(SuiteId),
}

#[derive(Debug)]
enum Child {
    Suite(SuiteId),
    Case(CaseId),
}

#[derive(Debug)]
struct Suite {
    attributes: IndexMap<String, String>,
    // Name of the enclosing suite at merge time, empty at the root. Resolved
    // through the suite registry when counters climb the tree; never
    // serialized.
    parent: String,
    children: Vec<Child>,
}

#[derive(Debug)]
struct Case {
    attributes: IndexMap<String, String>,
    status: Option<CaseStatus>,
    owner: SuiteId,
}

/// Folds parsed report documents into one canonical suite tree.
///
/// Suites are deduplicated globally by name: a suite name seen anywhere in
/// any input resolves to the same output node, regardless of nesting.
/// Cases are deduplicated by `class::name`. Aggregate counters (`tests`,
/// `failures`, `errors`, `skipped`, `warnings`, and every other numeric case
/// attribute except `line`) are recomputed from scratch on every ancestor as
/// cases are retained or replaced; the totals recorded in the source
/// documents are discarded.
#[derive(Debug, Default)]
pub struct Merger {
    suites: Vec<Suite>,
    cases: Vec<Case>,
    suites_by_name: HashMap<String, SuiteId>,
    cases_by_key: HashMap<String, CaseId>,
    roots: Vec<SuiteId>,
}

impl Merger {
    pub fn new() -> Self {
        Default::default()
    }

    /// Fold one parsed document into the shared tree. The document root is
    /// treated as a generic suite node itself, so an unnamed `testsuites`
    /// wrapper flattens away and a bare named `testsuite` root merges as one.
    pub fn fold_report(&mut self, document: &Element) {
        self.merge_suite(Target::Root, document);
    }

    /// Build the output document. The transient parent back-references are
    /// bookkeeping only and do not appear in the result.
    pub fn to_document(&self) -> Element {
        let mut root = Element::new(TAG_REPORT);
        for id in &self.roots {
            root.children.push(self.build_suite(*id));
        }
        root
    }

    fn merge_suite(&mut self, parent: Target, node: &Element) {
        let name = node.attr(ATTR_NAME).unwrap_or_default();
        if name.is_empty() {
            // Transparent wrapper: merge nested suites directly under the
            // current parent. Cases under an unnamed suite are dropped with
            // it.
            for nested in nested_suites(node) {
                self.merge_suite(parent, nested);
            }
            return;
        }

        let target = match self.suites_by_name.get(name) {
            Some(&id) => id,
            None => self.insert_suite(parent, node, name),
        };

        for nested in nested_suites(node) {
            self.merge_suite(Target::Suite(target), nested);
        }
        for case in node.children.iter().filter(|c| c.tag == TAG_TEST_CASE) {
            self.merge_case(target, case);
        }
    }

    fn insert_suite(&mut self, parent: Target, node: &Element, name: &str) -> SuiteId {
        let parent_name = match parent {
            Target::Root => String::new(),
            Target::Suite(id) => self.suites[id.0]
                .attributes
                .get(ATTR_NAME)
                .cloned()
                .unwrap_or_default(),
        };

        let mut attributes = IndexMap::with_capacity(node.attributes.len());
        for (key, value) in &node.attributes {
            if key == ATTR_NAME || key == ATTR_FILE {
                attributes.insert(key.clone(), value.clone());
            } else {
                // Merged counters are recomputed as cases are folded in; the
                // source document's own totals are discarded.
                attributes.insert(key.clone(), "0".to_string());
            }
        }

        let id = SuiteId(self.suites.len());
        self.suites.push(Suite {
            attributes,
            parent: parent_name,
            children: Vec::new(),
        });
        match parent {
            Target::Root => self.roots.push(id),
            Target::Suite(pid) => self.suites[pid.0].children.push(Child::Suite(id)),
        }
        self.suites_by_name.insert(name.to_string(), id);
        id
    }

    fn merge_case(&mut self, parent: SuiteId, node: &Element) {
        let name = node.attr(ATTR_NAME).unwrap_or_default();
        if name.is_empty() {
            return;
        }
        let class = node.attr(ATTR_CLASS).unwrap_or_default();
        let key = format!("{}::{}", class, name);

        let status = case_status(node);

        if let Some(&previous) = self.cases_by_key.get(&key) {
            let old = &self.cases[previous.0];
            let old_time = attr_value(old.attributes.get(ATTR_TIME));
            let new_time = attr_value(node.attributes.get(ATTR_TIME));
            // A recorded outcome never displaces the retained case; between
            // two passes the larger time wins, ties to the newest.
            if status.is_some() || (old.status.is_none() && new_time < old_time) {
                return;
            }
            self.remove_case(previous, &key);
        }

        let attributes = node.attributes.clone();
        for (attr, value) in &attributes {
            if attr == ATTR_LINE {
                continue;
            }
            if let Some(delta) = numeric_value(value) {
                self.adjust(parent, attr, delta);
            }
        }
        self.adjust(parent, ATTR_TESTS, 1.0);
        if let Some(status) = status {
            self.adjust(parent, status.counter(), 1.0);
        }

        let id = CaseId(self.cases.len());
        self.cases.push(Case {
            attributes,
            status,
            owner: parent,
        });
        self.suites[parent.0].children.push(Child::Case(id));
        self.cases_by_key.insert(key, id);
    }

    /// Undo a retained case's contribution to its owning suite chain and
    /// unlink it. The arena slot stays behind as a tombstone.
    fn remove_case(&mut self, id: CaseId, key: &str) {
        let owner = self.cases[id.0].owner;
        let status = self.cases[id.0].status;
        let attributes = std::mem::take(&mut self.cases[id.0].attributes);

        self.adjust(owner, ATTR_TESTS, -1.0);
        if let Some(status) = status {
            self.adjust(owner, status.counter(), -1.0);
        }
        for (attr, value) in &attributes {
            if attr == ATTR_LINE {
                continue;
            }
            if let Some(delta) = numeric_value(value) {
                self.adjust(owner, attr, -delta);
            }
        }

        self.suites[owner.0]
            .children
            .retain(|child| !matches!(child, Child::Case(c) if *c == id));
        self.cases_by_key.remove(key);
    }

    /// Add `delta` to `field` on the suite and on every ancestor whose name
    /// resolves in the suite registry. An absent attribute reads as 0.
    fn adjust(&mut self, suite: SuiteId, field: &str, delta: f64) {
        let mut current = suite;
        loop {
            let node = &mut self.suites[current.0];
            let updated = attr_value(node.attributes.get(field)) + delta;
            node.attributes.insert(field.to_string(), format_value(updated));

            let parent = node.parent.clone();
            match self.suites_by_name.get(parent.as_str()) {
                Some(&next) => current = next,
                None => break,
            }
        }
    }

    fn build_suite(&self, id: SuiteId) -> Element {
        let suite = &self.suites[id.0];
        let mut element = Element::new(TAG_TEST_SUITE);
        element.attributes = suite.attributes.clone();
        for child in &suite.children {
            match child {
                Child::Suite(nested) => element.children.push(self.build_suite(*nested)),
                Child::Case(case) => element.children.push(self.build_case(*case)),
            }
        }
        element
    }

    fn build_case(&self, id: CaseId) -> Element {
        let case = &self.cases[id.0];
        let mut element = Element::new(TAG_TEST_CASE);
        element.attributes = case.attributes.clone();
        if let Some(status) = case.status {
            element.children.push(Element::new(status.tag()));
        }
        element
    }
}

fn nested_suites(node: &Element) -> impl Iterator<Item = &Element> {
    node.children.iter().filter(|c| c.tag == TAG_TEST_SUITE)
}

fn case_status(node: &Element) -> Option<CaseStatus> {
    CaseStatus::ALL
        .iter()
        .copied()
        .find(|status| node.children.iter().any(|c| c.tag == status.tag()))
}

fn attr_value(value: Option<&String>) -> f64 {
    value.and_then(|v| numeric_value(v)).unwrap_or(0.0)
}

fn numeric_value(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        // Counter sums are read back from strings, so keep them tidy rather
        // than exposing accumulated binary float noise.
        format!("{}", (value * 1e6).round() / 1e6)
    }
}
