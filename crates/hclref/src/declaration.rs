//! Declaration identifiers, their lookup index and the names generated code uses for them
//!
//! Canonical identifiers look like
//! - `var.<name>`
//! - `local.<name>`
//! - `module.<name>`
//! - `data.<type>.<name>`
//! - `<type>.<name>` (resources)
use crate::util::camel_case;

/// Kind of a declaration, determined by the first segment of its identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Variable,
    Local,
    Module,
    Data,
    Resource,
}

impl DeclarationKind {
    pub fn of(identifier: &str) -> Self {
        match identifier.split('.').next().unwrap_or_default() {
            "var" => Self::Variable,
            "local" => Self::Local,
            "module" => Self::Module,
            "data" => Self::Data,
            _ => Self::Resource,
        }
    }

    /// Number of segments that make up the identifier of this kind
    pub fn segments(&self) -> usize {
        match self {
            Self::Data => 3,
            _ => 2,
        }
    }
}

/// Name of the variable that generated code defines for a declaration
///
/// Variables, locals and modules are named after the declaration, everything else after kind and name.
pub fn variable_name(resource: &str, name: &str) -> String {
    match DeclarationKind::of(resource) {
        DeclarationKind::Variable | DeclarationKind::Local | DeclarationKind::Module => camel_case(name),
        DeclarationKind::Data | DeclarationKind::Resource => camel_case(&format!("{resource}_{name}")),
    }
}

/// Does `identifier` match a traversal with the given segments
///
/// The first segment must always be equal. The second one as well, unless the identifier consists of a single
/// segment. Data sources additionally need a matching third segment.
pub fn matches(identifier: &str, segments: &[&str]) -> bool {
    let parts: Vec<&str> = identifier.split('.').collect();

    let matches_first = parts.first() == segments.first();
    let matches_first_two = matches_first && (parts.len() == 1 || parts.get(1) == segments.get(1));

    let is_data = DeclarationKind::of(identifier) == DeclarationKind::Data;
    matches_first_two && (!is_data || parts.get(2) == segments.get(2))
}

/// Identifiers of all declarations visible to a configuration unit
///
/// Lookups walk a prefix tree, so the result never depends on the order identifiers were inserted in.
#[derive(Debug, Default, Clone)]
pub struct DeclarationIndex {
    identifiers: Vec<String>,
    root: indexmap::IndexMap<String, Node>,
}

impl DeclarationIndex {
    pub fn new<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::default();
        for identifier in identifiers {
            index.insert(identifier);
        }
        index
    }

    /// Add an identifier, returns false if it was known already
    pub fn insert(&mut self, identifier: impl Into<String>) -> bool {
        let identifier = identifier.into();
        let position = self.identifiers.len();

        let mut path = identifier.split('.');
        let Some(first) = path.next() else {
            return false;
        };
        let mut node = self.root.entry(first.to_string()).or_default();
        for segment in path {
            node = node.children.entry(segment.to_string()).or_default();
        }

        if node.value.is_some() {
            tracing::debug!(%identifier, "duplicate declaration identifier");
            return false;
        }

        node.value = Some(position);
        self.identifiers.push(identifier);
        true
    }

    /// Find the identifier a traversal refers to
    ///
    /// Data sources must match on all three segments. Otherwise a two segment identifier is preferred over a single
    /// segment one.
    pub fn lookup(&self, segments: &[&str]) -> Option<&str> {
        let (first, rest) = segments.split_first()?;
        let node = self.root.get(*first)?;

        let kind = DeclarationKind::of(first);
        let (index, remaining) = node.get(rest, kind.segments() - 1)?;
        if kind == DeclarationKind::Data && !remaining.is_empty() {
            return None;
        }

        Some(self.identifiers[index].as_str())
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.iter().any(|known| known == identifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.identifiers.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for DeclarationIndex {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

#[derive(Debug, Default, Clone)]
struct Node {
    value: Option<usize>,
    children: indexmap::IndexMap<String, Node>,
}

impl Node {
    /// Most specific value along `key_path`, descending at most `depth` levels
    ///
    /// Returns the value and the part of `key_path` that was required to be matched but wasn't.
    fn get<'p>(&self, key_path: &'p [&'p str], depth: usize) -> Option<(usize, &'p [&'p str])> {
        if depth > 0 {
            if let Some((key, rest)) = key_path.split_first() {
                if let Some(found) = self
                    .children
                    .get(*key)
                    .and_then(|child| child.get(rest, depth - 1))
                {
                    return Some(found);
                }
            }
        }

        let unmatched = &key_path[..depth.min(key_path.len())];
        self.value.map(|index| (index, unmatched))
    }
}

/// Loop variables introduced by enclosing dynamic blocks
///
/// A scope is only valid while walking the subtree of its blocks. Extending it creates a new set, the original one
/// stays untouched for the siblings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScopeSet(Vec<String>);

impl ScopeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(&self, scoped_var: impl Into<String>) -> Self {
        let mut extended = self.0.clone();
        extended.push(scoped_var.into());
        Self(extended)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.0.iter().any(|scoped| scoped == identifier)
    }

    /// First scoped identifier that matches the traversal
    pub fn lookup(&self, segments: &[&str]) -> Option<&str> {
        self.0
            .iter()
            .find(|scoped| matches(scoped, segments))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ScopeSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn index() -> DeclarationIndex {
        DeclarationIndex::new([
            "aws_instance.foo",
            "var.x",
            "local.tags",
            "module.vpc",
            "data.aws_ami.ubuntu",
            "data.aws_ami.debian",
        ])
    }

    #[test]
    fn kinds() {
        assert_eq!(DeclarationKind::of("var.x"), DeclarationKind::Variable);
        assert_eq!(DeclarationKind::of("local.x"), DeclarationKind::Local);
        assert_eq!(DeclarationKind::of("module.x"), DeclarationKind::Module);
        assert_eq!(DeclarationKind::of("data.a.b"), DeclarationKind::Data);
        assert_eq!(DeclarationKind::of("aws_instance.a"), DeclarationKind::Resource);
        assert_eq!(DeclarationKind::Data.segments(), 3);
        assert_eq!(DeclarationKind::Resource.segments(), 2);
        // bare first segments as seen in traversals
        assert_eq!(DeclarationKind::of("module"), DeclarationKind::Module);
        assert_eq!(DeclarationKind::of("data"), DeclarationKind::Data);
    }

    #[test]
    fn projected_names() {
        assert_eq!(variable_name("var", "x"), "x");
        assert_eq!(variable_name("local", "common_tags"), "commonTags");
        assert_eq!(variable_name("module", "vpc"), "vpc");
        assert_eq!(variable_name("aws_instance", "foo"), "awsInstanceFoo");
        assert_eq!(variable_name("data", "aws_ami"), "dataAwsAmi");
    }

    #[test]
    fn lookup_resources_and_variables() {
        let index = index();
        assert_eq!(index.lookup(&["aws_instance", "foo", "id"]), Some("aws_instance.foo"));
        assert_eq!(index.lookup(&["aws_instance", "foo"]), Some("aws_instance.foo"));
        assert_eq!(index.lookup(&["var", "x"]), Some("var.x"));
        assert_eq!(index.lookup(&["module", "vpc", "subnets", "0"]), Some("module.vpc"));
        assert_eq!(index.lookup(&["aws_instance", "bar", "id"]), None);
        assert_eq!(index.lookup(&["var", "y"]), None);
    }

    #[test]
    fn lookup_data_needs_three_segments() {
        let index = index();
        assert_eq!(
            index.lookup(&["data", "aws_ami", "ubuntu", "id"]),
            Some("data.aws_ami.ubuntu")
        );
        assert_eq!(
            index.lookup(&["data", "aws_ami", "debian"]),
            Some("data.aws_ami.debian")
        );
        assert_eq!(index.lookup(&["data", "aws_ami"]), None);
        assert_eq!(index.lookup(&["data", "aws_ami", "arch"]), None);
        assert!(matches("data.aws_ami.ubuntu", &["data", "aws_ami", "ubuntu", "id"]));
        assert!(!matches("data.aws_ami.ubuntu", &["data", "aws_ami", "debian"]));
    }

    #[test]
    fn lookup_single_segment_identifier() {
        let index = DeclarationIndex::new(["ingress"]);
        assert_eq!(index.lookup(&["ingress", "value", "port"]), Some("ingress"));
    }

    #[test]
    fn lookup_is_order_independent() {
        let forward = DeclarationIndex::new(["ingress", "ingress.rule"]);
        let backward = DeclarationIndex::new(["ingress.rule", "ingress"]);
        for index in [forward, backward] {
            assert_eq!(index.lookup(&["ingress", "rule", "port"]), Some("ingress.rule"));
            assert_eq!(index.lookup(&["ingress", "value"]), Some("ingress"));
        }
    }

    #[test]
    fn lookup_agrees_with_matching_rule() {
        let index = index();
        let traversals: [&[&str]; 5] = [
            &["aws_instance", "foo", "id"],
            &["var", "x"],
            &["data", "aws_ami", "ubuntu", "id"],
            &["local", "tags", "env"],
            &["module", "vpc", "id"],
        ];
        for segments in traversals {
            let found = index.lookup(segments).expect("known traversal");
            assert!(matches(found, segments), "{found} should match {segments:?}");
        }
    }

    #[test]
    fn duplicates_are_ignored() {
        let mut index = index();
        assert!(!index.insert("var.x"));
        assert!(index.insert("var.y"));
        assert_eq!(index.len(), 7);
        assert!(index.contains("var.y"));
    }

    #[test]
    fn scope_extension_does_not_touch_parent() {
        let outer = ScopeSet::new();
        let inner = outer.with("ingress");
        assert!(outer.is_empty());
        assert!(inner.contains("ingress"));
        assert_eq!(inner.lookup(&["ingress", "value"]), Some("ingress"));
        assert_eq!(inner.lookup(&["egress", "value"]), None);
    }
}
