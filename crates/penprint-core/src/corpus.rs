#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceCorpus {
    pub label: String,
    pub text: String,
}

impl ReferenceCorpus {
    pub fn bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}

/// Reference corpora in registration order.
///
/// Registration order is the candidate order used by the classifier, so it
/// decides ties. Re-registering a label replaces its text in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    corpora: Vec<ReferenceCorpus>,
}

impl ReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, label: impl Into<String>, text: impl Into<String>) {
        let label = label.into();
        let text = text.into();
        match self.corpora.iter_mut().find(|c| c.label == label) {
            Some(existing) => existing.text = text,
            None => self.corpora.push(ReferenceCorpus { label, text }),
        }
    }

    pub fn get(&self, label: &str) -> Option<&ReferenceCorpus> {
        self.corpora.iter().find(|c| c.label == label)
    }

    pub fn as_slice(&self) -> &[ReferenceCorpus] {
        &self.corpora
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReferenceCorpus> {
        self.corpora.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.corpora.iter().map(|c| c.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.corpora.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpora.is_empty()
    }
}

impl<L, T> FromIterator<(L, T)> for ReferenceSet
where
    L: Into<String>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (L, T)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (label, text) in iter {
            set.register(label, text);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ReferenceSet {
    type Item = &'a ReferenceCorpus;
    type IntoIter = std::slice::Iter<'a, ReferenceCorpus>;

    fn into_iter(self) -> Self::IntoIter {
        self.corpora.iter()
    }
}
