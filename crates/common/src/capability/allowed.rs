use std::collections::BTreeSet;

/// The set of buckets a capability may see for a given action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedBuckets {
    /// No caveat restricts bucket names.
    pub all: bool,
    /// Only meaningful when `all` is false.
    pub buckets: BTreeSet<String>,
}

impl AllowedBuckets {
    pub fn all() -> Self {
        Self {
            all: true,
            buckets: BTreeSet::new(),
        }
    }

    pub fn only<I, S>(buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            all: false,
            buckets: buckets.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, bucket: &str) -> bool {
        self.all || self.buckets.contains(bucket)
    }

    /// Narrow this set by one caveat's allow-list.
    pub(crate) fn restrict(&mut self, caveat_buckets: &[String]) {
        if caveat_buckets.is_empty() {
            return;
        }
        if self.all {
            self.all = false;
            self.buckets = caveat_buckets.iter().cloned().collect();
        } else {
            self.buckets
                .retain(|b| caveat_buckets.iter().any(|allowed| allowed == b));
        }
    }
}

impl Default for AllowedBuckets {
    fn default() -> Self {
        Self::all()
    }
}
