//! Execution context threaded through the steps of one batch.
//!
//! A step never mutates the context it receives. It returns a
//! [`ContextUpdate`] and the dispatcher folds it into the context handed to
//! the next step. Producing actions replace the context wholesale; consuming
//! actions clear it.

use serde::Serialize;
use std::collections::BTreeMap;

/// One entity produced by a step, addressable by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultItem {
    pub id: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl ResultItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// How a step changes the context for the steps after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextUpdate {
    /// Freshly produced entities, in backend order.
    Replace(Vec<ResultItem>),
    /// The referenced entities were consumed.
    Clear,
    /// The step leaves the context as it was.
    Keep,
}

/// How many context ids a step consumes when falling back to the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Take {
    First(usize),
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionContext {
    items: Vec<ResultItem>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<ResultItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ResultItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.take_ids(Take::All)
    }

    pub fn take_ids(&self, take: Take) -> Vec<String> {
        let n = match take {
            Take::First(n) => n,
            Take::All => self.items.len(),
        };
        self.items.iter().take(n).map(|i| i.id.clone()).collect()
    }

    /// Fold a step's update into the context for the next step.
    pub fn apply(self, update: ContextUpdate) -> Self {
        match update {
            ContextUpdate::Replace(items) => Self { items },
            ContextUpdate::Clear => Self::new(),
            ContextUpdate::Keep => self,
        }
    }
}

/// Where a step's target ids come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSource {
    /// Ids given explicitly in the step's parameters.
    Literal(Vec<String>),
    /// A query to run against the backend.
    Query(String),
    /// Ids taken from the previous step's results.
    Context(Vec<String>),
}

/// Pick the target source for a step: literal ids, then query, then context.
///
/// `literal` must already exclude template placeholders. A query is only
/// considered for actions that accept one.
pub fn select_targets(
    literal: Vec<String>,
    query: Option<String>,
    context: &ExecutionContext,
    take: Take,
) -> TargetSource {
    if !literal.is_empty() {
        TargetSource::Literal(literal)
    } else if let Some(query) = query {
        TargetSource::Query(query)
    } else {
        TargetSource::Context(context.take_ids(take))
    }
}
