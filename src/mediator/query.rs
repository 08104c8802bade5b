//! Structured Query Module
//!
//! The parsed form of a structured mini-query and its evaluator. Parsing the
//! query grammar itself is a separate, swappable component; this module only
//! consumes the parsed plan.

use crate::backend::WikiBackend;
use crate::error::{Result, WikiError};

/// What the final title set is mapped through before it is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Return the titles themselves
    Page,
    /// Return the last editor of each title, deduplicated
    Author,
    /// Return the categories of each title, flattened and deduplicated
    Category,
}

impl std::str::FromStr for Selector {
    type Err = WikiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "page" => Ok(Selector::Page),
            "author" => Ok(Selector::Author),
            "category" => Ok(Selector::Category),
            other => Err(WikiError::InvalidQuery(format!(
                "unknown selector: {other}"
            ))),
        }
    }
}

/// The page field a condition matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionField {
    Title,
    Author,
    Category,
}

impl std::str::FromStr for ConditionField {
    type Err = WikiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "title" => Ok(ConditionField::Title),
            "author" => Ok(ConditionField::Author),
            "category" => Ok(ConditionField::Category),
            other => Err(WikiError::InvalidQuery(format!(
                "unknown condition field: {other}"
            ))),
        }
    }
}

/// How a condition's candidate set combines with the result built so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

/// One field/value condition. The combinator of the first condition in a
/// plan is ignored.
#[derive(Debug, Clone)]
pub struct Condition {
    pub field: ConditionField,
    pub value: String,
    pub combinator: Combinator,
}

impl Condition {
    pub fn new(field: ConditionField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            combinator: Combinator::And,
        }
    }

    pub fn with_combinator(mut self, combinator: Combinator) -> Self {
        self.combinator = combinator;
        self
    }
}

/// A fully parsed structured query: an output selector plus one or more
/// conditions.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub selector: Selector,
    pub conditions: Vec<Condition>,
}

/// Candidate search for conditions is effectively unbounded.
const CONDITION_SEARCH_LIMIT: usize = usize::MAX;

// == Execution ==
/// Evaluates a plan: resolves each condition to a candidate title set, folds
/// the sets left-to-right per each condition's combinator, then maps the
/// result through the selector.
pub async fn execute(plan: &QueryPlan, backend: &dyn WikiBackend) -> Result<Vec<String>> {
    if plan.conditions.is_empty() {
        return Err(WikiError::InvalidQuery(
            "query has no conditions".to_string(),
        ));
    }

    let mut titles: Option<Vec<String>> = None;
    for condition in &plan.conditions {
        let candidates = resolve_condition(condition, backend).await?;
        titles = Some(match titles {
            None => candidates,
            Some(current) => match condition.combinator {
                Combinator::And => current
                    .into_iter()
                    .filter(|t| candidates.contains(t))
                    .collect(),
                Combinator::Or => {
                    let mut merged = current;
                    for title in candidates {
                        if !merged.contains(&title) {
                            merged.push(title);
                        }
                    }
                    merged
                }
            },
        });
    }

    apply_selector(plan.selector, titles.unwrap_or_default(), backend).await
}

async fn resolve_condition(
    condition: &Condition,
    backend: &dyn WikiBackend,
) -> Result<Vec<String>> {
    let value = condition.value.as_str();
    let titles = match condition.field {
        ConditionField::Title => backend.search(value, CONDITION_SEARCH_LIMIT).await?,
        ConditionField::Author => {
            // Pages the author touched, narrowed to those they last edited.
            let contribs = backend.contributions(value).await?;
            let mut owned = Vec::new();
            for title in contribs {
                let editor = backend.last_editor(&title).await?;
                if editor == value && !owned.contains(&title) {
                    owned.push(title);
                }
            }
            owned
        }
        ConditionField::Category => backend.category_members(value).await?,
    };
    Ok(titles)
}

async fn apply_selector(
    selector: Selector,
    titles: Vec<String>,
    backend: &dyn WikiBackend,
) -> Result<Vec<String>> {
    match selector {
        Selector::Page => Ok(titles),
        Selector::Author => {
            let mut authors = Vec::new();
            for title in &titles {
                let editor = backend.last_editor(title).await?;
                if !authors.contains(&editor) {
                    authors.push(editor);
                }
            }
            Ok(authors)
        }
        Selector::Category => {
            let mut categories = Vec::new();
            for title in &titles {
                for category in backend.categories_on_page(title).await? {
                    if !categories.contains(&category) {
                        categories.push(category);
                    }
                }
            }
            Ok(categories)
        }
    }
}
