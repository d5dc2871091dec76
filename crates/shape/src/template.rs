use crate::limit::Limit;

const PREFIX_SLOT: &str = "{prefix}";
const LIMIT_SLOT: &str = "{limit}";

/// SQL text with `{prefix}` (table qualifier, e.g. `bids.`) and `{limit}`
/// placeholders.
///
/// The prefix must already be validated by config; the limit is a bounded
/// integer, so no quoting happens here.
#[derive(Debug, Clone, Copy)]
pub struct QueryTemplate {
    text: &'static str,
}

impl QueryTemplate {
    pub const fn new(text: &'static str) -> Self {
        Self { text }
    }

    pub fn text(&self) -> &'static str {
        self.text
    }

    pub fn render(&self, table_prefix: &str, limit: Limit) -> String {
        self.text
            .replace(PREFIX_SLOT, table_prefix)
            .replace(LIMIT_SLOT, &limit.to_string())
    }
}
