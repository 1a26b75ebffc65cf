mod article_helpers;
mod comment_helpers;
mod like_helpers;
mod profile_helpers;
mod user_helpers;

pub use article_helpers::*;
pub use comment_helpers::*;
pub use like_helpers::*;
pub use profile_helpers::*;
pub use user_helpers::*;

/// Builds the `SET` part of an `UPDATE`, skipping columns without a value.
struct QueryBuilder {
    query: String,
    params: Vec<String>,
    seperator: Option<&'static str>,
}

impl QueryBuilder {
    fn new(initial: String, seperator: Option<&'static str>) -> Self {
        Self {
            query: initial,
            params: vec![],
            seperator,
        }
    }

    fn add_param(mut self, column: &str, param: Option<String>) -> Self {
        if let Some(value) = param {
            self.query.push_str(column);
            self.query.push_str(" = ?");
            if let Some(seperator) = self.seperator {
                self.query.push_str(seperator);
            }
            self.params.push(value);
        }
        self
    }

    fn add_raw(mut self, assignment: &str) -> Self {
        self.query.push_str(assignment);
        if let Some(seperator) = self.seperator {
            self.query.push_str(seperator);
        }
        self
    }

    fn trim(mut self) -> Self {
        if let Some(seperator) = self.seperator {
            self.query = self.query.trim_end_matches(seperator).to_string();
        }
        self
    }

    pub fn build(mut self) -> (String, Vec<String>) {
        self = self.trim();
        (self.query, self.params)
    }
}

/// Escapes `LIKE` wildcards so user text only ever matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
