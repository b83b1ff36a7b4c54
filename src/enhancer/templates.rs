//! Solution-approach templates

use crate::model::Category;

/// Placeholder replaced with the extracted problem statement
pub const PROBLEM_PLACEHOLDER: &str = "{problem}";

/// Placeholder replaced with the detected category name
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Render a solution template in a single pass.
///
/// Placeholder-like text inside `problem` is copied verbatim and never expanded,
/// so user input cannot corrupt the rendered string. Unknown `{...}` sequences
/// in the template are left as-is.
pub fn render_solution_template(template: &str, problem: &str, context: Category) -> String {
    let mut rendered = String::with_capacity(template.len() + problem.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let candidate = &rest[open..];

        if let Some(tail) = candidate.strip_prefix(PROBLEM_PLACEHOLDER) {
            rendered.push_str(problem);
            rest = tail;
        } else if let Some(tail) = candidate.strip_prefix(CONTEXT_PLACEHOLDER) {
            rendered.push_str(context.as_str());
            rest = tail;
        } else {
            rendered.push('{');
            rest = &candidate[1..];
        }
    }

    rendered.push_str(rest);
    rendered
}
