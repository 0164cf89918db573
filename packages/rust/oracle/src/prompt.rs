//! Prompt construction for the categorization call.

/// System prompt; `{categories}` is replaced with the current category list.
const SYSTEM_TEMPLATE: &str = "\
Given the content of this new URL provided by the user, \
categorize the link into one of the existing categories or create a new category.
It is important to avoid creating redundant categories. If a new category is suggested, \
ensure it is truly distinct from existing ones. Ensure the link URL remains unchanged \
in your response and is enclosed in square brackets in string format with single quotation.

You are an AI Links Categorization App. Your output will be parsed by a program, \
so it's important to follow the expected format exactly. Reply with one action per line \
and nothing else. The allowed actions are:

1. AddLinkToExistingCategory ['existing_category'] ['link_url']
2. AddLinkToNewCategory ['new_category'] ['link_url']

Categories:
{categories}
";

/// Render the system prompt for the given category names.
pub fn system_prompt(categories: &[String]) -> String {
    SYSTEM_TEMPLATE.replace("{categories}", &format_categories(categories))
}

/// Render the user message: the link first, then the page text.
pub fn user_message(url: &str, text: &str) -> String {
    format!("URL: {url}\n\n{text}")
}

/// Format names as a bracketed, single-quoted list: `['A', 'B']`.
///
/// Matches the quoting the model is asked to echo back.
fn format_categories(categories: &[String]) -> String {
    let quoted: Vec<String> = categories
        .iter()
        .map(|name| format!("'{}'", name.replace('\'', "\\'")))
        .collect();
    format!("[{}]", quoted.join(", "))
}
