//! Prompt templates for narrative analysis.

use crate::error::{Result, ResultExt};
use crate::types::Table;
use crate::utils::render_markdown_table;

/// Line separating issues inside a narrative reply.
pub const ISSUE_SEPARATOR: &str = "---";

/// Fields every issue in a reply should carry, in the order they are asked for.
const ISSUE_FIELD_CHECKLIST: &str = "\
For each issue, provide:
- Issue: [The title or short description of the issue]
- Details: [A detailed explanation of the issue]
- Expected correct state: [What the correct state should be]
- Violated constraint: [Any violated constraints or standards]
- Location: [Where the issue is located]
- Guideline Violated: [Real world guideline or policy being violated, if applicable]";

/// Prompt asking for relationships and issues across all `tables`.
pub fn cross_table_prompt(tables: &[Table]) -> Result<String> {
    let mut prompt = String::from(
        "You are a world-class data quality analyst. \
         Analyze the relationships between the following datasets:\n\n",
    );

    for table in tables {
        let rendered = render_markdown_table(table.data(), None)
            .context(format!("Rendering table '{}'", table.name()))?;
        prompt.push_str(&format!("Dataset: {}\n{}\n\n", table.name(), rendered));
    }

    prompt.push_str(
        "For cross-file analysis, identify:\n\
         - Relationships between datasets (e.g., shared fields, dependencies, or mismatches).\n\
         - Domains and subdomains inferred from column names, sample values, and context.\n\
         - Cross-file data quality issues (e.g., mismatched references, duplicate entries across files, or missing links).\n\n",
    );
    prompt.push_str(ISSUE_FIELD_CHECKLIST);
    prompt.push_str(
        "\nInclude subtle, rare, or advanced domain-specific errors, \
         even if they require deep expertise or simulated research.\n\n",
    );
    prompt.push_str(&format!("Use '{ISSUE_SEPARATOR}' to separate each issue.\n"));

    Ok(prompt)
}

/// Prompt asking for every data quality issue in a single `table`.
pub fn per_table_prompt(table: &Table) -> Result<String> {
    let rendered = render_markdown_table(table.data(), None)
        .context(format!("Rendering table '{}'", table.name()))?;

    Ok(format!(
        "You are a world-class data quality analyst and domain expert. \
         Your task is to analyze the provided table and identify all possible data quality issues.\n\n\
         {ISSUE_FIELD_CHECKLIST}\n\n\
         Additionally:\n\
         - Highlight any patterns or anomalies in the data.\n\
         - Suggest improvements or transformations that could enhance data quality.\n\
         - Identify potential risks or inconsistencies that could impact downstream processes.\n\n\
         Here is the table:\n\n\
         {rendered}\n\
         Use '{ISSUE_SEPARATOR}' to separate each issue.\n"
    ))
}
