//! Prompt templates for the two generation profiles.

use super::state::SessionState;

/// SQL generation prompt in the sqlcoder task format.
///
/// On a retry the previous diagnostic is appended verbatim, together with
/// the SQL that caused it when there was one.
pub fn sql_prompt(state: &SessionState) -> String {
    let question = state.question();
    let mut prompt = format!(
        "### Task\n\
         Generate a SQL query to answer [QUESTION]{question}[/QUESTION]\n\
         \n\
         ### Database Schema\n\
         The query will run on a database with the following schema:\n\
         {schema}\n\
         \n\
         ### Answer\n\
         Given the database schema, here is the SQL query that [QUESTION]{question}[/QUESTION]\n\
         [SQL]\n",
        question = question,
        schema = state.schema,
    );

    if let Some(ref error) = state.error {
        if !state.sql_query.is_empty() {
            prompt.push_str(&format!("\n/* PREVIOUS SQL: {} */", state.sql_query));
        }
        prompt.push_str(&format!("\n/* PREVIOUS ERROR: {} - FIX THIS */", error));
    }

    prompt
}

/// Summary prompt for the explainer profile.
pub fn summary_prompt(state: &SessionState) -> String {
    format!(
        "User asked: {}\n\
         Data retrieved: {}\n\
         \n\
         Please provide a concise, friendly summary of this data.",
        state.question(),
        state.result
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_state() -> SessionState {
        let mut state = SessionState::new("How many employees are there?", vec![]);
        state.schema = "CREATE TABLE employees (id INTEGER PRIMARY KEY, name TEXT)".to_string();
        state
    }

    #[test]
    fn test_first_attempt_prompt() {
        let prompt = sql_prompt(&base_state());
        assert!(prompt.starts_with("### Task\n"));
        assert!(prompt.contains("[QUESTION]How many employees are there?[/QUESTION]"));
        assert!(prompt.contains("CREATE TABLE employees"));
        assert!(prompt.ends_with("[SQL]\n"));
        assert!(!prompt.contains("PREVIOUS ERROR"));
    }

    #[test]
    fn test_retry_prompt_carries_error_verbatim() {
        let mut state = base_state();
        state.sql_query = "SELECT COUNT(*) FROM FROM employees".to_string();
        state.error = Some("syntax error near FROM".to_string());

        let prompt = sql_prompt(&state);
        assert!(prompt.contains("/* PREVIOUS SQL: SELECT COUNT(*) FROM FROM employees */"));
        assert!(prompt.ends_with("/* PREVIOUS ERROR: syntax error near FROM - FIX THIS */"));
    }

    #[test]
    fn test_retry_prompt_without_sql() {
        let mut state = base_state();
        state.error = Some("generation failed: connection refused".to_string());
        let prompt = sql_prompt(&state);
        assert!(!prompt.contains("PREVIOUS SQL"));
        assert!(prompt.contains("generation failed: connection refused"));
    }

    #[test]
    fn test_summary_prompt() {
        let mut state = base_state();
        state.result = "[(8,)]".to_string();
        let prompt = summary_prompt(&state);
        assert!(prompt.contains("User asked: How many employees are there?"));
        assert!(prompt.contains("Data retrieved: [(8,)]"));
    }
}
