//! README generation prompts

/// System prompt for README generation
pub const README_SYSTEM_PROMPT: &str = "You are an expert technical writer and software developer. \
Generate comprehensive, professional README files that are clear, well-structured, and include all \
necessary information for users to understand and use the project.";

const README_SECTIONS: &str = r#"1. **Project Title and Description**: Clear, engaging description of what the project does
2. **Features**: Key features and capabilities
3. **Technology Stack**: Languages, frameworks, and tools used
4. **Prerequisites**: System requirements, dependencies, and **any API keys or environment variables needed**. Look for clues like `os.getenv`, `argparse`, or variable names like `API_KEY`.
5. **Installation**: Step-by-step setup instructions IF ANY REQUIRED
6. **Usage**: How to run and use the project with examples. Include command-line arguments if found.
7. **Project Structure**: Overview of the codebase organization
8. **Configuration**: Any environment variables or config files needed
9. **API Documentation**: If applicable, document key endpoints or functions IF ANY PRESENT
10. **Contributing**: Guidelines for contributors
11. **License**: License information IF ALREADY MENTIONED
12. **Contact**: Author/maintainer information IF ALREADY MENTIONED"#;

/// Wrap a repository context in the README instructions
pub fn create_readme_prompt(context: &str) -> String {
    format!(
        r#"Based on the following repository analysis, generate a comprehensive README.md file that includes:

{sections}

Make the README professional, well-formatted with proper markdown, and comprehensive enough that someone can understand and set up the project from scratch.
Pay close attention to the code snippets to find requirements like API keys or specific commands to run the project.

Repository Analysis:
{context}

Generate a complete README.md file:"#,
        sections = README_SECTIONS,
        context = context
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_context_after_instructions() {
        let prompt = create_readme_prompt("- Name: demo\n");
        let sections_at = prompt.find("**Project Title and Description**").unwrap();
        let context_at = prompt.find("- Name: demo").unwrap();
        assert!(sections_at < context_at);
        assert!(prompt.ends_with("Generate a complete README.md file:"));
    }
}
