/// Prompt for the first chunk of a file, which may open with frontmatter.
pub fn first_chunk_prompt(chunk: &str) -> String {
    format!(
        r#"Please clean up this markdown content by:
1. Preserving any YAML frontmatter/metadata block at the start of the file EXACTLY as is, with no changes
2. Removing any remaining HTML tags in the main content
3. Fixing any formatting issues in the main content
4. Ensuring proper markdown syntax
5. Maintaining the original text and structure. Do not change the text.

IMPORTANT: If the file starts with a YAML block (enclosed in --- or +++ markers), you must keep it
completely unchanged, preserving all whitespace, indentation, and values exactly as they appear
in the original.

Here's the content to clean:

{chunk}

Please respond with only the cleaned markdown content, no explanations or other text."#
    )
}

/// Prompt for every chunk after the first.
pub fn chunk_prompt(chunk: &str) -> String {
    format!(
        r#"Please clean up this markdown content by:
1. Removing any HTML tags
2. Fixing any formatting issues
3. Ensuring proper markdown syntax
4. Maintaining the original text and structure

Here's the content to clean:

{chunk}

Please respond with only the cleaned markdown content, no explanations or other text."#
    )
}
