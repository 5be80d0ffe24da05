//! Prompt templates for extraction and grading.

/// Ask the AI to pull questions and rubrics out of document text.
pub fn extraction_prompt(document_text: &str) -> String {
    format!(
        r#"The following text comes from an academic document.
Your task is to extract all the questions and any available rubric or marking scheme.
Format your reply in JSON like this:

[{{"question": "...", "rubric": "..."}}]

Use null for "rubric" when a question has no marking scheme.

Here is the content:
{document_text}"#
    )
}

/// Ask the AI to grade one answer against its question and rubric.
///
/// `out_of` is the denominator the reply must use.
pub fn grading_prompt(question: &str, rubric: &str, answer: &str, out_of: i64) -> String {
    format!(
        r#"You are a grading assistant. Grade the following student answer based on the question and rubric.

Question: {question}
Rubric: {rubric}
Student Answer: {answer}

Return only the result in JSON format:
{{
  "score": <integer between 0 and {out_of}>,
  "out_of": {out_of},
  "feedback": "Detailed explanation..."
}}
The "out_of" field must be exactly {out_of}."#
    )
}
