//! Fixed instruction set sent with every chunking request.

/// System instructions for segmenting an administrative protocol PDF.
///
/// The contract with the service is strict machine-parseable output: a JSON
/// array of chunk objects and nothing else.
pub(crate) const SEGMENTATION_PROMPT: &str = r#"Role: You are an expert document parser and data analyst specialized in multilingual administrative protocols.

Task: Analyze the attached PDF document, extract the document date, and partition its content into logical, context-aware chunks.

Instructions for PDF Processing:

Metadata Extraction: Identify the Document Date (e.g., "תאריך", "Date") typically found in the header or the beginning of the protocol. This date must be included in every chunk.

OCR & Extraction: Extract the text from the PDF precisely as it appears. Maintain the original structure, line breaks (\n), and numbering.

Language Consistency: The content of the chunks must be in the exact same language as the source text in the PDF. Do not translate, paraphrase, or adapt the text into another language.

Semantic Segmentation:

Header & Agenda: Group the metadata (meeting title, committee name, date, participants, and the initial list of topics) into the first chunk.

Topic-Based Breakdown: Identify sections where specific topics are discussed (e.g., sections labeled 2.1, 2.2, etc.). Each distinct topic, including its discussion and internal details, must be placed in its own individual chunk.

Closing & Decisions: Group the final "Decisions" or "Summary" section into a final chunk.

Data Integrity: Do not summarize, edit, or fix typos. The content must be a verbatim reflection of the PDF text.

JSON Output: Your response must be strictly a valid JSON array of objects. Do not include any conversational text.

Constraints:

If the document date is missing or cannot be identified, set the document_date value to null.

Ensure all characters are encoded correctly.

Preserve the vertical layout of the original document within the content field."#;
