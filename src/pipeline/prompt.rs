//! Prompt construction for the structuring request.

pub const STRUCTURING_SYSTEM_PROMPT: &str = r#"
You are a medical report structuring assistant. Your ONLY role is to convert
raw text recognized from a scanned medical report into a structured format.
You extract and organize information that is explicitly present in the text.

RULES — ABSOLUTE, NO EXCEPTIONS:
1. Extract ONLY information explicitly stated in the report text.
2. NEVER add interpretation, diagnosis, advice, or clinical opinion beyond
   what the report itself states under its interpretation section.
3. NEVER infer information that is not directly written.
4. If a field is unclear or missing, output null for that field.
5. Preserve exact values (results, units, reference ranges, dates) verbatim.
6. Output MUST be a single valid JSON object and nothing else.
"#;

/// Build the structuring prompt embedding the recognized text verbatim.
pub fn build_structuring_prompt(raw_text: &str) -> String {
    format!(
        r#"<document>
{raw_text}
</document>

Convert the above medical report text into the following JSON structure.
For any field not present in the document, use null.

```json
{{
  "report_id": "identifier printed on the report or null",
  "patient_info": {{
    "patient_id": "patient identifier or null",
    "name": "full name or null",
    "date_of_birth": "YYYY-MM-DD or null",
    "address": "address or null"
  }},
  "ordering_physician_info": {{
    "name": "full name or null",
    "license_number": "license or NPI number or null",
    "contact": "phone/email or null"
  }},
  "specimen_details": {{
    "specimen_id": "identifier or null",
    "type": "e.g. whole blood, serum, urine, or null",
    "collection_date": "YYYY-MM-DD or null",
    "received_date": "YYYY-MM-DD or null"
  }},
  "tests": [
    {{
      "test_id": "code or null",
      "name": "test name",
      "result": "value verbatim",
      "units": "units or null",
      "reference_range": "range verbatim or null",
      "flag": "normal | low | high | critical | null"
    }}
  ],
  "interpretation": "interpretive comment from the report or null",
  "report_date": "YYYY-MM-DD or null",
  "laboratory_info": {{
    "name": "laboratory name or null",
    "address": "address or null",
    "director": "director name or null",
    "contact": "phone/email or null"
  }}
}}
```
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_document_text() {
        let prompt = build_structuring_prompt("Hemoglobin 13.5 g/dL");
        assert!(prompt.contains("Hemoglobin 13.5 g/dL"));
        assert!(prompt.contains("<document>"));
        assert!(prompt.contains("</document>"));
    }

    #[test]
    fn prompt_names_all_schema_sections() {
        let prompt = build_structuring_prompt("text");
        for field in [
            "report_id",
            "patient_info",
            "ordering_physician_info",
            "specimen_details",
            "tests",
            "interpretation",
            "report_date",
            "laboratory_info",
        ] {
            assert!(prompt.contains(field), "schema is missing {field}");
        }
    }

    #[test]
    fn system_prompt_enforces_extraction_only() {
        assert!(STRUCTURING_SYSTEM_PROMPT.contains("NEVER add interpretation"));
        assert!(STRUCTURING_SYSTEM_PROMPT.contains("ONLY"));
        assert!(STRUCTURING_SYSTEM_PROMPT.contains("valid JSON"));
    }
}
