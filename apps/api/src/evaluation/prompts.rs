// The two instruction templates behind the submit buttons. Job text and the
// rendered resume travel as separate request parts — never interpolated here.

/// Template for the "Tell me about the resume" action: a qualitative review
/// of alignment, strengths, and weaknesses.
pub const RESUME_REVIEW_PROMPT: &str = "\
You are an experienced Technical Human Resource Manager, your task is to review the provided resume against the job description. \
Please share your professional evaluation on whether the candidate's profile aligns with the role. \
Highlight the strengths and weaknesses of the applicant in relation to the specified job requirements.";

/// Template for the "Percentage match" action. Output ordering is part of the
/// contract: percentage first, then missing keywords, then final thoughts.
pub const PERCENTAGE_MATCH_PROMPT: &str = "\
You are a skilled ATS (Applicant Tracking System) scanner with a deep understanding of data science and ATS functionality, \
your task is to evaluate the resume against the provided job description. Give me the percentage of match if the resume matches \
the job description. First the output should come as percentage and then keywords missing and last final thoughts.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_are_distinct_and_nonempty() {
        assert!(!RESUME_REVIEW_PROMPT.is_empty());
        assert!(!PERCENTAGE_MATCH_PROMPT.is_empty());
        assert_ne!(RESUME_REVIEW_PROMPT, PERCENTAGE_MATCH_PROMPT);
    }

    #[test]
    fn test_match_template_orders_percentage_keywords_thoughts() {
        let percentage = PERCENTAGE_MATCH_PROMPT.find("percentage").unwrap();
        let keywords = PERCENTAGE_MATCH_PROMPT.find("keywords missing").unwrap();
        let thoughts = PERCENTAGE_MATCH_PROMPT.find("final thoughts").unwrap();
        assert!(percentage < keywords);
        assert!(keywords < thoughts);
    }
}
