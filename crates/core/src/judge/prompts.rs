pub const SYSTEM_INSTRUCTION: &str = "You are an expert resume screening agent. \
Always respond with valid JSON only, scoring candidates from 0 to 100.";

pub fn screening_prompt(job_description: &str, resume_text: &str) -> String {
    format!(
        r#"You are an expert resume screening agent. Your task is to evaluate a resume against a job description and provide a comprehensive analysis.

JOB DESCRIPTION:
{job_description}

RESUME:
{resume_text}

Please provide a detailed analysis in the following JSON format:
{{
    "overall_score": <score from 0-100>,
    "strengths": ["strength1", "strength2", ...],
    "weaknesses": ["weakness1", "weakness2", ...],
    "matched_requirements": ["requirement1", "requirement2", ...],
    "missing_requirements": ["requirement1", "requirement2", ...],
    "recommendation": "HIRE" | "MAYBE" | "REJECT",
    "reasoning": "detailed explanation"
}}

Focus on:
1. Relevant experience and skills
2. Education and certifications
3. Cultural fit indicators
4. Career progression
5. Specific achievements and quantifiable results

Be thorough and objective in your evaluation."#
    )
}
