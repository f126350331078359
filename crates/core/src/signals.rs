use regex::Regex;
use std::sync::OnceLock;

pub const SKILL_VOCABULARY: [&str; 19] = [
    "Python",
    "Java",
    "JavaScript",
    "React",
    "Node.js",
    "SQL",
    "MongoDB",
    "AWS",
    "Docker",
    "Kubernetes",
    "Git",
    "Machine Learning",
    "AI",
    "TensorFlow",
    "PyTorch",
    "Data Science",
    "Analytics",
    "Agile",
    "Scrum",
];

fn skill_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        SKILL_VOCABULARY
            .iter()
            .map(|skill| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(skill));
                (*skill, Regex::new(&pattern).expect("escaped skill pattern"))
            })
            .collect()
    })
}

fn years_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d+(?:\.\d+)?)\+?\s*(?:years?|yrs?)\b").expect("static regex")
    })
}

pub fn extract_skills(text: &str) -> Vec<String> {
    skill_patterns()
        .iter()
        .filter(|(_, pattern)| pattern.is_match(text))
        .map(|(skill, _)| (*skill).to_string())
        .collect()
}

pub fn experience_years(text: &str) -> f64 {
    years_pattern()
        .captures_iter(text)
        .filter_map(|capture| capture.get(1)?.as_str().parse::<f64>().ok())
        .filter(|years| years.is_finite())
        .fold(0.0, f64::max)
}
